use anyhow::{Context, Result};
use ev_eco_speed::config::Config;
use ev_eco_speed::optimizer::TracingProgress;
use ev_eco_speed::telemetry::init_tracing;
use ev_eco_speed::trip::{Providers, TripPlanner};
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let run = Config::load()?.into_run()?;
    info!(
        origin = %run.origin,
        destination = %run.destination,
        vehicle = %run.vehicle_profile,
        passengers = run.passengers,
        "planning trip"
    );

    let providers = Providers::from_config(&run.providers)?;
    let planner = TripPlanner::new(run, providers);
    let plan = planner.run(&mut TracingProgress).await?;

    for advisory in &plan.report.advisories {
        warn!(severity = %advisory.severity(), "{advisory}");
    }
    info!(
        speed_kmh = plan.report.best.speed_kmh,
        energy_kwh = plan.report.best.energy_kwh,
        total_time_min = plan.report.best.total_time_min,
        charges = plan.report.best.charging.num_stops,
        "recommended cruising speed"
    );

    let json = serde_json::to_string_pretty(&plan).context("serializing trip plan failed")?;
    println!("{json}");
    Ok(())
}
