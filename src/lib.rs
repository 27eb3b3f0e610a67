//! EV eco-speed advisor.
//!
//! Simulates the energy and time of a road trip at a set of candidate cruising speeds
//! and recommends the one that best trades consumption against travel time.

pub mod charging;
pub mod config;
pub mod domain;
pub mod error;
pub mod optimizer;
pub mod physics;
pub mod providers;
pub mod report;
pub mod routing;
pub mod simulation;
pub mod telemetry;
pub mod trip;

pub use error::PlannerError;
pub use trip::{Providers, TripPlan, TripPlanner};
