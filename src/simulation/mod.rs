//! # Route Simulation
//!
//! Walks a resolved route leg by leg through the segment energy model.
//!
//! - **Route**: total energy, driving time and distance for one speed profile
//! - **Relief**: ascent, descent and slope statistics of the elevation profile

pub mod relief;
pub mod route;

pub use relief::RouteRelief;
pub use route::{simulate_route, RouteTotals};
