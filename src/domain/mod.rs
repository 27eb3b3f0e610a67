pub mod geo;
pub mod route;
pub mod vehicle;

pub use geo::*;
pub use route::*;
pub use vehicle::*;
