//! # Speed Optimizer
//!
//! Evaluates every candidate cruising speed over the resolved route and picks one.
//!
//! - **Types**: objectives, candidate results and the ranked outcome
//! - **Strategies**: least energy or weighted energy/time score over the feasible set
//! - **Speed**: the evaluation loop and the time-window filter
//! - **Progress**: per-candidate progress notifications

pub mod progress;
pub mod speed;
pub mod strategies;
pub mod types;

pub use progress::*;
pub use speed::*;
pub use strategies::*;
pub use types::*;
