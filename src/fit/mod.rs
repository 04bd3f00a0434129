//! Air-change-rate fitting.
//!
//! Responsibilities:
//!
//! - bounded scalar search over `ach` (`search`)
//! - anchoring, recurrence matching, parameter recovery and the timestep
//!   validity check (`estimator`)

pub mod estimator;
pub mod search;

pub use estimator::*;
pub use search::*;
