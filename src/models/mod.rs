//! Indoor AQI models.
//!
//! - `recurrence`: the discrete step model the fit matches against sampled data
//! - `exponential`: the continuous relaxation `c * exp(r t)` and its mapping to
//!   the discrete `ach`
//!
//! Both are small pure functions so the estimator and the simulator can share them.

pub mod exponential;
pub mod recurrence;

pub use exponential::*;
pub use recurrence::*;
