//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - the validated input series (`AqiSeries`)
//! - fit configuration (`FitOptions`, `Constraint`, `AchBounds`, `StepMode`)
//! - fit outputs (`AchEstimate`, `FitWarning`)

pub mod types;

pub use types::*;
