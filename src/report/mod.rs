//! Reporting utilities: fitted values and formatted terminal output.

pub mod format;

pub use format::*;

use crate::domain::{AchEstimate, AqiSeries, StepMode};
use crate::models::{relaxation_at, simulate_indoor};

/// Observed vs. fitted indoor value at one sample.
#[derive(Debug, Clone, PartialEq)]
pub struct FittedRow {
    pub time: f64,
    pub outdoor: f64,
    pub indoor: f64,
    pub fitted: f64,
    pub residual: f64,
    /// Continuous model `(c, r)` at this time, relaxing towards mean outdoor.
    pub model: f64,
}

/// Run the fitted recurrence over the series and pair it with the observations.
pub fn fitted_rows(series: &AqiSeries, estimate: &AchEstimate, mode: StepMode) -> Vec<FittedRow> {
    let fitted = simulate_indoor(series.time(), series.outdoor(), estimate.y0, estimate.ach, mode);
    let baseline = series.mean_outdoor();
    let t0 = series.time()[0];
    series
        .time()
        .iter()
        .zip(series.outdoor())
        .zip(series.indoor())
        .zip(fitted)
        .map(|(((&time, &outdoor), &indoor), fitted)| FittedRow {
            time,
            outdoor,
            indoor,
            fitted,
            residual: indoor - fitted,
            model: relaxation_at(baseline, estimate.c - baseline, estimate.r, t0, time),
        })
        .collect()
}
