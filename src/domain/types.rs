//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - used in-memory during fitting
//! - exported to JSON
//! - printed by the report layer

use std::path::PathBuf;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::{EstimateError, EstimateResult};

/// Default convergence tolerance on `ach` (bracket width of the search).
pub const DEFAULT_PRECISION: f64 = 1e-3;

/// Default cap on search iterations.
pub const DEFAULT_MAX_ITERATIONS: usize = 200;

/// Default `ach` search domain (air changes per hour).
pub const DEFAULT_ACH_MIN: f64 = 0.0;
pub const DEFAULT_ACH_MAX: f64 = 10.0;

/// Maximum relative spread of timesteps accepted in `StepMode::Uniform`,
/// independent of `FitOptions::precision`.
pub const UNIFORM_STEP_TOLERANCE: f64 = 0.01;

/// Paired indoor/outdoor AQI readings on a shared time axis (hours).
///
/// Construction validates the series, so every `AqiSeries` in the program has:
/// - three columns of equal length `n >= 2`
/// - finite values only
/// - strictly increasing time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AqiSeries {
    time: Vec<f64>,
    outdoor: Vec<f64>,
    indoor: Vec<f64>,
}

impl AqiSeries {
    pub fn new(time: Vec<f64>, outdoor: Vec<f64>, indoor: Vec<f64>) -> EstimateResult<Self> {
        validate_columns(&time, &outdoor, &indoor)?;
        Ok(Self {
            time,
            outdoor,
            indoor,
        })
    }

    pub fn time(&self) -> &[f64] {
        &self.time
    }

    pub fn outdoor(&self) -> &[f64] {
        &self.outdoor
    }

    pub fn indoor(&self) -> &[f64] {
        &self.indoor
    }

    pub fn len(&self) -> usize {
        self.time.len()
    }

    /// Always false for a validated series; present for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }

    /// Local timesteps `ts[i] = time[i+1] - time[i]` (length `n - 1`).
    pub fn steps(&self) -> Vec<f64> {
        self.time.windows(2).map(|w| w[1] - w[0]).collect()
    }

    /// Largest local timestep.
    pub fn max_step(&self) -> f64 {
        self.steps().into_iter().fold(0.0, f64::max)
    }

    /// Mean local timestep.
    pub fn mean_step(&self) -> f64 {
        (self.time[self.len() - 1] - self.time[0]) / (self.len() as f64 - 1.0)
    }

    pub fn mean_outdoor(&self) -> f64 {
        self.outdoor.iter().sum::<f64>() / self.len() as f64
    }
}

fn validate_columns(time: &[f64], outdoor: &[f64], indoor: &[f64]) -> EstimateResult<()> {
    if time.len() != outdoor.len() || time.len() != indoor.len() {
        return Err(EstimateError::invalid(format!(
            "column lengths differ: time={}, outdoor={}, indoor={}",
            time.len(),
            outdoor.len(),
            indoor.len()
        )));
    }
    if time.len() < 2 {
        return Err(EstimateError::invalid(format!(
            "need at least 2 samples, got {}",
            time.len()
        )));
    }
    for (name, column) in [("time", time), ("outdoor", outdoor), ("indoor", indoor)] {
        if let Some(i) = column.iter().position(|v| !v.is_finite()) {
            return Err(EstimateError::invalid(format!(
                "non-finite {name} value at sample {i}: {}",
                column[i]
            )));
        }
    }
    if let Some(i) = time.windows(2).position(|w| w[1] <= w[0]) {
        return Err(EstimateError::invalid(format!(
            "time must be strictly increasing (sample {}: {} -> {})",
            i + 1,
            time[i],
            time[i + 1]
        )));
    }
    Ok(())
}

/// How the recurrence start value `y0` is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Anchor {
    /// Regress `ln(indoor - outdoor)` on time and start from the fitted
    /// value at `time[0]`.
    Regression,
    /// Start from the observed first indoor reading.
    Observed,
}

/// Which timestep the recurrence uses between samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum StepMode {
    /// `ts = time[i] - time[i-1]` for each step.
    Local,
    /// `ts = time[1] - time[0]` everywhere; the series must be uniform within
    /// `UNIFORM_STEP_TOLERANCE`.
    Uniform,
}

/// Closed interval searched for `ach`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AchBounds {
    pub min: f64,
    pub max: f64,
}

impl AchBounds {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// `[-half_width, half_width]`.
    pub fn symmetric(half_width: f64) -> Self {
        let h = half_width.abs();
        Self { min: -h, max: h }
    }

    pub fn clamp(&self, ach: f64) -> f64 {
        ach.clamp(self.min, self.max)
    }

    pub(crate) fn validate(&self) -> EstimateResult<()> {
        if !(self.min.is_finite() && self.max.is_finite() && self.max > self.min) {
            return Err(EstimateError::invalid(format!(
                "invalid ach bounds [{}, {}] (must be finite with max > min)",
                self.min, self.max
            )));
        }
        Ok(())
    }
}

impl Default for AchBounds {
    fn default() -> Self {
        Self::new(DEFAULT_ACH_MIN, DEFAULT_ACH_MAX)
    }
}

/// Restriction applied to the fit (the `constrain` argument).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Constraint {
    /// Initial value is constrained to the observed indoor reading.
    Init,
    /// Search `ach` only inside the given interval.
    AchRange(AchBounds),
}

/// Options controlling a single estimate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitOptions {
    pub anchor: Anchor,
    pub ach_bounds: AchBounds,
    /// Stop when the search bracket is at most this wide. `<= 0` runs the
    /// search to `max_iterations`.
    pub precision: f64,
    pub max_iterations: usize,
    /// `StepMode::Uniform` requires the relative timestep spread (std/mean)
    /// to be at most `UNIFORM_STEP_TOLERANCE`. This check is fixed and does
    /// not depend on `precision`, which only governs the `ach` search.
    pub step_mode: StepMode,
}

impl Default for FitOptions {
    fn default() -> Self {
        Self {
            anchor: Anchor::Regression,
            ach_bounds: AchBounds::default(),
            precision: DEFAULT_PRECISION,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            step_mode: StepMode::Local,
        }
    }
}

impl FitOptions {
    /// Options for a `constrain` value and precision, everything else default.
    pub fn from_constraint(constrain: Option<Constraint>, precision: f64) -> Self {
        let mut opts = FitOptions {
            precision,
            ..FitOptions::default()
        };
        match constrain {
            None => {}
            Some(Constraint::Init) => opts.anchor = Anchor::Observed,
            Some(Constraint::AchRange(bounds)) => opts.ach_bounds = bounds,
        }
        opts
    }
}

/// Non-fatal conditions detected after fitting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FitWarning {
    /// `ts_max >= 1/ach`: the discrete model's step assumption is violated.
    CoarseTimestep { ts_max: f64, ach: f64 },
    /// Only reachable when the search domain admits negative values.
    NegativeAch { ach: f64 },
}

impl std::fmt::Display for FitWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FitWarning::CoarseTimestep { ts_max, ach } => write!(
                f,
                "estimated ACH {ach:.4} is too high for timestep {ts_max:.4}h (ts*ach = {:.3} >= 1)",
                ts_max * ach
            ),
            FitWarning::NegativeAch { ach } => write!(f, "estimated ACH {ach:.4} is negative"),
        }
    }
}

/// Fitted parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AchEstimate {
    /// Initial indoor concentration implied by the continuous model at `time[0]`.
    pub c: f64,
    /// Continuous exponential rate (1/hour).
    pub r: f64,
    /// Air changes per hour.
    pub ach: f64,
    /// Recurrence start value the fit matched from.
    pub y0: f64,
    /// Recurrence-matching sum of squared errors at `ach`.
    pub sse: f64,
    /// Search iterations used (0 for the two-sample closed form).
    pub iterations: usize,
    pub ts_max: f64,
    /// Correlation of the log-linear fit behind `(c, r)`. `None` when `r`
    /// came from the per-step mapping instead of a regression.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rvalue: Option<f64>,
    /// Standard error of `r` from the same regression.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stderr: Option<f64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<FitWarning>,
}

impl AchEstimate {
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

/// Column labels used to locate the series in a CSV file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnLabels {
    pub time: String,
    pub indoor: String,
    pub outdoor: String,
}

impl Default for ColumnLabels {
    fn default() -> Self {
        Self {
            time: "time".to_string(),
            indoor: "indoor".to_string(),
            outdoor: "outdoor".to_string(),
        }
    }
}

/// A full `ach estimate` run's configuration as understood by the pipeline.
///
/// This is derived from CLI flags (plus defaults).
#[derive(Debug, Clone)]
pub struct EstimateConfig {
    pub csv_paths: Vec<PathBuf>,
    pub labels: ColumnLabels,
    /// The `--constrain` value as typed, kept for the invocation summary.
    pub constrain: Option<String>,
    pub options: FitOptions,

    pub json: bool,
    pub plot: bool,
    pub plot_width: usize,
    pub plot_height: usize,

    pub export_estimate: Option<PathBuf>,
    pub export_fit: Option<PathBuf>,
}

/// Parameters for generating a synthetic series.
#[derive(Debug, Clone)]
pub struct SimulationConfig {
    /// Indoor value at `time = 0`.
    pub c: f64,
    pub ach: f64,
    /// Outdoor level at `time = 0`.
    pub outdoor: f64,
    /// Outdoor change per hour.
    pub drift: f64,
    /// Nominal timestep (hours).
    pub ts: f64,
    pub samples: usize,
    /// Relative timestep jitter in `[0, 1)`.
    pub jitter: f64,
    /// Standard deviation of Gaussian noise added to indoor readings.
    pub noise: f64,
    pub seed: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(vec![0.0, 1.0], vec![1.0], vec![1.0, 2.0], "column lengths differ")]
    #[case(vec![0.0], vec![1.0], vec![1.0], "at least 2 samples")]
    #[case(vec![0.0, 1.0], vec![1.0, f64::NAN], vec![1.0, 2.0], "non-finite outdoor")]
    #[case(vec![0.0, 1.0, 1.0], vec![1.0; 3], vec![1.0; 3], "strictly increasing")]
    #[case(vec![0.0, 2.0, 1.0], vec![1.0; 3], vec![1.0; 3], "strictly increasing")]
    fn series_rejects_malformed_columns(
        #[case] time: Vec<f64>,
        #[case] outdoor: Vec<f64>,
        #[case] indoor: Vec<f64>,
        #[case] needle: &str,
    ) {
        let err = AqiSeries::new(time, outdoor, indoor).unwrap_err();
        match err {
            EstimateError::InvalidInput(msg) => assert!(msg.contains(needle), "{msg}"),
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn series_step_helpers() {
        let s = AqiSeries::new(vec![0.0, 0.5, 1.5], vec![1.0; 3], vec![2.0; 3]).unwrap();
        assert_eq!(s.steps(), vec![0.5, 1.0]);
        assert_eq!(s.max_step(), 1.0);
        assert!((s.mean_step() - 0.75).abs() < 1e-12);
    }

    #[test]
    fn constraint_maps_onto_options() {
        let opts = FitOptions::from_constraint(Some(Constraint::Init), 1e-4);
        assert_eq!(opts.anchor, Anchor::Observed);
        assert_eq!(opts.precision, 1e-4);
        assert_eq!(opts.ach_bounds, AchBounds::default());

        let opts = FitOptions::from_constraint(Some(Constraint::AchRange(AchBounds::symmetric(3.0))), 1e-3);
        assert_eq!(opts.anchor, Anchor::Regression);
        assert_eq!(opts.ach_bounds, AchBounds::new(-3.0, 3.0));
    }

    #[test]
    fn bounds_validation() {
        assert!(AchBounds::new(0.0, 10.0).validate().is_ok());
        assert!(AchBounds::new(1.0, 1.0).validate().is_err());
        assert!(AchBounds::new(0.0, f64::INFINITY).validate().is_err());
    }

    #[test]
    fn estimate_serializes_required_keys() {
        let est = AchEstimate {
            c: 133.0,
            r: -1.79,
            ach: 1.55,
            y0: 133.0,
            sse: 10.0,
            iterations: 20,
            ts_max: 0.167,
            rvalue: Some(-0.99),
            stderr: None,
            warnings: vec![],
        };
        let v = serde_json::to_value(&est).unwrap();
        for key in ["c", "r", "ach"] {
            assert!(v.get(key).is_some(), "missing key {key}");
        }
        assert!(v.get("warnings").is_none());
        assert_eq!(v["rvalue"], -0.99);
        assert!(v.get("stderr").is_none());
    }
}
