//! Shared "estimate pipeline" for one input file.
//!
//! CSV ingest -> estimate -> fitted rows -> invocation summary
//!
//! `app` runs this once per input (in parallel) and only deals with
//! presentation and exports.

use std::path::Path;

use crate::domain::{AchEstimate, EstimateConfig};
use crate::error::AppError;
use crate::io::ingest::{IngestedSeries, load_series};
use crate::report::FittedRow;

/// All computed outputs for a single input file.
#[derive(Debug, Clone)]
pub struct EstimateRun {
    pub ingest: IngestedSeries,
    pub estimate: AchEstimate,
    pub rows: Vec<FittedRow>,
    /// `estimate(source=…, …)` line describing how the fit was run.
    pub invocation: String,
}

/// Load `path` and estimate `(c, r, ach)` with the configured options.
pub fn run_estimate(path: &Path, config: &EstimateConfig) -> Result<EstimateRun, AppError> {
    let ingest = load_series(path, &config.labels)?;

    let estimate = crate::fit::estimate_with(&ingest.series, &config.options)
        .map_err(|e| AppError::new(e.exit_code(), format!("{}: {e}", path.display())))?;
    log::debug!(
        "{}: ach={:.6} after {} iterations (sse={:.4})",
        path.display(),
        estimate.ach,
        estimate.iterations,
        estimate.sse
    );

    let rows = crate::report::fitted_rows(&ingest.series, &estimate, config.options.step_mode);
    let invocation = crate::report::format_invocation(
        path,
        &config.labels,
        config.constrain.as_deref(),
        &config.options,
    );

    Ok(EstimateRun {
        ingest,
        estimate,
        rows,
        invocation,
    })
}
