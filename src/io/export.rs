//! Exports: estimate JSON, fitted-series CSV and simulated-series CSV.
//!
//! CSV exports are meant to be easy to consume in spreadsheets or downstream
//! scripts; the simulated series uses the same `time,outdoor,indoor` layout
//! that `ingest` reads.

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::domain::{AchEstimate, AqiSeries};
use crate::error::AppError;
use crate::report::FittedRow;

/// JSON document written for an estimate.
///
/// The fitted parameters are flattened so `c`, `r` and `ach` are top-level keys.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EstimateFile {
    pub tool: String,
    pub source: PathBuf,
    /// Invocation summary (see `report::format_invocation`).
    pub summary: String,
    #[serde(flatten)]
    pub estimate: AchEstimate,
}

/// Write one or more estimates as JSON (an object for one, an array for several).
pub fn write_estimate_json(path: &Path, estimates: &[EstimateFile]) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create estimate JSON '{}': {e}", path.display())))?;

    let result = match estimates {
        [single] => serde_json::to_writer_pretty(file, single),
        many => serde_json::to_writer_pretty(file, many),
    };
    result.map_err(|e| AppError::new(2, format!("Failed to write estimate JSON: {e}")))?;

    Ok(())
}

/// Write observed vs. fitted rows to CSV.
pub fn write_fit_csv(path: &Path, rows: &[FittedRow]) -> Result<(), AppError> {
    let mut file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create fit CSV '{}': {e}", path.display())))?;

    writeln!(file, "time,outdoor,indoor,fitted,residual,model")
        .map_err(|e| AppError::new(2, format!("Failed to write fit CSV header: {e}")))?;

    for r in rows {
        writeln!(
            file,
            "{},{},{},{:.6},{:.6},{:.6}",
            r.time, r.outdoor, r.indoor, r.fitted, r.residual, r.model
        )
        .map_err(|e| AppError::new(2, format!("Failed to write fit CSV row: {e}")))?;
    }

    Ok(())
}

/// Write a series as `time,outdoor,indoor` CSV.
pub fn write_series_csv(path: &Path, series: &AqiSeries) -> Result<(), AppError> {
    let mut file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create series CSV '{}': {e}", path.display())))?;

    writeln!(file, "time,outdoor,indoor")
        .map_err(|e| AppError::new(2, format!("Failed to write series CSV header: {e}")))?;

    for ((t, x), y) in series.time().iter().zip(series.outdoor()).zip(series.indoor()) {
        writeln!(file, "{t:.6},{x:.6},{y:.6}")
            .map_err(|e| AppError::new(2, format!("Failed to write series CSV row: {e}")))?;
    }

    Ok(())
}
