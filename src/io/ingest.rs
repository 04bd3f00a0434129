//! CSV ingest.
//!
//! Turns a `time,outdoor,indoor` CSV (any column order, labels configurable,
//! extra columns ignored) into a validated `AqiSeries`.
//!
//! Design goals:
//! - **Strict schema**: missing columns and unparseable numbers are errors
//!   (exit code 2) that name the offending line
//! - **Deterministic behavior**: rows are used in file order, nothing is
//!   skipped silently
//! - **Separation of concerns**: no fitting logic here

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use csv::StringRecord;

use crate::domain::{AqiSeries, ColumnLabels};
use crate::error::AppError;

/// Ingest output: the series plus where it came from.
#[derive(Debug, Clone)]
pub struct IngestedSeries {
    pub source: PathBuf,
    pub series: AqiSeries,
    pub rows_read: usize,
}

/// Load a series from a CSV file.
pub fn load_series(path: &Path, labels: &ColumnLabels) -> Result<IngestedSeries, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open CSV '{}': {e}", path.display())))?;
    let (series, rows_read) = read_series(file, labels)
        .map_err(|e| AppError::new(e.exit_code(), format!("{}: {e}", path.display())))?;
    log::debug!("loaded {rows_read} rows from {}", path.display());

    Ok(IngestedSeries {
        source: path.to_path_buf(),
        series,
        rows_read,
    })
}

/// Read a series from any CSV source. Returns the series and the number of data rows.
pub fn read_series<R: Read>(reader: R, labels: &ColumnLabels) -> Result<(AqiSeries, usize), AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = reader
        .headers()
        .map_err(|e| AppError::new(2, format!("Failed to read CSV headers: {e}")))?
        .clone();
    let header_map = build_header_map(&headers);

    let time_idx = column_index(&header_map, &labels.time)?;
    let outdoor_idx = column_index(&header_map, &labels.outdoor)?;
    let indoor_idx = column_index(&header_map, &labels.indoor)?;

    let mut time = Vec::new();
    let mut outdoor = Vec::new();
    let mut indoor = Vec::new();

    for (idx, result) in reader.records().enumerate() {
        // +2: records start after the header, lines are 1-based.
        let line = idx + 2;
        let record = result.map_err(|e| AppError::new(2, format!("CSV parse error on line {line}: {e}")))?;

        time.push(parse_field(&record, time_idx, &labels.time, line)?);
        outdoor.push(parse_field(&record, outdoor_idx, &labels.outdoor, line)?);
        indoor.push(parse_field(&record, indoor_idx, &labels.indoor, line)?);
    }

    let rows_read = time.len();
    if rows_read == 0 {
        return Err(AppError::new(3, "CSV contains a header but no data rows"));
    }
    let series = AqiSeries::new(time, outdoor, indoor)?;
    Ok((series, rows_read))
}

fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(idx, name)| (normalize_header_name(name), idx))
        .collect()
}

fn normalize_header_name(name: &str) -> String {
    // Spreadsheet exports sometimes prefix the first header with a UTF-8 BOM.
    let name = name.trim().trim_start_matches('\u{feff}');
    name.to_ascii_lowercase()
}

fn column_index(header_map: &HashMap<String, usize>, label: &str) -> Result<usize, AppError> {
    header_map
        .get(&normalize_header_name(label))
        .copied()
        .ok_or_else(|| AppError::new(2, format!("Missing required column: `{label}`")))
}

fn parse_field(record: &StringRecord, idx: usize, label: &str, line: usize) -> Result<f64, AppError> {
    let raw = record
        .get(idx)
        .ok_or_else(|| AppError::new(2, format!("Line {line}: missing `{label}` value")))?;
    raw.parse::<f64>()
        .map_err(|_| AppError::new(2, format!("Line {line}: `{label}` is not a number: '{raw}'")))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "time,outdoor,indoor\n0.000,40,133\n0.167,40,128\n0.333,40,86\n";

    #[test]
    fn header_only_file_is_no_data() {
        let err = read_series("time,outdoor,indoor\n".as_bytes(), &ColumnLabels::default()).unwrap_err();
        assert_eq!(err.exit_code(), 3);
    }

    #[test]
    fn reads_default_layout() {
        let (series, rows) = read_series(SAMPLE.as_bytes(), &ColumnLabels::default()).unwrap();
        assert_eq!(rows, 3);
        assert_eq!(series.time(), &[0.0, 0.167, 0.333]);
        assert_eq!(series.outdoor(), &[40.0, 40.0, 40.0]);
        assert_eq!(series.indoor(), &[133.0, 128.0, 86.0]);
    }

    #[test]
    fn locates_columns_by_label_in_any_order() {
        let csv = "\u{feff}Hours, note ,IN,OUT\n0,a,100,20\n1,b,60,20\n";
        let labels = ColumnLabels {
            time: "hours".to_string(),
            indoor: "in".to_string(),
            outdoor: "out".to_string(),
        };
        let (series, _) = read_series(csv.as_bytes(), &labels).unwrap();
        assert_eq!(series.indoor(), &[100.0, 60.0]);
        assert_eq!(series.outdoor(), &[20.0, 20.0]);
    }

    #[test]
    fn missing_column_is_reported() {
        let err = read_series("time,indoor\n0,1\n1,2\n".as_bytes(), &ColumnLabels::default()).unwrap_err();
        assert_eq!(err.exit_code(), 2);
        assert!(err.to_string().contains("`outdoor`"));
    }

    #[test]
    fn non_numeric_value_names_the_line() {
        let csv = "time,outdoor,indoor\n0,40,133\n0.5,forty,120\n";
        let err = read_series(csv.as_bytes(), &ColumnLabels::default()).unwrap_err();
        assert!(err.to_string().contains("Line 3"), "{err}");
    }

    #[test]
    fn too_few_rows_fail_validation() {
        let err = read_series("time,outdoor,indoor\n0,40,133\n".as_bytes(), &ColumnLabels::default()).unwrap_err();
        assert_eq!(err.exit_code(), 2);
        assert!(err.to_string().contains("at least 2 samples"));
    }

    #[test]
    fn load_series_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test1.csv");
        std::fs::write(&path, SAMPLE).unwrap();

        let ingested = load_series(&path, &ColumnLabels::default()).unwrap();
        assert_eq!(ingested.rows_read, 3);
        assert_eq!(ingested.source, path);
    }
}
