//! Resolution of CSV input arguments.
//!
//! `ach estimate` accepts files and directories. A directory expands to the
//! `*.csv` files beneath it (bounded depth, deterministic order), so a whole
//! measurement campaign can be estimated in one call.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::AppError;

/// Directory recursion depth when expanding a directory argument.
const DEFAULT_SEARCH_DEPTH: usize = 4;

/// Expand the CLI path arguments into a list of CSV files.
pub fn resolve_csv_inputs(args: &[PathBuf]) -> Result<Vec<PathBuf>, AppError> {
    if args.is_empty() {
        return Err(AppError::new(2, "No input given. Usage: `ach estimate <file.csv|dir>...`."));
    }

    let mut out = Vec::new();
    for arg in args {
        if arg.is_dir() {
            let found = find_csv_files(arg, DEFAULT_SEARCH_DEPTH);
            if found.is_empty() {
                return Err(AppError::new(
                    2,
                    format!("No .csv files found under {}", arg.display()),
                ));
            }
            out.extend(found);
        } else {
            out.push(validate_csv_path(arg)?);
        }
    }
    Ok(out)
}

/// Validate the provided path points to a `.csv` file.
pub fn validate_csv_path(path: &Path) -> Result<PathBuf, AppError> {
    if !path.exists() {
        return Err(AppError::new(2, format!("CSV file not found: {}", path.display())));
    }
    if !has_csv_extension(path) {
        return Err(AppError::new(
            2,
            format!("Expected a .csv file (got: {})", path.display()),
        ));
    }
    Ok(path.to_path_buf())
}

fn find_csv_files(root: &Path, max_depth: usize) -> Vec<PathBuf> {
    let mut out = Vec::new();
    walk(root, 0, max_depth, &mut out);
    out.sort();
    out
}

fn walk(dir: &Path, depth: usize, max_depth: usize, out: &mut Vec<PathBuf>) {
    if depth > max_depth {
        return;
    }
    let Ok(entries) = fs::read_dir(dir) else {
        return;
    };

    for entry in entries.flatten() {
        let path = entry.path();
        let Ok(file_type) = entry.file_type() else {
            continue;
        };
        if file_type.is_dir() {
            if !is_skipped_dir(&path) {
                walk(&path, depth + 1, max_depth, out);
            }
        } else if file_type.is_file() && has_csv_extension(&path) {
            out.push(path);
        }
    }
}

fn has_csv_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"))
}

fn is_skipped_dir(path: &Path) -> bool {
    let name = path.file_name().and_then(|s| s.to_str()).unwrap_or("");
    name.starts_with('.') || name == "target"
}
