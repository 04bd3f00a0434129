//! Formatted terminal output.
//!
//! We keep formatting code in one place so:
//! - the math/fitting code stays clean and testable
//! - output changes are localized

use std::path::Path;

use crate::domain::{AchEstimate, ColumnLabels, FitOptions, StepMode};
use crate::report::FittedRow;

/// `{'c': …, 'r': …, 'ach': …}` with full precision.
pub fn format_mapping(est: &AchEstimate) -> String {
    format!("{{'c': {}, 'r': {}, 'ach': {}}}", est.c, est.r, est.ach)
}

/// One-line summary of the parameters an estimate was run with.
pub fn format_invocation(
    source: &Path,
    labels: &ColumnLabels,
    constrain: Option<&str>,
    opts: &FitOptions,
) -> String {
    let constrain = match constrain {
        Some(c) => format!("'{c}'"),
        None => "None".to_string(),
    };
    format!(
        "estimate(source='{}', time='{}', indoor='{}', outdoor='{}', constrain={constrain}, precision={}, ach=[{}, {}], step={})",
        source.display(),
        labels.time,
        labels.indoor,
        labels.outdoor,
        opts.precision,
        opts.ach_bounds.min,
        opts.ach_bounds.max,
        step_label(opts.step_mode),
    )
}

/// Full human-readable block for one estimate.
pub fn format_estimate(invocation: &str, rows_read: usize, est: &AchEstimate) -> String {
    let mut out = String::new();

    out.push_str("=== ach - air change rate estimate ===\n");
    out.push_str(&format!("{invocation}\n"));
    out.push_str(&format!("Samples: n={rows_read} | ts_max={:.4}h\n", est.ts_max));
    out.push('\n');
    out.push_str(&format!("c   = {:.6}\n", est.c));
    out.push_str(&format!("r   = {:.6} /h\n", est.r));
    out.push_str(&format!("ach = {:.6} /h\n", est.ach));
    out.push_str(&format!(
        "fit: y0={:.4} SSE={:.4} iterations={}\n",
        est.y0, est.sse, est.iterations
    ));
    if let (Some(rvalue), Some(stderr)) = (est.rvalue, est.stderr) {
        out.push_str(&format!("regression: rvalue={rvalue:.6} stderr={stderr:.6}\n"));
    }

    for w in &est.warnings {
        out.push_str(&format!("warning: {w}\n"));
    }
    out.push_str(&format!("{}\n", format_mapping(est)));

    out
}

/// Observed vs. fitted table.
pub fn format_fitted_table(rows: &[FittedRow]) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "{:>10} {:>10} {:>10} {:>10} {:>10}\n",
        "time", "outdoor", "indoor", "fitted", "residual"
    ));
    for r in rows {
        out.push_str(&format!(
            "{:>10.3} {:>10.2} {:>10.2} {:>10.2} {:>10.2}\n",
            r.time, r.outdoor, r.indoor, r.fitted, r.residual
        ));
    }
    out
}

fn step_label(mode: StepMode) -> &'static str {
    match mode {
        StepMode::Local => "local",
        StepMode::Uniform => "uniform",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::FitWarning;

    fn sample_estimate() -> AchEstimate {
        AchEstimate {
            c: 133.5,
            r: -1.75,
            ach: 1.5,
            y0: 133.0,
            sse: 12.25,
            iterations: 20,
            ts_max: 0.167,
            rvalue: Some(-0.998),
            stderr: Some(0.0215),
            warnings: vec![],
        }
    }

    #[test]
    fn mapping_lists_three_keys() {
        assert_eq!(format_mapping(&sample_estimate()), "{'c': 133.5, 'r': -1.75, 'ach': 1.5}");
    }

    #[test]
    fn invocation_matches_defaults() {
        let line = format_invocation(
            Path::new("test1.csv"),
            &ColumnLabels::default(),
            None,
            &FitOptions::default(),
        );
        assert_eq!(
            line,
            "estimate(source='test1.csv', time='time', indoor='indoor', outdoor='outdoor', constrain=None, precision=0.001, ach=[0, 10], step=local)"
        );
    }

    #[test]
    fn estimate_block_includes_warnings() {
        let mut est = sample_estimate();
        est.warnings.push(FitWarning::CoarseTimestep { ts_max: 1.0, ach: 1.5 });
        let txt = format_estimate("estimate(...)", 15, &est);
        assert!(txt.contains("ach = 1.500000 /h"));
        assert!(txt.contains("regression: rvalue=-0.998000 stderr=0.021500"));
        assert!(txt.contains("warning: estimated ACH 1.5000 is too high for timestep 1.0000h"));
        assert!(txt.ends_with("{'c': 133.5, 'r': -1.75, 'ach': 1.5}\n"));
    }

    #[test]
    fn fitted_table_has_header_and_rows() {
        let rows = vec![FittedRow {
            time: 0.0,
            outdoor: 40.0,
            indoor: 133.0,
            fitted: 132.5,
            residual: 0.5,
            model: 132.8,
        }];
        let txt = format_fitted_table(&rows);
        let lines: Vec<&str> = txt.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].trim_start().starts_with("time"));
        assert!(lines[1].ends_with("0.50"));
    }
}
