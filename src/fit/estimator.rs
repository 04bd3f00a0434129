//! Air-change-rate estimator.
//!
//! Given:
//! - sample times `t_i` (hours)
//! - outdoor AQI `x_i`
//! - indoor AQI `y_i`
//!
//! we find the `ach` for which the discrete recurrence (see
//! `models::recurrence`) started from an anchor value best reproduces the
//! indoor series, then map that `ach` back onto the continuous model
//! `y(t) = baseline + c' exp(r t)` to report `c` and `r`.
//!
//! Steps:
//! 1. validate input and options
//! 2. choose the recurrence start value (regressed or observed)
//! 3. minimize the recurrence SSE over `ach` (closed form for two samples)
//! 4. recover `(c, r)` from the fitted recurrence
//! 5. check the timestep against `1/ach` and attach warnings

use crate::domain::{
    AchBounds, AchEstimate, Anchor, AqiSeries, Constraint, FitOptions, FitWarning, StepMode,
    UNIFORM_STEP_TOLERANCE,
};
use crate::error::{EstimateError, EstimateResult};
use crate::fit::search::golden_section_min;
use crate::math::{LogLinearFit, fit_log_linear};
use crate::models::{continuous_rate, recurrence_sse, simulate_indoor};

/// Estimate `(c, r, ach)` from raw columns.
///
/// `constrain = None` searches the default `ach` domain with a regressed
/// initial value. `precision` is the convergence tolerance on `ach`.
///
/// # Errors
/// - `InvalidInput` for mismatched lengths, fewer than two samples, non-finite
///   values or non-increasing time (before any fitting)
/// - `Convergence` if the search cannot reach `precision` within the
///   iteration cap
/// - `Degenerate` if the fitted `ach` has no finite continuous rate
pub fn estimate(
    time: &[f64],
    outdoor: &[f64],
    indoor: &[f64],
    constrain: Option<Constraint>,
    precision: f64,
) -> EstimateResult<AchEstimate> {
    let series = AqiSeries::new(time.to_vec(), outdoor.to_vec(), indoor.to_vec())?;
    estimate_with(&series, &FitOptions::from_constraint(constrain, precision))
}

/// Estimate `(c, r, ach)` for a validated series.
pub fn estimate_with(series: &AqiSeries, opts: &FitOptions) -> EstimateResult<AchEstimate> {
    validate_options(series, opts)?;

    let y0 = initial_value(series, opts.anchor);
    let objective = |ach: f64| recurrence_sse(series, y0, ach, opts.step_mode);

    let (ach, iterations) = match two_sample_solve(series, y0, &opts.ach_bounds) {
        Some(ach) => (ach, 0),
        None => {
            let out = golden_section_min(
                &objective,
                opts.ach_bounds.min,
                opts.ach_bounds.max,
                opts.precision,
                opts.max_iterations,
            );
            if opts.precision > 0.0 && !out.converged {
                return Err(EstimateError::Convergence {
                    iterations: out.iterations,
                    width: out.width,
                    precision: opts.precision,
                });
            }
            log::debug!(
                "search finished after {} iterations: ach={:.6} sse={:.6} width={:.3e}",
                out.iterations,
                out.x,
                out.fx,
                out.width
            );
            (out.x, out.iterations)
        }
    };

    let (c, r, regression) = recover_continuous(series, ach, opts.step_mode)?;
    let ts_max = series.max_step();
    let warnings = check_validity(ts_max, ach);
    for w in &warnings {
        log::warn!("{w}");
    }

    Ok(AchEstimate {
        c,
        r,
        ach,
        y0,
        sse: objective(ach),
        iterations,
        ts_max,
        rvalue: regression.map(|fit| fit.rvalue),
        stderr: regression.map(|fit| fit.stderr),
        warnings,
    })
}

fn validate_options(series: &AqiSeries, opts: &FitOptions) -> EstimateResult<()> {
    opts.ach_bounds.validate()?;
    if opts.precision.is_nan() {
        return Err(EstimateError::invalid("precision must not be NaN"));
    }
    if opts.step_mode == StepMode::Uniform {
        let steps = series.steps();
        let mean = steps.iter().sum::<f64>() / steps.len() as f64;
        let var = steps.iter().map(|s| (s - mean).powi(2)).sum::<f64>() / steps.len() as f64;
        let spread = var.sqrt() / mean;
        if spread > UNIFORM_STEP_TOLERANCE {
            return Err(EstimateError::invalid(format!(
                "timestep is not uniform (relative spread {spread:.4} > {UNIFORM_STEP_TOLERANCE})"
            )));
        }
    }
    Ok(())
}

/// Recurrence start value for the chosen anchor.
fn initial_value(series: &AqiSeries, anchor: Anchor) -> f64 {
    let observed = series.indoor()[0];
    match anchor {
        Anchor::Observed => observed,
        Anchor::Regression => {
            let deviations: Vec<f64> = series
                .indoor()
                .iter()
                .zip(series.outdoor())
                .map(|(y, x)| y - x)
                .collect();
            match fit_log_linear(series.time(), &deviations) {
                Some(fit) => fit.value_at(series.time()[0]) + series.outdoor()[0],
                None => {
                    log::debug!(
                        "indoor-outdoor deviations change sign; anchoring on observed initial value {observed}"
                    );
                    observed
                }
            }
        }
    }
}

/// Direct solve of the single recurrence equation for two samples.
///
/// Returns `None` when the equation does not determine `ach` (the start value
/// sits on the outdoor midpoint), leaving the bounded search to pick a value.
fn two_sample_solve(series: &AqiSeries, y0: f64, bounds: &AchBounds) -> Option<f64> {
    if series.len() != 2 {
        return None;
    }
    let ts = series.time()[1] - series.time()[0];
    let y1 = series.indoor()[1];
    let mid = 0.5 * (series.outdoor()[0] + series.outdoor()[1]);

    // y1 = y0 (1 - ts ach) + mid ts ach  ->  ach = (y0 - y1) / (ts (y0 - mid))
    let gap = y0 - mid;
    let scale = y0.abs().max(mid.abs()).max(1.0);
    if gap.abs() <= f64::EPSILON * scale {
        log::debug!("two-sample system is singular; falling back to bounded search");
        return None;
    }
    Some(bounds.clamp((y0 - y1) / (ts * gap)))
}

/// Recover `(c, r)` from the recurrence run at the fitted `ach`.
///
/// The recurrence is started from the observed first indoor value and its
/// deviation from outdoor is fitted with `baseline + c' exp(r t)`, the
/// baseline being mean outdoor. If the deviation is not of one sign (the
/// recurrence oscillates or crosses outdoor) we fall back to the analytic
/// per-step mapping with `c = indoor[0]` and no regression to report.
fn recover_continuous(
    series: &AqiSeries,
    ach: f64,
    mode: StepMode,
) -> EstimateResult<(f64, f64, Option<LogLinearFit>)> {
    let time = series.time();
    let predicted = simulate_indoor(time, series.outdoor(), series.indoor()[0], ach, mode);
    let deviations: Vec<f64> = predicted
        .iter()
        .zip(series.outdoor())
        .map(|(p, x)| p - x)
        .collect();

    if let Some(fit) = fit_log_linear(time, &deviations) {
        let c = fit.value_at(time[0]) + series.mean_outdoor();
        return Ok((c, fit.slope, Some(fit)));
    }

    let ts = match mode {
        StepMode::Local => series.mean_step(),
        StepMode::Uniform => time[1] - time[0],
    };
    let r = continuous_rate(ts, ach);
    if !r.is_finite() {
        return Err(EstimateError::Degenerate(format!(
            "ach={ach} at timestep {ts} has no finite continuous rate"
        )));
    }
    log::debug!("deviation changes sign; using per-step rate mapping r={r:.6}");
    Ok((series.indoor()[0], r, None))
}

/// Compare the largest timestep with `1/ach`.
pub fn check_validity(ts_max: f64, ach: f64) -> Vec<FitWarning> {
    let mut warnings = Vec::new();
    if ach > 0.0 && ts_max >= 1.0 / ach {
        warnings.push(FitWarning::CoarseTimestep { ts_max, ach });
    } else if ach < 0.0 {
        warnings.push(FitWarning::NegativeAch { ach });
    }
    warnings
}
