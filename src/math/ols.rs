//! Least squares solver and the log-linear regression built on it.
//!
//! The estimator needs one kind of linear fit: a straight line through
//! `(t_i, ln|d_i|)` where `d_i` is an indoor/outdoor deviation. That is the
//! ordinary least squares problem
//!
//! ```text
//! minimize Σ (ln|d_i| - (a + b t_i))^2
//! ```
//!
//! solved here with nalgebra's SVD so that the two-sample case (an exactly
//! determined system) and nearly collinear time axes behave the same way as
//! well-conditioned data.

use nalgebra::{DMatrix, DVector};

/// Solve a least squares problem using SVD.
///
/// Returns `None` if the system is too ill-conditioned to solve robustly.
pub fn solve_least_squares(x: &DMatrix<f64>, y: &DVector<f64>) -> Option<DVector<f64>> {
    let svd = x.clone().svd(true, true);

    // Try progressively looser tolerances if strict solve fails.
    for &tol in &[1e-12, 1e-10, 1e-8] {
        if let Ok(beta) = svd.solve(y, tol) {
            if beta.iter().all(|v| v.is_finite()) {
                return Some(beta);
            }
        }
    }

    None
}

/// Result of fitting `d(t) = sign * exp(intercept + slope * t)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LogLinearFit {
    pub intercept: f64,
    pub slope: f64,
    /// `1.0` when all deviations are positive, `-1.0` when all are negative.
    pub sign: f64,
    /// Pearson correlation of `(t, ln|d|)`; `0.0` when either side is constant.
    pub rvalue: f64,
    /// Standard error of `slope` (`0.0` for two points).
    pub stderr: f64,
}

impl LogLinearFit {
    /// Fitted deviation at time `t`.
    pub fn value_at(&self, t: f64) -> f64 {
        self.sign * (self.intercept + self.slope * t).exp()
    }
}

/// Fit a signed exponential through `(t_i, d_i)` by regressing `ln|d_i|` on `t_i`.
///
/// Returns `None` when the deviations are not all of one strict sign (the
/// logarithm is undefined) or when the regression cannot be solved.
pub fn fit_log_linear(t: &[f64], d: &[f64]) -> Option<LogLinearFit> {
    if t.len() != d.len() || t.len() < 2 {
        return None;
    }

    let sign = if d.iter().all(|&v| v > 0.0) {
        1.0
    } else if d.iter().all(|&v| v < 0.0) {
        -1.0
    } else {
        return None;
    };

    // Center time so the intercept column stays well conditioned for series
    // that start far from zero.
    let t_mean = t.iter().sum::<f64>() / t.len() as f64;

    let n = t.len();
    let mut x = DMatrix::<f64>::zeros(n, 2);
    let mut y = DVector::<f64>::zeros(n);
    for i in 0..n {
        x[(i, 0)] = 1.0;
        x[(i, 1)] = t[i] - t_mean;
        y[i] = (sign * d[i]).ln();
    }

    let beta = solve_least_squares(&x, &y)?;
    let slope = beta[1];
    let intercept = beta[0] - slope * t_mean;
    if !(slope.is_finite() && intercept.is_finite()) {
        return None;
    }

    let (rvalue, stderr) = regression_stats(&x, &y);

    Some(LogLinearFit {
        intercept,
        slope,
        sign,
        rvalue,
        stderr,
    })
}

/// Correlation and slope standard error for a centered design `[1, t - t_mean]`.
fn regression_stats(x: &DMatrix<f64>, y: &DVector<f64>) -> (f64, f64) {
    let n = y.len();
    let y_mean = y.mean();

    let mut sxx = 0.0;
    let mut syy = 0.0;
    let mut sxy = 0.0;
    for i in 0..n {
        let dt = x[(i, 1)];
        let dy = y[i] - y_mean;
        sxx += dt * dt;
        syy += dy * dy;
        sxy += dt * dy;
    }

    let rvalue = if sxx > 0.0 && syy > 0.0 {
        (sxy / (sxx * syy).sqrt()).clamp(-1.0, 1.0)
    } else {
        0.0
    };
    let stderr = if n > 2 && sxx > 0.0 {
        ((1.0 - rvalue * rvalue).max(0.0) * syy / sxx / (n - 2) as f64).sqrt()
    } else {
        0.0
    };
    (rvalue, stderr)
}
