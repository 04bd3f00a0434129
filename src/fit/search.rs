//! Bounded golden-section search for a scalar minimum.
//!
//! The estimator has a single nonlinear parameter (`ach`), so we use the
//! plainest deterministic scalar search there is:
//!
//! - evaluate both bracket endpoints
//! - keep two interior points at golden-ratio positions
//! - drop the side of the bracket that cannot contain the minimum
//! - stop when the bracket is at most `tolerance` wide or the iteration cap is hit
//!
//! The returned point is the best one *evaluated*, not the bracket midpoint.
//! Every run with the same bounds walks the same sequence of points, so a
//! tighter tolerance only appends evaluations and never returns a worse value.

/// `(sqrt(5) - 1) / 2`
const INV_PHI: f64 = 0.618_033_988_749_894_9;

/// Outcome of a golden-section run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchOutcome {
    /// Best argument evaluated.
    pub x: f64,
    /// Objective at `x`.
    pub fx: f64,
    pub iterations: usize,
    /// Final bracket width.
    pub width: f64,
    /// `true` when the bracket shrank to `tolerance` (always `false` for
    /// `tolerance <= 0`).
    pub converged: bool,
}

/// Minimize `f` on `[lo, hi]`.
///
/// Non-finite objective values are treated as `+inf`. Ties keep the point
/// evaluated first.
pub fn golden_section_min<F>(mut f: F, lo: f64, hi: f64, tolerance: f64, max_iterations: usize) -> SearchOutcome
where
    F: FnMut(f64) -> f64,
{
    let mut eval = |x: f64| {
        let v = f(x);
        if v.is_finite() { v } else { f64::INFINITY }
    };

    let mut best = (lo, eval(lo));
    let consider = |x: f64, fx: f64, best: &mut (f64, f64)| {
        if fx < best.1 {
            *best = (x, fx);
        }
    };

    let f_hi = eval(hi);
    consider(hi, f_hi, &mut best);

    let (mut a, mut b) = (lo, hi);
    let mut c = b - INV_PHI * (b - a);
    let mut d = a + INV_PHI * (b - a);
    let mut fc = eval(c);
    let mut fd = eval(d);
    consider(c, fc, &mut best);
    consider(d, fd, &mut best);

    let mut iterations = 0;
    while !(tolerance > 0.0 && b - a <= tolerance) && iterations < max_iterations {
        iterations += 1;
        if fc <= fd {
            b = d;
            d = c;
            fd = fc;
            c = b - INV_PHI * (b - a);
            fc = eval(c);
            consider(c, fc, &mut best);
        } else {
            a = c;
            c = d;
            fc = fd;
            d = a + INV_PHI * (b - a);
            fd = eval(d);
            consider(d, fd, &mut best);
        }
        log::trace!("golden iteration {iterations}: bracket [{a:.6}, {b:.6}] best {:.6}", best.0);
    }

    let width = b - a;
    SearchOutcome {
        x: best.0,
        fx: best.1,
        iterations,
        width,
        converged: tolerance > 0.0 && width <= tolerance,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_parabola_minimum_within_tolerance() {
        let out = golden_section_min(|x| (x - 1.547).powi(2), 0.0, 10.0, 1e-3, 200);
        assert!(out.converged);
        assert!(out.width <= 1e-3);
        assert!((out.x - 1.547).abs() <= 1e-3);
        // 10 * 0.618^k <= 1e-3  ->  k = 20
        assert_eq!(out.iterations, 20);
    }

    #[test]
    fn tighter_tolerance_never_worsens_best_value() {
        let f = |x: f64| (x - 2.2).abs().sqrt() + 0.1 * (x - 3.0).powi(2);
        let loose = golden_section_min(f, 0.0, 10.0, 1e-2, 200);
        let tight = golden_section_min(f, 0.0, 10.0, 1e-6, 200);
        assert!(tight.fx <= loose.fx);
        assert!(tight.iterations > loose.iterations);
    }

    #[test]
    fn non_positive_tolerance_runs_to_cap() {
        let out = golden_section_min(|x| (x - 4.0).powi(2), 0.0, 10.0, 0.0, 60);
        assert_eq!(out.iterations, 60);
        assert!(!out.converged);
        assert!((out.x - 4.0).abs() < 1e-9);
    }

    #[test]
    fn cap_before_tolerance_reports_unconverged() {
        let out = golden_section_min(|x| x * x, -5.0, 5.0, 1e-3, 3);
        assert_eq!(out.iterations, 3);
        assert!(!out.converged);
        assert!(out.width > 1e-3);
    }

    #[test]
    fn minimum_at_boundary_is_found() {
        let out = golden_section_min(|x| x, 0.0, 10.0, 1e-3, 200);
        assert_eq!(out.x, 0.0);
        assert_eq!(out.fx, 0.0);
    }

    #[test]
    fn non_finite_values_are_avoided() {
        let out = golden_section_min(
            |x| if x > 5.0 { f64::NAN } else { (x - 3.0).powi(2) },
            0.0,
            10.0,
            1e-4,
            200,
        );
        assert!((out.x - 3.0).abs() <= 1e-4);
    }
}
