//! Discrete indoor AQI recurrence.
//!
//! For each step with timestep `ts`:
//!
//! ```text
//! y[i] = y[i-1] * (1 - ts*ach) + 0.5 * (x[i-1] + x[i]) * ts * ach
//! ```
//!
//! where `x` is outdoor AQI and `y` indoor AQI. The indoor value relaxes toward
//! the midpoint of the two outdoor readings with weight `ts*ach`.

use crate::domain::{AqiSeries, StepMode};

/// Advance the indoor value by one step.
pub fn step_indoor(prev: f64, x_prev: f64, x_next: f64, ts: f64, ach: f64) -> f64 {
    let w = ts * ach;
    prev * (1.0 - w) + 0.5 * (x_prev + x_next) * w
}

/// Run the recurrence from `y0` over the given time axis and outdoor series.
///
/// # Panics
/// Panics if `outdoor` is shorter than `time`. Callers pass validated series.
pub fn simulate_indoor(time: &[f64], outdoor: &[f64], y0: f64, ach: f64, mode: StepMode) -> Vec<f64> {
    let mut out = Vec::with_capacity(time.len());
    if time.is_empty() {
        return out;
    }
    out.push(y0);

    let uniform_ts = if time.len() > 1 { time[1] - time[0] } else { 0.0 };
    let mut y = y0;
    for i in 1..time.len() {
        let ts = match mode {
            StepMode::Local => time[i] - time[i - 1],
            StepMode::Uniform => uniform_ts,
        };
        y = step_indoor(y, outdoor[i - 1], outdoor[i], ts, ach);
        out.push(y);
    }
    out
}

/// Sum of squared differences between the recurrence from `y0` and the
/// observed indoor series.
pub fn recurrence_sse(series: &AqiSeries, y0: f64, ach: f64, mode: StepMode) -> f64 {
    simulate_indoor(series.time(), series.outdoor(), y0, ach, mode)
        .iter()
        .zip(series.indoor())
        .map(|(p, o)| {
            let e = p - o;
            e * e
        })
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constant_outdoor_relaxes_geometrically() {
        let time = [0.0, 0.1, 0.2, 0.3];
        let outdoor = [40.0; 4];
        let y = simulate_indoor(&time, &outdoor, 140.0, 2.0, StepMode::Local);
        // deviation shrinks by (1 - 0.1*2) each step
        for (i, v) in y.iter().enumerate() {
            let expected = 40.0 + 100.0 * 0.8_f64.powi(i as i32);
            assert!((v - expected).abs() < 1e-9, "step {i}: {v} vs {expected}");
        }
    }

    #[test]
    fn zero_ach_holds_initial_value() {
        let time = [0.0, 1.0, 3.0];
        let outdoor = [10.0, 80.0, 5.0];
        let y = simulate_indoor(&time, &outdoor, 55.0, 0.0, StepMode::Local);
        assert_eq!(y, vec![55.0, 55.0, 55.0]);
    }

    #[test]
    fn uniform_mode_uses_first_step() {
        let time = [0.0, 0.5, 2.0];
        let outdoor = [0.0; 3];
        let local = simulate_indoor(&time, &outdoor, 100.0, 0.4, StepMode::Local);
        let uniform = simulate_indoor(&time, &outdoor, 100.0, 0.4, StepMode::Uniform);
        assert!((local[2] - 100.0 * 0.8 * 0.4).abs() < 1e-9);
        assert!((uniform[2] - 100.0 * 0.8 * 0.8).abs() < 1e-9);
    }

    #[test]
    fn sse_is_zero_on_generating_parameters() {
        let time = vec![0.0, 0.2, 0.35, 0.6];
        let outdoor = vec![30.0, 35.0, 20.0, 25.0];
        let indoor = simulate_indoor(&time, &outdoor, 90.0, 1.3, StepMode::Local);
        let series = AqiSeries::new(time, outdoor, indoor).unwrap();
        assert!(recurrence_sse(&series, 90.0, 1.3, StepMode::Local) < 1e-20);
        assert!(recurrence_sse(&series, 90.0, 1.0, StepMode::Local) > 0.0);
    }
}
