//! Continuous relaxation model and its link to the discrete recurrence.
//!
//! In continuous time the indoor deviation from the outdoor baseline decays as
//! `c' * exp(r t)`. One recurrence step multiplies the deviation by
//! `(1 - ts*ach)`, so the two rates are tied by
//!
//! ```text
//! exp(r * ts) = 1 - ts * ach
//! ```
//!
//! When `ts*ach >= 1` the right-hand side is not positive: the recurrence
//! overshoots and oscillates. `continuous_rate` then uses the magnitude, i.e.
//! the envelope decay of the oscillation. At exactly `ts*ach == 1` the
//! deviation vanishes in one step; the factor is floored at `f64::EPSILON` so
//! the rate stays finite (a very fast decay).

/// Continuous rate `r` (1/hour) equivalent to `ach` at timestep `ts`.
pub fn continuous_rate(ts: f64, ach: f64) -> f64 {
    (1.0 - ts * ach).abs().max(f64::EPSILON).ln() / ts
}

/// Evaluate `baseline + amplitude * exp(r * (t - t0))`.
pub fn relaxation_at(baseline: f64, amplitude: f64, r: f64, t0: f64, t: f64) -> f64 {
    baseline + amplitude * (r * (t - t0)).exp()
}
