//! ASCII plotting for terminal output.
//!
//! This is intentionally "dumb" (fixed-size grid), optimized for:
//! - quick visual sanity checks of a fit in a terminal
//! - deterministic output (helpful for golden tests)
//!
//! Plot elements:
//! - observed indoor readings: `o`
//! - fitted recurrence: `-` line
//! - outdoor readings: `.`

use crate::report::FittedRow;

/// Render observed vs. fitted indoor AQI over time.
pub fn render_fit_plot(rows: &[FittedRow], width: usize, height: usize) -> String {
    let (t_min, t_max) = span(rows.iter().map(|r| r.time)).unwrap_or((0.0, 1.0));
    let (y_min, y_max) = span(rows.iter().flat_map(|r| [r.indoor, r.fitted, r.outdoor])).unwrap_or((0.0, 1.0));
    let (y_min, y_max) = widen(y_min, y_max, 0.05);

    let mut canvas = Canvas::new(width.max(10), height.max(5), (t_min, t_max), (y_min, y_max));

    // Outdoor first, then the fit, then observations on top.
    for r in rows {
        canvas.put(r.time, r.outdoor, '.');
    }
    let fitted: Vec<(f64, f64)> = rows.iter().map(|r| (r.time, r.fitted)).collect();
    canvas.trace(&fitted, '-');
    for r in rows {
        canvas.put(r.time, r.indoor, 'o');
    }

    format!(
        "Plot: time=[{t_min:.3}, {t_max:.3}] h | aqi=[{y_min:.2}, {y_max:.2}]\n{}",
        canvas.render()
    )
}

/// Min and max of the finite values, if they span a non-empty interval.
fn span(values: impl Iterator<Item = f64>) -> Option<(f64, f64)> {
    let (lo, hi) = values
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)));
    (hi > lo).then_some((lo, hi))
}

/// Grow `[lo, hi]` by `frac` of its length on both sides.
fn widen(lo: f64, hi: f64, frac: f64) -> (f64, f64) {
    let margin = ((hi - lo) * frac).max(1e-12);
    (lo - margin, hi + margin)
}

/// Fixed character grid addressed in data coordinates.
struct Canvas {
    cells: Vec<Vec<char>>,
    t_range: (f64, f64),
    y_range: (f64, f64),
}

impl Canvas {
    fn new(width: usize, height: usize, t_range: (f64, f64), y_range: (f64, f64)) -> Self {
        Self {
            cells: vec![vec![' '; width]; height],
            t_range,
            y_range,
        }
    }

    fn width(&self) -> usize {
        self.cells[0].len()
    }

    fn height(&self) -> usize {
        self.cells.len()
    }

    /// `(column, row)` of a data point; row 0 is the top (largest `y`).
    fn cell(&self, t: f64, y: f64) -> (usize, usize) {
        let col = slot(t, self.t_range, self.width());
        let row = self.height() - 1 - slot(y, self.y_range, self.height());
        (col, row)
    }

    /// Draw `ch` at a data point, replacing whatever is there.
    fn put(&mut self, t: f64, y: f64, ch: char) {
        if !(t.is_finite() && y.is_finite()) {
            return;
        }
        let (col, row) = self.cell(t, y);
        self.cells[row][col] = ch;
    }

    /// Connect consecutive finite points with `ch`, filling blank cells only.
    fn trace(&mut self, points: &[(f64, f64)], ch: char) {
        for pair in points.windows(2) {
            let ((t0, y0), (t1, y1)) = (pair[0], pair[1]);
            if !(t0.is_finite() && y0.is_finite() && t1.is_finite() && y1.is_finite()) {
                continue;
            }
            let from = self.cell(t0, y0);
            let to = self.cell(t1, y1);
            self.segment(from, to, ch);
        }
    }

    /// Straight segment between two cells, sampled once per cell along the longer axis.
    fn segment(&mut self, (c0, r0): (usize, usize), (c1, r1): (usize, usize), ch: char) {
        let dc = c1 as f64 - c0 as f64;
        let dr = r1 as f64 - r0 as f64;
        let steps = dc.abs().max(dr.abs()) as usize;
        for k in 0..=steps {
            let f = if steps == 0 { 0.0 } else { k as f64 / steps as f64 };
            let col = (c0 as f64 + f * dc).round() as usize;
            let row = (r0 as f64 + f * dr).round() as usize;
            if self.cells[row][col] == ' ' {
                self.cells[row][col] = ch;
            }
        }
    }

    fn render(self) -> String {
        self.cells
            .into_iter()
            .map(|line| line.into_iter().collect::<String>() + "\n")
            .collect()
    }
}

/// Index of `v` among `n` evenly spaced slots covering `range`.
fn slot(v: f64, (lo, hi): (f64, f64), n: usize) -> usize {
    let u = ((v - lo) / (hi - lo)).clamp(0.0, 1.0);
    (u * (n.max(1) - 1) as f64).round() as usize
}
