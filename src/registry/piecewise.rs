//! Piecewise-linear approximation of a univariate function.

use super::options::FunctionOptions;

/// Upper limit on the number of approximation pieces.
pub const MAX_PIECES: usize = 1_000_000;

/// Rule for choosing the number of approximation pieces.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PieceCount {
    Fixed(usize),
    /// Refine until the approximation error is at most this.
    MaxError(f64),
}

/// A piecewise-linear interpolant through equally spaced breakpoints.
#[derive(Debug, Clone, PartialEq)]
pub struct PiecewiseLinear {
    xs: Vec<f64>,
    ys: Vec<f64>,
}

impl PiecewiseLinear {
    /// Samples `f` on `[lower, upper]` with `pieces` equal pieces.
    ///
    /// Returns `None` for an empty or unbounded range, or when `f` is not
    /// finite at some breakpoint.
    pub fn sample<F: Fn(f64) -> f64>(f: F, lower: f64, upper: f64, pieces: usize) -> Option<Self> {
        if !(lower.is_finite() && upper.is_finite()) || lower > upper {
            return None;
        }
        let pieces = pieces.clamp(1, MAX_PIECES);
        let step = (upper - lower) / pieces as f64;
        let mut xs = Vec::with_capacity(pieces + 1);
        let mut ys = Vec::with_capacity(pieces + 1);
        for i in 0..=pieces {
            let x = if i == pieces {
                upper
            } else {
                lower + step * i as f64
            };
            let y = f(x);
            if !y.is_finite() {
                return None;
            }
            xs.push(x);
            ys.push(y);
        }
        Some(Self { xs, ys })
    }

    /// Piece rule implied by `options` over a range of `width`.
    ///
    /// `piece_length` wins over `pieces`, which wins over `piece_error`;
    /// `fallback` applies when none is set.
    pub fn piece_count(options: &FunctionOptions, width: f64, fallback: PieceCount) -> PieceCount {
        match (options.piece_length, options.pieces, options.piece_error) {
            (Some(len), _, _) if len > 0.0 && width.is_finite() => {
                PieceCount::Fixed(((width / len).ceil() as usize).clamp(1, MAX_PIECES))
            }
            (_, Some(p), _) => PieceCount::Fixed((p as usize).clamp(1, MAX_PIECES)),
            (_, _, Some(err)) if err > 0.0 => PieceCount::MaxError(err),
            _ => fallback,
        }
    }

    /// Samples `f` on `[lower, upper]` under `count`.
    ///
    /// For [`PieceCount::MaxError`] the piece count doubles from 1 until
    /// the deviation at every segment midpoint is within the bound, or
    /// [`MAX_PIECES`] is reached.
    pub fn approximate<F: Fn(f64) -> f64>(
        f: F,
        lower: f64,
        upper: f64,
        count: PieceCount,
    ) -> Option<Self> {
        let max_error = match count {
            PieceCount::Fixed(pieces) => return Self::sample(f, lower, upper, pieces),
            PieceCount::MaxError(e) => e,
        };
        let mut pieces = 1;
        loop {
            let pwl = Self::sample(&f, lower, upper, pieces)?;
            if pieces >= MAX_PIECES || pwl.midpoint_error(&f)? <= max_error {
                return Some(pwl);
            }
            pieces = (pieces * 2).min(MAX_PIECES);
        }
    }

    /// Largest `|f(m) - p(m)|` over the segment midpoints `m`; `None` if
    /// `f` is not finite at one of them.
    fn midpoint_error<F: Fn(f64) -> f64>(&self, f: &F) -> Option<f64> {
        let mut worst = 0.0_f64;
        for (xs, ys) in self.xs.windows(2).zip(self.ys.windows(2)) {
            let y = f(0.5 * (xs[0] + xs[1]));
            if !y.is_finite() {
                return None;
            }
            worst = worst.max((y - 0.5 * (ys[0] + ys[1])).abs());
        }
        Some(worst)
    }

    /// Interpolated value at `x`; outside the sampled range the end
    /// segments are extended linearly.
    pub fn evaluate(&self, x: f64) -> f64 {
        let n = self.xs.len();
        if n == 1 {
            return self.ys[0];
        }
        let seg = match self.xs.partition_point(|&bx| bx <= x) {
            0 => 0,
            i if i >= n => n - 2,
            i => i - 1,
        };
        let (x0, x1) = (self.xs[seg], self.xs[seg + 1]);
        let (y0, y1) = (self.ys[seg], self.ys[seg + 1]);
        if x1 == x0 {
            return y0;
        }
        y0 + (y1 - y0) * (x - x0) / (x1 - x0)
    }

    /// Number of pieces.
    pub fn pieces(&self) -> usize {
        self.xs.len().saturating_sub(1)
    }
}
