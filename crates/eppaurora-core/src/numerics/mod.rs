pub mod broadcast;
pub mod grid;
pub mod linalg;
pub mod rbf;

pub use broadcast::{BroadcastError, broadcast_shape, common_shape, map2};
pub use grid::{Bracket, GridInterpolationError, InterpolationMethod};
pub use linalg::{DenseMatrix, LuDecomposition, LuError, solve_dense};
pub use rbf::{RadialBasis, RbfError, RbfInterpolator};

/// Neumaier-compensated running sum.
#[derive(Debug, Clone, Copy, Default)]
struct CompensatedSum {
    sum: f64,
    compensation: f64,
}

impl CompensatedSum {
    fn add(&mut self, value: f64) {
        let next = self.sum + value;
        if self.sum.abs() >= value.abs() {
            self.compensation += (self.sum - next) + value;
        } else {
            self.compensation += (value - next) + self.sum;
        }
        self.sum = next;
    }

    fn total(self) -> f64 {
        self.sum + self.compensation
    }
}

/// `count` points evenly spaced in `ln` between positive `start` and `end`,
/// both ends included exactly.
pub fn log_grid(start: f64, end: f64, count: usize) -> Option<Vec<f64>> {
    if count < 2 || !(start > 0.0 && end > 0.0) {
        return None;
    }
    let (ln_start, ln_end) = (start.ln(), end.ln());
    let step = (ln_end - ln_start) / (count - 1) as f64;
    let mut grid: Vec<f64> = (0..count)
        .map(|index| (ln_start + step * index as f64).exp())
        .collect();
    grid[0] = start;
    grid[count - 1] = end;
    Some(grid)
}

/// Trapezoidal rule over a (not necessarily uniform) abscissa.
pub fn trapezoid(y: &[f64], x: &[f64]) -> Option<f64> {
    if y.len() != x.len() {
        return None;
    }
    let mut total = CompensatedSum::default();
    for (ys, xs) in y.windows(2).zip(x.windows(2)) {
        total.add(0.5 * (xs[1] - xs[0]) * (ys[0] + ys[1]));
    }
    Some(total.total())
}

/// Evaluate `Σ_k c[k]·x^k`, coefficients ordered from the constant term up.
pub fn polyval(coefficients: &[f64], x: f64) -> f64 {
    coefficients
        .iter()
        .rev()
        .fold(0.0, |accumulator, coefficient| accumulator * x + coefficient)
}

/// Piecewise-linear interpolation on a non-decreasing grid, holding the end
/// values outside it. `None` for fewer than two points, mismatched lengths
/// or an unsorted grid.
pub fn interpolate_linear(x: f64, x_grid: &[f64], y_grid: &[f64]) -> Option<f64> {
    let count = x_grid.len();
    if count < 2 || count != y_grid.len() || x_grid.windows(2).any(|pair| pair[1] < pair[0]) {
        return None;
    }
    if x <= x_grid[0] {
        return Some(y_grid[0]);
    }
    if x >= x_grid[count - 1] {
        return Some(y_grid[count - 1]);
    }

    let upper = grid::searchsorted_left(x_grid, x);
    let (x0, x1) = (x_grid[upper - 1], x_grid[upper]);
    let (y0, y1) = (y_grid[upper - 1], y_grid[upper]);
    if x1 == x0 {
        return Some(y1);
    }
    Some(y0 + (x - x0) / (x1 - x0) * (y1 - y0))
}

/// `|lhs - rhs|` relative to the larger magnitude, never dividing by less
/// than `floor`.
pub fn relative_difference(lhs: f64, rhs: f64, floor: f64) -> f64 {
    (lhs - rhs).abs() / lhs.abs().max(rhs.abs()).max(floor)
}
