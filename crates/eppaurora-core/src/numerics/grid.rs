//! Lookups on sorted one-dimensional coordinate grids.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum InterpolationMethod {
    #[default]
    Linear,
    Nearest,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GridInterpolationError {
    #[error("coordinate grid '{axis}' is empty")]
    EmptyGrid { axis: &'static str },
    #[error("coordinate grid '{axis}' is not strictly increasing at index {index}")]
    Unsorted { axis: &'static str, index: usize },
    #[error("{axis} = {value} must be finite")]
    NonFinite { axis: &'static str, value: f64 },
    #[error("{axis} = {value} is outside the grid range [{lower}, {upper}]")]
    OutOfRange {
        axis: &'static str,
        value: f64,
        lower: f64,
        upper: f64,
    },
}

/// Two neighbouring grid indices and the linear weight of the upper one.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bracket {
    pub lower: usize,
    pub upper: usize,
    pub weight: f64,
}

impl Bracket {
    pub fn blend(&self, lower_value: f64, upper_value: f64) -> f64 {
        lower_value + self.weight * (upper_value - lower_value)
    }
}

pub fn validate_grid(axis: &'static str, grid: &[f64]) -> Result<(), GridInterpolationError> {
    if grid.is_empty() {
        return Err(GridInterpolationError::EmptyGrid { axis });
    }
    if let Some(&value) = grid.iter().find(|value| !value.is_finite()) {
        return Err(GridInterpolationError::NonFinite { axis, value });
    }
    if let Some(index) = grid.windows(2).position(|pair| pair[1] <= pair[0]) {
        return Err(GridInterpolationError::Unsorted {
            axis,
            index: index + 1,
        });
    }
    Ok(())
}

/// Index of the grid point closest to `value`; equidistant values pick the
/// larger coordinate and values outside the grid clamp to its ends.
pub fn nearest_index(
    axis: &'static str,
    grid: &[f64],
    value: f64,
) -> Result<usize, GridInterpolationError> {
    validate_grid(axis, grid)?;
    if !value.is_finite() {
        return Err(GridInterpolationError::NonFinite { axis, value });
    }

    let upper = searchsorted_left(grid, value);
    if upper == 0 {
        return Ok(0);
    }
    if upper == grid.len() {
        return Ok(grid.len() - 1);
    }
    let lower = upper - 1;
    if value - grid[lower] < grid[upper] - value {
        Ok(lower)
    } else {
        Ok(upper)
    }
}

/// Bracketing indices for linear interpolation; `value` must lie inside the grid.
pub fn bracket(
    axis: &'static str,
    grid: &[f64],
    value: f64,
) -> Result<Bracket, GridInterpolationError> {
    validate_grid(axis, grid)?;
    if !value.is_finite() {
        return Err(GridInterpolationError::NonFinite { axis, value });
    }

    let last = grid.len() - 1;
    if value < grid[0] || value > grid[last] {
        return Err(GridInterpolationError::OutOfRange {
            axis,
            value,
            lower: grid[0],
            upper: grid[last],
        });
    }
    if last == 0 {
        return Ok(Bracket {
            lower: 0,
            upper: 0,
            weight: 0.0,
        });
    }

    let upper = searchsorted_left(grid, value).clamp(1, last);
    let lower = upper - 1;
    Ok(Bracket {
        lower,
        upper,
        weight: (value - grid[lower]) / (grid[upper] - grid[lower]),
    })
}

/// Bracket on a periodic axis: the grid is extended by one period on both
/// sides and the returned indices are folded back into `0..grid.len()`.
pub fn periodic_bracket(
    axis: &'static str,
    grid: &[f64],
    value: f64,
    period: f64,
) -> Result<Bracket, GridInterpolationError> {
    validate_grid(axis, grid)?;
    let count = grid.len();
    let extended: Vec<f64> = grid
        .iter()
        .map(|coordinate| coordinate - period)
        .chain(grid.iter().copied())
        .chain(grid.iter().map(|coordinate| coordinate + period))
        .collect();

    let bracket = bracket(axis, &extended, value)?;
    Ok(Bracket {
        lower: bracket.lower % count,
        upper: bracket.upper % count,
        weight: bracket.weight,
    })
}

pub fn searchsorted_left(grid: &[f64], value: f64) -> usize {
    grid.partition_point(|coordinate| *coordinate < value)
}
