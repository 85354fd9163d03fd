//! Dense real linear solves for interpolation systems.

use faer::Mat;

pub type DenseMatrix = Mat<f64>;

/// Pivots below this fraction of the largest matrix entry count as zero.
const RELATIVE_PIVOT_FLOOR: f64 = 1.0e-14;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LuError {
    #[error("system matrix must be square and non-empty, got {rows}x{cols}")]
    Shape { rows: usize, cols: usize },
    #[error("system matrix entry ({row}, {col}) is {value}")]
    NonFinite { row: usize, col: usize, value: f64 },
    #[error("system matrix is numerically singular in column {column}")]
    Singular { column: usize },
    #[error("right-hand side has {actual} entries for a {expected}x{expected} system")]
    RhsLength { expected: usize, actual: usize },
}

/// `P·A = L·U` with the unit-diagonal `L` below and `U` on and above the
/// diagonal of `factors`; `permutation[i]` is the source row of row `i`.
#[derive(Debug, Clone, PartialEq)]
pub struct LuDecomposition {
    factors: DenseMatrix,
    permutation: Vec<usize>,
}

impl LuDecomposition {
    pub fn factorize(matrix: &DenseMatrix) -> Result<Self, LuError> {
        let size = checked_size(matrix)?;
        let scale = (0..size)
            .flat_map(|row| (0..size).map(move |col| (row, col)))
            .fold(0.0_f64, |largest, index| largest.max(matrix[index].abs()));
        let floor = RELATIVE_PIVOT_FLOOR * scale.max(f64::MIN_POSITIVE);

        let mut factors = matrix.clone();
        let mut permutation: Vec<usize> = (0..size).collect();
        for column in 0..size {
            let pivot_row = (column..size)
                .max_by(|&a, &b| {
                    factors[(a, column)]
                        .abs()
                        .total_cmp(&factors[(b, column)].abs())
                })
                .unwrap_or(column);
            if factors[(pivot_row, column)].abs() <= floor {
                return Err(LuError::Singular { column });
            }
            if pivot_row != column {
                for col in 0..size {
                    let held = factors[(column, col)];
                    factors[(column, col)] = factors[(pivot_row, col)];
                    factors[(pivot_row, col)] = held;
                }
                permutation.swap(column, pivot_row);
            }

            let pivot = factors[(column, column)];
            for row in column + 1..size {
                let multiplier = factors[(row, column)] / pivot;
                factors[(row, column)] = multiplier;
                if multiplier != 0.0 {
                    for col in column + 1..size {
                        factors[(row, col)] -= multiplier * factors[(column, col)];
                    }
                }
            }
        }

        Ok(Self {
            factors,
            permutation,
        })
    }

    pub fn size(&self) -> usize {
        self.permutation.len()
    }

    pub fn solve(&self, rhs: &[f64]) -> Result<Vec<f64>, LuError> {
        let size = self.size();
        if rhs.len() != size {
            return Err(LuError::RhsLength {
                expected: size,
                actual: rhs.len(),
            });
        }

        let mut x: Vec<f64> = self.permutation.iter().map(|&source| rhs[source]).collect();
        for row in 0..size {
            let correction: f64 = (0..row).map(|col| self.factors[(row, col)] * x[col]).sum();
            x[row] -= correction;
        }
        for row in (0..size).rev() {
            let correction: f64 = (row + 1..size)
                .map(|col| self.factors[(row, col)] * x[col])
                .sum();
            x[row] = (x[row] - correction) / self.factors[(row, row)];
        }
        Ok(x)
    }
}

/// Solves `matrix · x = rhs`.
pub fn solve_dense(matrix: &DenseMatrix, rhs: &[f64]) -> Result<Vec<f64>, LuError> {
    LuDecomposition::factorize(matrix)?.solve(rhs)
}

fn checked_size(matrix: &DenseMatrix) -> Result<usize, LuError> {
    let (rows, cols) = (matrix.nrows(), matrix.ncols());
    if rows == 0 || rows != cols {
        return Err(LuError::Shape { rows, cols });
    }
    for row in 0..rows {
        for col in 0..cols {
            let value = matrix[(row, col)];
            if !value.is_finite() {
                return Err(LuError::NonFinite { row, col, value });
            }
        }
    }
    Ok(rows)
}
