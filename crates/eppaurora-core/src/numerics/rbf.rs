//! Radial basis function interpolation over scattered nodes.
//!
//! Uses the classic (non-smoothing) formulation: solve `Φ w = d` for the node
//! weights with `Φ_ij = φ(|x_i - x_j|)` and evaluate `s(x) = Σ_j w_j φ(|x - x_j|)`.
//! The shape parameter `ε` defaults to the average node spacing estimated from
//! the bounding box of the nodes.

use super::linalg::{DenseMatrix, LuError, solve_dense};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum RadialBasis {
    #[default]
    Multiquadric,
    InverseMultiquadric,
    Gaussian,
    Linear,
    Cubic,
    Quintic,
    ThinPlate,
}

impl RadialBasis {
    pub fn evaluate(self, radius: f64, epsilon: f64) -> f64 {
        let scaled = radius / epsilon;
        match self {
            Self::Multiquadric => (scaled * scaled + 1.0).sqrt(),
            Self::InverseMultiquadric => 1.0 / (scaled * scaled + 1.0).sqrt(),
            Self::Gaussian => (-scaled * scaled).exp(),
            Self::Linear => radius,
            Self::Cubic => radius.powi(3),
            Self::Quintic => radius.powi(5),
            Self::ThinPlate => {
                if radius == 0.0 {
                    0.0
                } else {
                    radius * radius * radius.ln()
                }
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RbfError {
    #[error("rbf interpolation requires at least 2 nodes, got {actual}")]
    InsufficientNodes { actual: usize },
    #[error("rbf node {index} has {actual} coordinates, expected {expected}")]
    DimensionMismatch {
        index: usize,
        expected: usize,
        actual: usize,
    },
    #[error("rbf node {index} must be finite, got coordinate {value}")]
    NonFiniteNode { index: usize, value: f64 },
    #[error("rbf value at node {index} must be finite, got {value}")]
    NonFiniteValue { index: usize, value: f64 },
    #[error("rbf nodes span no volume, cannot derive a shape parameter")]
    DegenerateNodes,
    #[error("rbf query has {actual} coordinates, expected {expected}")]
    QueryDimension { expected: usize, actual: usize },
    #[error("rbf system solve failed: {0}")]
    Solve(#[from] LuError),
}

#[derive(Debug, Clone, PartialEq)]
pub struct RbfInterpolator {
    nodes: Vec<Vec<f64>>,
    weights: Vec<f64>,
    basis: RadialBasis,
    epsilon: f64,
}

impl RbfInterpolator {
    /// `nodes[i]` holds the coordinates of node `i`, `values[i]` its data value.
    pub fn new(
        nodes: Vec<Vec<f64>>,
        values: &[f64],
        basis: RadialBasis,
    ) -> Result<Self, RbfError> {
        let count = nodes.len();
        if count < 2 {
            return Err(RbfError::InsufficientNodes { actual: count });
        }
        if values.len() != count {
            return Err(RbfError::DimensionMismatch {
                index: values.len().min(count),
                expected: count,
                actual: values.len(),
            });
        }

        let ndim = nodes[0].len();
        for (index, node) in nodes.iter().enumerate() {
            if node.len() != ndim {
                return Err(RbfError::DimensionMismatch {
                    index,
                    expected: ndim,
                    actual: node.len(),
                });
            }
            if let Some(value) = node.iter().copied().find(|value| !value.is_finite()) {
                return Err(RbfError::NonFiniteNode { index, value });
            }
        }
        if let Some((index, value)) = values
            .iter()
            .copied()
            .enumerate()
            .find(|(_, value)| !value.is_finite())
        {
            return Err(RbfError::NonFiniteValue { index, value });
        }

        let epsilon = average_spacing(&nodes)?;
        let system = DenseMatrix::from_fn(count, count, |row, col| {
            basis.evaluate(distance(&nodes[row], &nodes[col]), epsilon)
        });

        tracing::debug!(nodes = count, ndim, epsilon, ?basis, "solving rbf system");
        let weights = solve_dense(&system, values)?;

        Ok(Self {
            nodes,
            weights,
            basis,
            epsilon,
        })
    }

    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn evaluate(&self, query: &[f64]) -> Result<f64, RbfError> {
        let expected = self.nodes[0].len();
        if query.len() != expected {
            return Err(RbfError::QueryDimension {
                expected,
                actual: query.len(),
            });
        }

        Ok(self
            .nodes
            .iter()
            .zip(&self.weights)
            .map(|(node, weight)| weight * self.basis.evaluate(distance(node, query), self.epsilon))
            .sum())
    }
}

fn distance(lhs: &[f64], rhs: &[f64]) -> f64 {
    lhs.iter()
        .zip(rhs)
        .map(|(l, r)| (l - r) * (l - r))
        .sum::<f64>()
        .sqrt()
}

/// `(Π edges / N)^(1 / #edges)` over the non-zero bounding-box edges.
fn average_spacing(nodes: &[Vec<f64>]) -> Result<f64, RbfError> {
    let ndim = nodes[0].len();
    let edges: Vec<f64> = (0..ndim)
        .map(|axis| {
            let (min, max) = nodes.iter().fold(
                (f64::INFINITY, f64::NEG_INFINITY),
                |(min, max), node| (min.min(node[axis]), max.max(node[axis])),
            );
            max - min
        })
        .filter(|edge| *edge != 0.0)
        .collect();

    if edges.is_empty() {
        return Err(RbfError::DegenerateNodes);
    }

    let volume: f64 = edges.iter().product();
    Ok((volume / nodes.len() as f64).powf(1.0 / edges.len() as f64))
}
