//! Coefficient-table driven empirical models.

pub mod ssusiq2023;
pub mod zhangpaxton2008;

pub use ssusiq2023::{
    CoefficientTableError, ProxyValues, SsusiModel, SsusiPrediction, SsusiQuery, TableDim,
    ssusiq2023,
};
pub use zhangpaxton2008::{
    EpsteinTableError, ZhangPaxtonModel, ZpPrediction, epstein_coeffs, epstein_eval,
    hemispheric_power, zp2008,
};

use crate::numerics::broadcast::BroadcastError;
use crate::numerics::grid::GridInterpolationError;
use ndarray::ArrayD;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ModelError {
    #[error("altitude {altitude} km is not a table altitude")]
    AltitudeNotInTable { altitude: f64 },
    #[error(transparent)]
    Grid(#[from] GridInterpolationError),
    #[error(transparent)]
    Broadcast(#[from] BroadcastError),
    #[error("no axis of proxy array with shape {shape:?} has length {expected}")]
    ProxyCount { expected: usize, shape: Vec<usize> },
    #[error("proxy '{name}' required by the coefficient table is missing")]
    MissingProxy { name: String },
    #[error("labeled array has no '{dim}' dimension")]
    UnknownDimension { dim: String },
    #[error("labeled array has {dims} dimension names for {ndim} axes")]
    DimensionCount { dims: usize, ndim: usize },
    #[error("coordinate '{dim}' has {actual} entries, dimension has {expected}")]
    CoordinateLength {
        dim: String,
        expected: usize,
        actual: usize,
    },
    #[error("'{dim}' needs string labels")]
    NonLabelCoordinate { dim: String },
    #[error("{field} must be a scalar or a 1-D array, got {ndim} axes")]
    QueryShape { field: &'static str, ndim: usize },
}

/// Coordinate values along one dimension of a [`LabeledArray`].
#[derive(Debug, Clone, PartialEq)]
pub enum Coordinate {
    Labels(Vec<String>),
    Values(Vec<f64>),
}

impl Coordinate {
    pub fn len(&self) -> usize {
        match self {
            Self::Labels(labels) => labels.len(),
            Self::Values(values) => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A dynamic-dimensional array with named axes and optional coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct LabeledArray {
    data: ArrayD<f64>,
    dims: Vec<String>,
    coords: BTreeMap<String, Coordinate>,
}

impl LabeledArray {
    pub fn new<S: Into<String>>(
        data: ArrayD<f64>,
        dims: impl IntoIterator<Item = S>,
    ) -> Result<Self, ModelError> {
        let dims: Vec<String> = dims.into_iter().map(Into::into).collect();
        if dims.len() != data.ndim() {
            return Err(ModelError::DimensionCount {
                dims: dims.len(),
                ndim: data.ndim(),
            });
        }
        Ok(Self {
            data,
            dims,
            coords: BTreeMap::new(),
        })
    }

    pub fn with_coord(
        mut self,
        dim: impl Into<String>,
        coord: Coordinate,
    ) -> Result<Self, ModelError> {
        let dim = dim.into();
        let axis = self.axis_of(&dim).ok_or_else(|| ModelError::UnknownDimension {
            dim: dim.clone(),
        })?;
        let expected = self.data.shape()[axis];
        if coord.len() != expected {
            return Err(ModelError::CoordinateLength {
                dim,
                expected,
                actual: coord.len(),
            });
        }
        self.coords.insert(dim, coord);
        Ok(self)
    }

    pub fn data(&self) -> &ArrayD<f64> {
        &self.data
    }

    pub fn into_data(self) -> ArrayD<f64> {
        self.data
    }

    pub fn dims(&self) -> &[String] {
        &self.dims
    }

    pub fn coord(&self, dim: &str) -> Option<&Coordinate> {
        self.coords.get(dim)
    }

    pub fn coords(&self) -> &BTreeMap<String, Coordinate> {
        &self.coords
    }

    pub fn axis_of(&self, dim: &str) -> Option<usize> {
        self.dims.iter().position(|name| name == dim)
    }

    pub fn shape(&self) -> &[usize] {
        self.data.shape()
    }
}
