//! Empirical auroral ionization-rate model fitted to SSUSI UV observations.
//!
//! The model is linear in the geomagnetic and solar proxies per
//! (altitude, geomagnetic latitude, MLT) bin:
//! `log q = Σ_p beta_p · x_p`, with `var(log q) = Σ_p beta_std_p² · x_p²`
//! plus the posterior variance `sigma2` when the table provides it.
//!
//! Tables are JSON documents:
//!
//! ```json
//! {
//!   "version": "2023.1",
//!   "altitude": [100.0], "latitude": [70.2], "mlt": [3.0],
//!   "proxy": ["Kp", "PC", "Ap", "log_f107_81ctr_obs", "log_v_plasma", "offset"],
//!   "beta": [[[[1.0, 2.0, 3.0, 4.0, 5.0, null]]]],
//!   "beta_std": [[[[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]]]],
//!   "sigma2": [[[0.1]]]
//! }
//! ```
//!
//! `beta` and `beta_std` are nested in `dims` order, then proxy; `sigma2`
//! is optional and nested in `dims` order. `dims` may be omitted and then
//! reads `["altitude", "latitude", "mlt"]`. `null` marks a missing entry.
//! Vector queries produce output axes in `dims` order.

use super::{Coordinate, LabeledArray, ModelError};
use crate::common::constants::MLT_PERIOD_HOURS;
use crate::common::settings::SsusiModelSettings;
use crate::numerics::grid::{
    Bracket, GridInterpolationError, InterpolationMethod, bracket, nearest_index,
    periodic_bracket, validate_grid,
};
use ndarray::{Array2, Array3, Array4, ArrayD, ArrayViewD, Axis, Dimension, IxDyn};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Proxy name whose value is implicitly 1.
pub const OFFSET_PROXY: &str = "offset";

#[derive(Debug, thiserror::Error)]
pub enum CoefficientTableError {
    #[error("failed to read coefficient table '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse coefficient table: {source}")]
    Parse { source: serde_json::Error },
    #[error("coefficient variable '{variable}' has shape {actual:?}, expected {expected:?}")]
    Shape {
        variable: &'static str,
        expected: Vec<usize>,
        actual: Vec<usize>,
    },
    #[error("coefficient table lists no proxies")]
    NoProxies,
    #[error("coefficient table lists dimension '{}' twice", dim.as_str())]
    DuplicateDim { dim: TableDim },
    #[error(transparent)]
    Grid(#[from] GridInterpolationError),
}

/// Grid dimension of a coefficient table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TableDim {
    Altitude,
    Latitude,
    Mlt,
}

impl TableDim {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Altitude => "altitude",
            Self::Latitude => "latitude",
            Self::Mlt => "mlt",
        }
    }

    /// Axis in the altitude × latitude × mlt storage layout.
    const fn storage_axis(self) -> usize {
        match self {
            Self::Altitude => 0,
            Self::Latitude => 1,
            Self::Mlt => 2,
        }
    }
}

const STORAGE_DIMS: [TableDim; 3] = [TableDim::Altitude, TableDim::Latitude, TableDim::Mlt];

fn storage_dims() -> [TableDim; 3] {
    STORAGE_DIMS
}

#[derive(Debug, Deserialize)]
struct RawCoefficientTable {
    #[serde(default)]
    version: Option<String>,
    #[serde(default = "storage_dims")]
    dims: [TableDim; 3],
    altitude: Vec<f64>,
    latitude: Vec<f64>,
    mlt: Vec<f64>,
    proxy: Vec<String>,
    beta: Vec<Vec<Vec<Vec<Option<f64>>>>>,
    beta_std: Vec<Vec<Vec<Vec<Option<f64>>>>>,
    #[serde(default)]
    sigma2: Option<Vec<Vec<Vec<Option<f64>>>>>,
}

/// Immutable, validated coefficient table.
#[derive(Debug, Clone, PartialEq)]
pub struct SsusiModel {
    version: Option<String>,
    dims: [TableDim; 3],
    altitude: Vec<f64>,
    latitude: Vec<f64>,
    mlt: Vec<f64>,
    proxies: Vec<String>,
    beta: Array4<f64>,
    beta_std: Array4<f64>,
    sigma2: Option<Array3<f64>>,
}

impl SsusiModel {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CoefficientTableError> {
        let path = path.as_ref();
        let source = fs::read_to_string(path).map_err(|source| CoefficientTableError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let model = Self::from_json_str(&source)?;
        tracing::info!(
            path = %path.display(),
            version = model.version.as_deref().unwrap_or("unversioned"),
            shape = ?model.beta.shape(),
            "loaded SSUSI coefficient table"
        );
        Ok(model)
    }

    pub fn from_json_str(source: &str) -> Result<Self, CoefficientTableError> {
        let raw: RawCoefficientTable = serde_json::from_str(source)
            .map_err(|source| CoefficientTableError::Parse { source })?;
        Self::from_raw(raw)
    }

    fn from_raw(raw: RawCoefficientTable) -> Result<Self, CoefficientTableError> {
        validate_grid("altitude", &raw.altitude)?;
        validate_grid("latitude", &raw.latitude)?;
        validate_grid("mlt", &raw.mlt)?;
        if raw.proxy.is_empty() {
            return Err(CoefficientTableError::NoProxies);
        }

        let dims = raw.dims;
        for (position, dim) in dims.iter().enumerate() {
            if dims[..position].contains(dim) {
                return Err(CoefficientTableError::DuplicateDim { dim: *dim });
            }
        }

        let grid_len = |dim: TableDim| match dim {
            TableDim::Altitude => raw.altitude.len(),
            TableDim::Latitude => raw.latitude.len(),
            TableDim::Mlt => raw.mlt.len(),
        };
        let shape = dims.map(grid_len);
        // storage axis k is read from table axis `order[k]`
        let mut order = [0; 3];
        for (position, dim) in dims.iter().enumerate() {
            order[dim.storage_axis()] = position;
        }

        let proxy_shape = [shape[0], shape[1], shape[2], raw.proxy.len()];
        let beta = nested4("beta", raw.beta, proxy_shape)?
            .permuted_axes([order[0], order[1], order[2], 3]);
        let beta_std = nested4("beta_std", raw.beta_std, proxy_shape)?
            .permuted_axes([order[0], order[1], order[2], 3]);
        let sigma2 = raw
            .sigma2
            .map(|sigma2| nested3("sigma2", sigma2, shape))
            .transpose()?
            .map(|sigma2| sigma2.permuted_axes(order));

        Ok(Self {
            version: raw.version,
            dims,
            altitude: raw.altitude,
            latitude: raw.latitude,
            mlt: raw.mlt,
            proxies: raw.proxy,
            beta,
            beta_std,
            sigma2,
        })
    }

    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    /// Grid dimensions in the order vector queries lay out their output axes.
    pub fn dims(&self) -> [TableDim; 3] {
        self.dims
    }

    pub fn altitudes(&self) -> &[f64] {
        &self.altitude
    }

    pub fn latitudes(&self) -> &[f64] {
        &self.latitude
    }

    pub fn mlts(&self) -> &[f64] {
        &self.mlt
    }

    pub fn proxies(&self) -> &[String] {
        &self.proxies
    }

    pub fn has_offset(&self) -> bool {
        self.proxies.iter().any(|name| name == OFFSET_PROXY)
    }

    pub fn has_posterior_variance(&self) -> bool {
        self.sigma2.is_some()
    }

    /// Evaluates `log q` (and optionally its variance) on the query grid.
    pub fn evaluate(
        &self,
        query: &SsusiQuery<'_>,
        proxies: &ProxyValues<'_>,
        settings: &SsusiModelSettings,
    ) -> Result<SsusiPrediction, ModelError> {
        let axes = self
            .dims
            .iter()
            .map(|dim| query_axis(*dim, query.axis(*dim)))
            .collect::<Result<Vec<_>, _>>()?;
        let proxies = self.proxy_matrix(proxies)?;

        let points: usize = axes.iter().map(QueryAxis::len).product();
        let mut selections = Vec::with_capacity(points);
        for point in 0..points {
            let mut location = [0.0; 3];
            let mut rest = point;
            for axis in axes.iter().rev() {
                location[axis.dim.storage_axis()] = axis.values[rest % axis.len()];
                rest /= axis.len();
            }
            let [altitude, latitude, mlt] = location;
            selections.push(self.select(latitude, mlt, altitude, settings)?);
        }

        let mut dims = Vec::new();
        let mut shape = Vec::new();
        let mut coords = BTreeMap::new();
        for axis in axes.iter().filter(|axis| axis.vector) {
            let name = axis.dim.as_str().to_string();
            dims.push(name.clone());
            shape.push(axis.len());
            coords.insert(name, Coordinate::Values(axis.values.clone()));
        }
        let point_axes = shape.len();
        dims.extend(proxies.dims.iter().cloned());
        shape.extend(proxies.shape.iter().copied());
        coords.extend(proxies.coords.clone());

        tracing::debug!(
            points = selections.len(),
            columns = proxies.values.ncols(),
            interpolate = settings.interpolate,
            "evaluating SSUSI ionization model"
        );

        let log_q = ArrayD::from_shape_fn(IxDyn(&shape), |index| {
            let (point, column) = split_index(index.slice(), &shape, point_axes);
            selections[point]
                .beta
                .iter()
                .zip(proxies.values.column(column))
                .map(|(beta, x)| beta * x)
                .sum::<f64>()
        });
        let log_q = labeled(log_q, &dims, &coords)?;

        let variance = if settings.return_variance {
            let variance = ArrayD::from_shape_fn(IxDyn(&shape), |index| {
                let (point, column) = split_index(index.slice(), &shape, point_axes);
                let selection = &selections[point];
                let spread: f64 = selection
                    .beta_var
                    .iter()
                    .zip(proxies.values.column(column))
                    .map(|(var, x)| var * x * x)
                    .sum();
                selection.sigma2.map_or(spread, |sigma2| sigma2 + spread)
            });
            Some(labeled(variance, &dims, &coords)?)
        } else {
            None
        };

        Ok(SsusiPrediction { log_q, variance })
    }

    fn select(
        &self,
        latitude: f64,
        mlt: f64,
        altitude: f64,
        settings: &SsusiModelSettings,
    ) -> Result<Selection, ModelError> {
        let level = self
            .altitude
            .iter()
            .position(|candidate| *candidate == altitude)
            .ok_or(ModelError::AltitudeNotInTable { altitude })?;

        let (lat, hour) = if settings.interpolate {
            let lat = bracket("latitude", &self.latitude, latitude)?;
            let hour = periodic_bracket("mlt", &self.mlt, mlt, MLT_PERIOD_HOURS)?;
            match settings.method {
                InterpolationMethod::Linear => (lat, hour),
                InterpolationMethod::Nearest => (snap(lat), snap(hour)),
            }
        } else {
            let lat = nearest_index("latitude", &self.latitude, latitude)?;
            let hour = nearest_index("mlt", &self.mlt, mlt)?;
            (exact(lat), exact(hour))
        };

        let proxies = self.proxies.len();
        let mut beta = Vec::with_capacity(proxies);
        let mut beta_var = Vec::with_capacity(proxies);
        for proxy in 0..proxies {
            let value = bilinear(&lat, &hour, |i, j| self.beta[[level, i, j, proxy]]);
            let var = bilinear(&lat, &hour, |i, j| {
                self.beta_std[[level, i, j, proxy]].powi(2)
            });
            beta.push(if value.is_nan() { 0.0 } else { value });
            beta_var.push(if var.is_nan() { 0.0 } else { var });
        }
        let sigma2 = self
            .sigma2
            .as_ref()
            .map(|sigma2| bilinear(&lat, &hour, |i, j| sigma2[[level, i, j]]));

        Ok(Selection {
            beta,
            beta_var,
            sigma2,
        })
    }

    fn proxy_matrix(&self, proxies: &ProxyValues<'_>) -> Result<ProxyMatrix, ModelError> {
        match proxies {
            ProxyValues::Raw(values) => self.raw_proxy_matrix(values),
            ProxyValues::Labeled(values) => self.labeled_proxy_matrix(values),
        }
    }

    fn raw_proxy_matrix(&self, values: &ArrayViewD<'_, f64>) -> Result<ProxyMatrix, ModelError> {
        let mut values = values.clone();
        while values.ndim() < 2 {
            values.insert_axis_inplace(Axis(0));
        }

        let expected = self.proxies.len() - usize::from(self.has_offset());
        let axis = values
            .shape()
            .iter()
            .position(|len| *len == expected)
            .ok_or_else(|| ModelError::ProxyCount {
                expected,
                shape: values.shape().to_vec(),
            })?;
        if axis != 0 {
            tracing::warn!(
                axis,
                shape = ?values.shape(),
                "proxy values are not ordered along axis 0, swapping axes; \
                 put one proxy per row to remove the ambiguity"
            );
            values.swap_axes(0, axis);
        }

        let shape = values.shape()[1..].to_vec();
        let dims = (0..shape.len()).map(|axis| format!("dim_{axis}")).collect();
        let rows = self
            .proxies
            .iter()
            .scan(0, |next, name| {
                if name == OFFSET_PROXY {
                    Some(None)
                } else {
                    *next += 1;
                    Some(Some(*next - 1))
                }
            })
            .collect();
        Ok(ProxyMatrix::gather(&values, rows, dims, shape, BTreeMap::new()))
    }

    fn labeled_proxy_matrix(&self, values: &LabeledArray) -> Result<ProxyMatrix, ModelError> {
        let axis = values
            .axis_of("proxy")
            .ok_or_else(|| ModelError::UnknownDimension {
                dim: "proxy".to_string(),
            })?;
        let labels = match values.coord("proxy") {
            Some(Coordinate::Labels(labels)) => labels,
            _ => {
                return Err(ModelError::NonLabelCoordinate {
                    dim: "proxy".to_string(),
                });
            }
        };

        let rows = self
            .proxies
            .iter()
            .map(|name| match labels.iter().position(|label| label == name) {
                Some(row) => Ok(Some(row)),
                None if name == OFFSET_PROXY => Ok(None),
                None => Err(ModelError::MissingProxy { name: name.clone() }),
            })
            .collect::<Result<Vec<_>, _>>()?;

        let order: Vec<usize> = std::iter::once(axis)
            .chain((0..values.data().ndim()).filter(|other| *other != axis))
            .collect();
        let data = values.data().view().permuted_axes(IxDyn(&order));
        let dims: Vec<String> = order[1..]
            .iter()
            .map(|axis| values.dims()[*axis].clone())
            .collect();
        let shape = data.shape()[1..].to_vec();
        let coords = values
            .coords()
            .iter()
            .filter(|(dim, _)| dims.contains(dim))
            .map(|(dim, coord)| (dim.clone(), coord.clone()))
            .collect();
        Ok(ProxyMatrix::gather(&data, rows, dims, shape, coords))
    }
}

/// Geomagnetic latitude [deg], magnetic local time [h] and altitude [km];
/// each is a 0-d or 1-d view.
#[derive(Debug, Clone)]
pub struct SsusiQuery<'a> {
    pub latitude: ArrayViewD<'a, f64>,
    pub mlt: ArrayViewD<'a, f64>,
    pub altitude: ArrayViewD<'a, f64>,
}

impl<'a> SsusiQuery<'a> {
    pub fn new(
        latitude: ArrayViewD<'a, f64>,
        mlt: ArrayViewD<'a, f64>,
        altitude: ArrayViewD<'a, f64>,
    ) -> Self {
        Self {
            latitude,
            mlt,
            altitude,
        }
    }

    fn axis(&self, dim: TableDim) -> &ArrayViewD<'a, f64> {
        match dim {
            TableDim::Altitude => &self.altitude,
            TableDim::Latitude => &self.latitude,
            TableDim::Mlt => &self.mlt,
        }
    }
}

/// Proxy values: a raw array with one proxy per row, in table order
/// without the offset, or a labeled array with a `proxy` dimension.
#[derive(Debug, Clone)]
pub enum ProxyValues<'a> {
    Raw(ArrayViewD<'a, f64>),
    Labeled(&'a LabeledArray),
}

#[derive(Debug, Clone, PartialEq)]
pub struct SsusiPrediction {
    /// Natural logarithm of the ionization rate [log(cm⁻³ s⁻¹)].
    pub log_q: LabeledArray,
    pub variance: Option<LabeledArray>,
}

pub fn ssusiq2023(
    model: &SsusiModel,
    query: &SsusiQuery<'_>,
    proxies: &ProxyValues<'_>,
    settings: &SsusiModelSettings,
) -> Result<SsusiPrediction, ModelError> {
    model.evaluate(query, proxies, settings)
}

struct Selection {
    beta: Vec<f64>,
    beta_var: Vec<f64>,
    sigma2: Option<f64>,
}

struct QueryAxis {
    dim: TableDim,
    values: Vec<f64>,
    vector: bool,
}

impl QueryAxis {
    fn len(&self) -> usize {
        self.values.len()
    }
}

/// Proxies in table order, one column per output element of the proxy
/// array's remaining axes.
struct ProxyMatrix {
    values: Array2<f64>,
    dims: Vec<String>,
    shape: Vec<usize>,
    coords: BTreeMap<String, Coordinate>,
}

impl ProxyMatrix {
    /// `rows[p]` is the row of `data` holding table proxy `p`, `None` for the
    /// implicit offset.
    fn gather(
        data: &ArrayViewD<'_, f64>,
        rows: Vec<Option<usize>>,
        dims: Vec<String>,
        shape: Vec<usize>,
        coords: BTreeMap<String, Coordinate>,
    ) -> Self {
        let columns: usize = shape.iter().product();
        let flat: Vec<Vec<f64>> = data
            .axis_iter(Axis(0))
            .map(|row| row.iter().copied().collect())
            .collect();
        let values = Array2::from_shape_fn((rows.len(), columns), |(proxy, column)| {
            rows[proxy].map_or(1.0, |row| flat[row][column])
        });
        Self {
            values,
            dims,
            shape,
            coords,
        }
    }
}

fn query_axis(dim: TableDim, view: &ArrayViewD<'_, f64>) -> Result<QueryAxis, ModelError> {
    if view.ndim() > 1 {
        return Err(ModelError::QueryShape {
            field: dim.as_str(),
            ndim: view.ndim(),
        });
    }
    Ok(QueryAxis {
        dim,
        values: view.iter().copied().collect(),
        vector: view.ndim() == 1,
    })
}

fn exact(index: usize) -> Bracket {
    Bracket {
        lower: index,
        upper: index,
        weight: 0.0,
    }
}

fn snap(bracket: Bracket) -> Bracket {
    exact(if bracket.weight <= 0.5 {
        bracket.lower
    } else {
        bracket.upper
    })
}

fn bilinear<F>(lat: &Bracket, hour: &Bracket, value: F) -> f64
where
    F: Fn(usize, usize) -> f64,
{
    let lower = hour.blend(value(lat.lower, hour.lower), value(lat.lower, hour.upper));
    let upper = hour.blend(value(lat.upper, hour.lower), value(lat.upper, hour.upper));
    lat.blend(lower, upper)
}

fn split_index(index: &[usize], shape: &[usize], point_axes: usize) -> (usize, usize) {
    let ravel = |index: &[usize], shape: &[usize]| {
        index
            .iter()
            .zip(shape)
            .fold(0, |flat, (position, len)| flat * len + position)
    };
    (
        ravel(&index[..point_axes], &shape[..point_axes]),
        ravel(&index[point_axes..], &shape[point_axes..]),
    )
}

fn labeled(
    data: ArrayD<f64>,
    dims: &[String],
    coords: &BTreeMap<String, Coordinate>,
) -> Result<LabeledArray, ModelError> {
    coords.iter().try_fold(
        LabeledArray::new(data, dims.iter().cloned())?,
        |array, (dim, coord)| array.with_coord(dim.clone(), coord.clone()),
    )
}

fn nested4(
    variable: &'static str,
    nested: Vec<Vec<Vec<Vec<Option<f64>>>>>,
    shape: [usize; 4],
) -> Result<Array4<f64>, CoefficientTableError> {
    let mismatch = || CoefficientTableError::Shape {
        variable,
        expected: shape.to_vec(),
        actual: vec![
            nested.len(),
            nested.first().map_or(0, Vec::len),
            nested.first().and_then(|lat| lat.first()).map_or(0, Vec::len),
            nested
                .first()
                .and_then(|lat| lat.first())
                .and_then(|mlt| mlt.first())
                .map_or(0, Vec::len),
        ],
    };
    let consistent = nested.len() == shape[0]
        && nested.iter().all(|lat| {
            lat.len() == shape[1]
                && lat.iter().all(|mlt| {
                    mlt.len() == shape[2] && mlt.iter().all(|proxy| proxy.len() == shape[3])
                })
        });
    if !consistent {
        return Err(mismatch());
    }
    Ok(Array4::from_shape_fn(shape, |(a, l, m, p)| {
        nested[a][l][m][p].unwrap_or(f64::NAN)
    }))
}

fn nested3(
    variable: &'static str,
    nested: Vec<Vec<Vec<Option<f64>>>>,
    shape: [usize; 3],
) -> Result<Array3<f64>, CoefficientTableError> {
    let consistent = nested.len() == shape[0]
        && nested
            .iter()
            .all(|lat| lat.len() == shape[1] && lat.iter().all(|mlt| mlt.len() == shape[2]));
    if !consistent {
        return Err(CoefficientTableError::Shape {
            variable,
            expected: shape.to_vec(),
            actual: vec![
                nested.len(),
                nested.first().map_or(0, Vec::len),
                nested.first().and_then(|lat| lat.first()).map_or(0, Vec::len),
            ],
        });
    }
    Ok(Array3::from_shape_fn(shape, |(a, l, m)| {
        nested[a][l][m].unwrap_or(f64::NAN)
    }))
}
