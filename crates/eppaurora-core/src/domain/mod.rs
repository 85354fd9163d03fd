pub mod errors;

pub use errors::{AuroraError, AuroraErrorCategory, AuroraResult};

use ndarray::{Array1, ArrayD, Axis};
use std::fmt::{Display, Formatter};

/// Particle species a parametrization applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Species {
    Electron,
    Proton,
}

impl Species {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Electron => "electron",
            Self::Proton => "proton",
        }
    }
}

impl Display for Species {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str((*self).as_str())
    }
}

/// Validated atmospheric column, ordered by altitude.
#[derive(Debug, Clone, PartialEq)]
pub struct AtmosphereColumn {
    altitude_km: Vec<f64>,
    scale_height: Vec<f64>,
    rho: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AtmosphereError {
    #[error("atmosphere column requires at least 1 level")]
    Empty,
    #[error(
        "atmosphere column length mismatch: altitude={altitude}, scale_height={scale_height}, rho={rho}"
    )]
    LengthMismatch {
        altitude: usize,
        scale_height: usize,
        rho: usize,
    },
    #[error("atmosphere '{field}' must be finite and > 0 at level {index}, got {value}")]
    NonPositive {
        field: &'static str,
        index: usize,
        value: f64,
    },
    #[error("atmosphere '{field}' must be finite and >= 0 at level {index}, got {value}")]
    Negative {
        field: &'static str,
        index: usize,
        value: f64,
    },
    #[error(
        "atmosphere altitudes must be strictly increasing, level {index} has {current} after {previous}"
    )]
    NonIncreasingAltitude {
        index: usize,
        previous: f64,
        current: f64,
    },
}

impl AtmosphereColumn {
    /// Altitudes in km, scale heights in cm, mass densities in g/cm³.
    pub fn new(
        altitude_km: Vec<f64>,
        scale_height: Vec<f64>,
        rho: Vec<f64>,
    ) -> Result<Self, AtmosphereError> {
        if altitude_km.is_empty() {
            return Err(AtmosphereError::Empty);
        }
        if scale_height.len() != altitude_km.len() || rho.len() != altitude_km.len() {
            return Err(AtmosphereError::LengthMismatch {
                altitude: altitude_km.len(),
                scale_height: scale_height.len(),
                rho: rho.len(),
            });
        }

        if let Some((index, value)) = first_invalid(&scale_height, |value| value > 0.0) {
            return Err(AtmosphereError::NonPositive {
                field: "scale_height",
                index,
                value,
            });
        }
        if let Some((index, value)) = first_invalid(&rho, |value| value >= 0.0) {
            return Err(AtmosphereError::Negative {
                field: "rho",
                index,
                value,
            });
        }

        for index in 1..altitude_km.len() {
            let previous = altitude_km[index - 1];
            let current = altitude_km[index];
            if current <= previous || !current.is_finite() {
                return Err(AtmosphereError::NonIncreasingAltitude {
                    index,
                    previous,
                    current,
                });
            }
        }

        Ok(Self {
            altitude_km,
            scale_height,
            rho,
        })
    }

    pub fn len(&self) -> usize {
        self.altitude_km.len()
    }

    pub fn is_empty(&self) -> bool {
        self.altitude_km.is_empty()
    }

    pub fn altitude_km(&self) -> &[f64] {
        &self.altitude_km
    }

    /// Scale heights as an `(N, 1)` column, ready to broadcast against `(1, M)` energies.
    pub fn scale_height_column(&self) -> ArrayD<f64> {
        column(&self.scale_height)
    }

    /// Mass densities as an `(N, 1)` column.
    pub fn rho_column(&self) -> ArrayD<f64> {
        column(&self.rho)
    }
}

fn first_invalid(values: &[f64], valid: impl Fn(f64) -> bool) -> Option<(usize, f64)> {
    values
        .iter()
        .copied()
        .enumerate()
        .find(|(_, value)| !value.is_finite() || !valid(*value))
}

fn column(values: &[f64]) -> ArrayD<f64> {
    Array1::from(values.to_vec()).insert_axis(Axis(1)).into_dyn()
}

#[cfg(test)]
mod tests {
    use super::{AtmosphereColumn, AtmosphereError, Species};

    #[test]
    fn atmosphere_column_exposes_broadcastable_columns() {
        let column = AtmosphereColumn::new(
            vec![100.0, 150.0, 200.0],
            vec![6.0e5, 27.0e5, 40.0e5],
            vec![5.0e-10, 1.7e-12, 2.6e-13],
        )
        .expect("valid column");

        assert_eq!(column.len(), 3);
        assert_eq!(column.scale_height_column().shape(), &[3, 1]);
        assert_eq!(column.rho_column()[[1, 0]], 1.7e-12);
    }

    #[test]
    fn atmosphere_column_rejects_non_physical_levels() {
        let error = AtmosphereColumn::new(vec![100.0, 90.0], vec![6.0e5, 6.0e5], vec![1.0, 1.0])
            .expect_err("decreasing altitude should fail");
        assert_eq!(
            error,
            AtmosphereError::NonIncreasingAltitude {
                index: 1,
                previous: 100.0,
                current: 90.0,
            }
        );

        let error = AtmosphereColumn::new(vec![100.0], vec![-6.0e5], vec![1.0])
            .expect_err("negative scale height should fail");
        assert_eq!(
            error,
            AtmosphereError::NonPositive {
                field: "scale_height",
                index: 0,
                value: -6.0e5,
            }
        );

        let vacuum = AtmosphereColumn::new(vec![500.0], vec![60.0e5], vec![0.0]);
        assert!(vacuum.is_ok(), "zero density is a valid level");
        assert_eq!(
            AtmosphereColumn::new(vec![100.0], vec![6.0e5], vec![-1.0e-10])
                .expect_err("negative density should fail"),
            AtmosphereError::Negative {
                field: "rho",
                index: 0,
                value: -1.0e-10,
            }
        );
    }

    #[test]
    fn species_renders_lowercase() {
        assert_eq!(Species::Electron.to_string(), "electron");
        assert_eq!(Species::Proton.as_str(), "proton");
    }
}
