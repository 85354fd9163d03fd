//! Mono-energetic particle energy-dissipation parametrizations.
//!
//! Every parametrization maps (energy [keV], energy flux [keV cm⁻² s⁻¹],
//! scale height [cm], mass density [g cm⁻³]) to an energy-dissipation rate,
//! broadcasting the four inputs NumPy-style.

pub mod brems;
pub mod electrons;
pub mod protons;
pub mod ssusi;

pub use brems::{A_BR, Berger1974, E_BR, Z_BR, berger1974, berger1974_ediss};
pub use electrons::{POLY_F2008, POLY_F2010, fang2008, fang2010_mono, rr1987, rr1987_mod};
pub use protons::{POLY_F2013, fang2013_protons};
pub use ssusi::{SsusiCoefficients, SsusiIonizationInput, ssusi_ioniz};

use crate::numerics::broadcast::{BroadcastError, common_shape, try_map_indexed};
use crate::numerics::rbf::RbfError;
use ndarray::{ArrayD, ArrayViewD};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum IonizationError {
    #[error("invalid {field} = {value} at flat index {index}")]
    InvalidInput {
        field: &'static str,
        index: usize,
        value: f64,
    },
    #[error(transparent)]
    Broadcast(#[from] BroadcastError),
    #[error("coefficient table '{table}' needs {expected} rows of 4, got {actual}")]
    TableShape {
        table: &'static str,
        expected: usize,
        actual: usize,
    },
    #[error("bremsstrahlung interpolation failed: {0}")]
    Interpolation(#[from] RbfError),
}

/// The four broadcastable inputs shared by all mono-energetic parametrizations.
#[derive(Debug, Clone)]
pub struct DissipationInput<'a> {
    pub energy: ArrayViewD<'a, f64>,
    pub flux: ArrayViewD<'a, f64>,
    pub scale_height: ArrayViewD<'a, f64>,
    pub rho: ArrayViewD<'a, f64>,
}

impl<'a> DissipationInput<'a> {
    pub fn new(
        energy: ArrayViewD<'a, f64>,
        flux: ArrayViewD<'a, f64>,
        scale_height: ArrayViewD<'a, f64>,
        rho: ArrayViewD<'a, f64>,
    ) -> Self {
        Self {
            energy,
            flux,
            scale_height,
            rho,
        }
    }

    pub fn output_shape(&self) -> Result<Vec<usize>, BroadcastError> {
        common_shape(&[
            self.energy.shape(),
            self.flux.shape(),
            self.scale_height.shape(),
            self.rho.shape(),
        ])
    }
}

pub trait EnergyDissipation {
    fn energy_dissipation(
        &self,
        input: &DissipationInput<'_>,
    ) -> Result<ArrayD<f64>, IonizationError>;
}

impl<F> EnergyDissipation for F
where
    F: Fn(&DissipationInput<'_>) -> Result<ArrayD<f64>, IonizationError>,
{
    fn energy_dissipation(
        &self,
        input: &DissipationInput<'_>,
    ) -> Result<ArrayD<f64>, IonizationError> {
        self(input)
    }
}

/// The closed-form parametrizations with their published coefficients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Parametrization {
    Rr1987,
    Rr1987Mod,
    Fang2008,
    Fang2010,
    Fang2013Protons,
}

impl Parametrization {
    pub const ALL: [Self; 5] = [
        Self::Rr1987,
        Self::Rr1987Mod,
        Self::Fang2008,
        Self::Fang2010,
        Self::Fang2013Protons,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Rr1987 => "rr1987",
            Self::Rr1987Mod => "rr1987_mod",
            Self::Fang2008 => "fang2008",
            Self::Fang2010 => "fang2010_mono",
            Self::Fang2013Protons => "fang2013_protons",
        }
    }

    pub const fn species(self) -> crate::domain::Species {
        match self {
            Self::Fang2013Protons => crate::domain::Species::Proton,
            _ => crate::domain::Species::Electron,
        }
    }
}

impl EnergyDissipation for Parametrization {
    fn energy_dissipation(
        &self,
        input: &DissipationInput<'_>,
    ) -> Result<ArrayD<f64>, IonizationError> {
        match self {
            Self::Rr1987 => rr1987(input),
            Self::Rr1987Mod => rr1987_mod(input),
            Self::Fang2008 => fang2008(input, None),
            Self::Fang2010 => fang2010_mono(input, None),
            Self::Fang2013Protons => fang2013_protons(input, None),
        }
    }
}

/// Sum of stretched-exponential terms `c0·y^c1·exp(-c2·y^c3) + ...`.
pub(crate) fn depth_profile(coefficients: &[f64], y: f64) -> f64 {
    coefficients
        .chunks_exact(4)
        .map(|c| c[0] * y.powf(c[1]) * (-c[2] * y.powf(c[3])).exp())
        .sum()
}

pub(crate) fn validate_table(
    table: &'static str,
    pij: &[[f64; 4]],
    expected: usize,
) -> Result<(), IonizationError> {
    if pij.len() != expected {
        return Err(IonizationError::TableShape {
            table,
            expected,
            actual: pij.len(),
        });
    }
    Ok(())
}

/// Broadcast, validate and evaluate `kernel(energy, flux, scale_height, rho)`.
///
/// Zero flux yields exactly `0.0` without calling the kernel.
pub(crate) fn evaluate_validated<K>(
    input: &DissipationInput<'_>,
    mut kernel: K,
) -> Result<ArrayD<f64>, IonizationError>
where
    K: FnMut(f64, f64, f64, f64) -> f64,
{
    try_map_indexed(
        &[
            input.energy.view(),
            input.flux.view(),
            input.scale_height.view(),
            input.rho.view(),
        ],
        |index, sample| {
            let [energy, flux, scale_height, rho] = [sample[0], sample[1], sample[2], sample[3]];
            check_positive("energy", index, energy)?;
            check_positive("scale_height", index, scale_height)?;
            check_non_negative("rho", index, rho)?;
            check_non_negative("flux", index, flux)?;
            if flux == 0.0 {
                return Ok(0.0);
            }
            Ok(kernel(energy, flux, scale_height, rho))
        },
    )
}

pub(crate) fn check_positive(
    field: &'static str,
    index: usize,
    value: f64,
) -> Result<(), IonizationError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(IonizationError::InvalidInput {
            field,
            index,
            value,
        })
    }
}

pub(crate) fn check_non_negative(
    field: &'static str,
    index: usize,
    value: f64,
) -> Result<(), IonizationError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(IonizationError::InvalidInput {
            field,
            index,
            value,
        })
    }
}
