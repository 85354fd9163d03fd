//! Analytical auroral ionization production profile from the SSUSI
//! Aurora LID algorithm (ATBD v2.0, Sect. 2.6.2).

use super::{IonizationError, check_non_negative, check_positive};
use crate::numerics::broadcast::{BroadcastError, common_shape, try_map_indexed};
use crate::numerics::polyval;
use ndarray::{ArrayD, ArrayViewD};
use std::f64::consts::E;

/// Coefficients of the peak-height and peak-rate polynomials in
/// `log10(E / eref)`, constant term first.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SsusiCoefficients {
    pub chmax: [f64; 2],
    pub cpmax: [f64; 3],
    pub eref: f64,
    pub pref: f64,
    pub shpc: f64,
}

impl SsusiCoefficients {
    pub const ELECTRONS: Self = Self {
        chmax: [2.07923, -9.41205e-2],
        cpmax: [0.0, 9.25777e-1, -5.03201e-1],
        eref: 1.0,
        pref: 2.57e3,
        shpc: 1.427e10,
    };

    pub const PROTONS: Self = Self {
        chmax: [2.078, -4.072e-2],
        cpmax: [0.0, 3.50766e-1, -8.84737e-2],
        eref: 1.0,
        pref: 2.57e3,
        shpc: 1.427e10,
    };

    /// Peak altitude [km] for a mean energy [keV].
    pub fn peak_altitude(&self, energy: f64) -> f64 {
        10f64.powf(polyval(&self.chmax, (energy / self.eref).log10()))
    }

    /// Peak production per unit energy flux.
    pub fn peak_rate(&self, energy: f64) -> f64 {
        10f64.powf(polyval(&self.cpmax, (energy / self.eref).log10())) * self.pref
    }

    /// Width of the Chapman-like layer [km].
    pub fn shape_height(&self, energy: f64) -> f64 {
        1.0e-5 / E * self.shpc / self.peak_rate(energy)
    }
}

impl Default for SsusiCoefficients {
    fn default() -> Self {
        Self::ELECTRONS
    }
}

#[derive(Debug, Clone)]
pub struct SsusiIonizationInput<'a> {
    /// Altitude [km].
    pub altitude: ArrayViewD<'a, f64>,
    /// Mean energy [keV].
    pub energy: ArrayViewD<'a, f64>,
    /// Energy flux [erg cm⁻² s⁻¹], not keV.
    pub flux: ArrayViewD<'a, f64>,
}

impl<'a> SsusiIonizationInput<'a> {
    pub fn new(
        altitude: ArrayViewD<'a, f64>,
        energy: ArrayViewD<'a, f64>,
        flux: ArrayViewD<'a, f64>,
    ) -> Self {
        Self {
            altitude,
            energy,
            flux,
        }
    }

    pub fn output_shape(&self) -> Result<Vec<usize>, BroadcastError> {
        common_shape(&[self.altitude.shape(), self.energy.shape(), self.flux.shape()])
    }
}

/// Ionization rate `q(z) = Q·p·exp(1 - r - exp(-r))`, `r = (z - h_peak) / h_shape`.
pub fn ssusi_ioniz(
    input: &SsusiIonizationInput<'_>,
    coefficients: &SsusiCoefficients,
) -> Result<ArrayD<f64>, IonizationError> {
    try_map_indexed(
        &[input.altitude.view(), input.energy.view(), input.flux.view()],
        |index, sample| {
            let [altitude, energy, flux] = [sample[0], sample[1], sample[2]];
            if !altitude.is_finite() {
                return Err(IonizationError::InvalidInput {
                    field: "altitude",
                    index,
                    value: altitude,
                });
            }
            check_positive("energy", index, energy)?;
            check_non_negative("flux", index, flux)?;
            if flux == 0.0 {
                return Ok(0.0);
            }

            let peak_rate = coefficients.peak_rate(energy);
            let reduced = (altitude - coefficients.peak_altitude(energy))
                / coefficients.shape_height(energy);
            Ok(flux * peak_rate * (1.0 - reduced - (-reduced).exp()).exp())
        },
    )
}
