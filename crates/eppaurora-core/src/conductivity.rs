//! Ionospheric conductivities from electron densities and conductances from
//! precipitating electron energy and flux.
//!
//! Brekke, Doupnik and Banks, JGR 79(25), 3773-3790, 1974; Vickrey, Vondrak
//! and Matthews, JGR 86(A1), 65-75, 1981; Robinson et al., JGR 92(A3),
//! 2565-2569, 1987. Electron-neutral collisions are neglected.

use crate::common::constants::{E_CHARGE, ELECTRON_GYRO_HZ_PER_T, ELECTRON_MASS_GEV};
use crate::numerics::broadcast::{BroadcastError, try_map_indexed};
use ndarray::{ArrayD, ArrayViewD};
use std::f64::consts::PI;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConductivityError {
    #[error("{field} = {value} at flat index {index} is not {requirement}")]
    InvalidInput {
        field: &'static str,
        requirement: &'static str,
        index: usize,
        value: f64,
    },
    #[error(transparent)]
    Broadcast(#[from] BroadcastError),
}

const POSITIVE: &str = "finite and > 0";
const NON_NEGATIVE: &str = "finite and >= 0";

/// Default ion mass [GeV / c²], roughly NO⁺ and O₂⁺.
pub const DEFAULT_ION_MASS_GEV: f64 = 30.0;

/// Ion-neutral collision frequency [s⁻¹] from neutral density [cm⁻³].
pub fn ion_coll(n_neutral: &ArrayViewD<'_, f64>) -> Result<ArrayD<f64>, ConductivityError> {
    try_map_indexed(&[n_neutral.view()], |index, sample| {
        require("n_neutral", NON_NEGATIVE, index, sample[0], sample[0] >= 0.0)?;
        Ok(3.75e-10 * sample[0])
    })
}

/// Ion cyclotron frequency [s⁻¹] for field strength [T] and ion mass [GeV / c²].
pub fn ion_gyro(
    bmag: &ArrayViewD<'_, f64>,
    m_ion: &ArrayViewD<'_, f64>,
) -> Result<ArrayD<f64>, ConductivityError> {
    try_map_indexed(&[bmag.view(), m_ion.view()], |index, sample| {
        let [bmag, m_ion] = [sample[0], sample[1]];
        require("bmag", POSITIVE, index, bmag, bmag > 0.0)?;
        require("m_ion", POSITIVE, index, m_ion, m_ion > 0.0)?;
        Ok(ion_gyro_frequency(bmag, m_ion))
    })
}

pub fn ion_gyro_frequency(bmag: f64, m_ion: f64) -> f64 {
    2.0 * PI * ELECTRON_GYRO_HZ_PER_T * bmag * (ELECTRON_MASS_GEV / m_ion)
}

/// Pedersen conductivity σP [S m⁻¹] for electron density in m⁻³.
pub fn pedersen(
    ne: &ArrayViewD<'_, f64>,
    bmag: &ArrayViewD<'_, f64>,
    ion_gyro: &ArrayViewD<'_, f64>,
    ion_coll: &ArrayViewD<'_, f64>,
) -> Result<ArrayD<f64>, ConductivityError> {
    map_plasma(ne, bmag, ion_gyro, ion_coll, |ne, bmag, gyro, coll| {
        ne * E_CHARGE / bmag * gyro * coll / (gyro * gyro + coll * coll)
    })
}

/// Hall conductivity σH [S m⁻¹] for electron density in m⁻³.
pub fn hall(
    ne: &ArrayViewD<'_, f64>,
    bmag: &ArrayViewD<'_, f64>,
    ion_gyro: &ArrayViewD<'_, f64>,
    ion_coll: &ArrayViewD<'_, f64>,
) -> Result<ArrayD<f64>, ConductivityError> {
    map_plasma(ne, bmag, ion_gyro, ion_coll, |ne, bmag, gyro, coll| {
        ne * E_CHARGE / bmag * coll * coll / (gyro * gyro + coll * coll)
    })
}

/// Robinson et al. 1987 Pedersen conductance ΣP [S] for mean energy [keV]
/// and energy flux [erg cm⁻² s⁻¹].
pub fn sigma_p(en_avg: f64, flux: f64) -> f64 {
    40.0 * en_avg / (16.0 + en_avg * en_avg) * flux.sqrt()
}

pub fn sigma_h(en_avg: f64, flux: f64) -> f64 {
    0.45 * en_avg.powf(0.85) * sigma_p(en_avg, flux)
}

pub fn sigma_p_robinson1987(
    en_avg: &ArrayViewD<'_, f64>,
    flux: &ArrayViewD<'_, f64>,
) -> Result<ArrayD<f64>, ConductivityError> {
    map_precipitation(en_avg, flux, sigma_p)
}

pub fn sigma_h_robinson1987(
    en_avg: &ArrayViewD<'_, f64>,
    flux: &ArrayViewD<'_, f64>,
) -> Result<ArrayD<f64>, ConductivityError> {
    map_precipitation(en_avg, flux, sigma_h)
}

fn map_plasma<F>(
    ne: &ArrayViewD<'_, f64>,
    bmag: &ArrayViewD<'_, f64>,
    ion_gyro: &ArrayViewD<'_, f64>,
    ion_coll: &ArrayViewD<'_, f64>,
    conductivity: F,
) -> Result<ArrayD<f64>, ConductivityError>
where
    F: Fn(f64, f64, f64, f64) -> f64,
{
    let operands = [ne.view(), bmag.view(), ion_gyro.view(), ion_coll.view()];
    try_map_indexed(&operands, |index, sample| {
        let [ne, bmag, gyro, coll] = [sample[0], sample[1], sample[2], sample[3]];
        require("ne", NON_NEGATIVE, index, ne, ne >= 0.0)?;
        require("bmag", POSITIVE, index, bmag, bmag > 0.0)?;
        require("ion_gyro", POSITIVE, index, gyro, gyro > 0.0)?;
        require("ion_coll", NON_NEGATIVE, index, coll, coll >= 0.0)?;
        Ok(conductivity(ne, bmag, gyro, coll))
    })
}

fn map_precipitation(
    en_avg: &ArrayViewD<'_, f64>,
    flux: &ArrayViewD<'_, f64>,
    conductance: fn(f64, f64) -> f64,
) -> Result<ArrayD<f64>, ConductivityError> {
    try_map_indexed(&[en_avg.view(), flux.view()], |index, sample| {
        let [en_avg, flux] = [sample[0], sample[1]];
        require("en_avg", POSITIVE, index, en_avg, en_avg > 0.0)?;
        require("flux", NON_NEGATIVE, index, flux, flux >= 0.0)?;
        Ok(conductance(en_avg, flux))
    })
}

fn require(
    field: &'static str,
    requirement: &'static str,
    index: usize,
    value: f64,
    valid: bool,
) -> Result<(), ConductivityError> {
    if value.is_finite() && valid {
        Ok(())
    } else {
        Err(ConductivityError::InvalidInput {
            field,
            requirement,
            index,
            value,
        })
    }
}
