//! Auroral and medium-energy electron parametrizations, 100 eV to 1 MeV.
//!
//! Roble and Ridley, Ann. Geophys., 5A(6), 369-382, 1987 (with the typo
//! correction from Fang et al. 2008), Fang et al., JGR 113, A09311, 2008
//! and Fang et al., GRL 37, L22106, 2010.

use super::{DissipationInput, IonizationError, depth_profile, evaluate_validated, validate_table};
use crate::numerics::polyval;
use ndarray::ArrayD;

const RR1987_COEFFS: [f64; 8] = [
    2.11685, 2.97035, 2.09710, 0.74054, 0.58795, 1.72746, 1.37459, 0.93296,
];

/// Refitted Roble and Ridley coefficients that track Fang et al. 2008 more
/// closely.
const RR1987_MOD_COEFFS: [f64; 8] = [
    3.233, 2.56588, 2.2541, 0.7297198, 1.106907, 1.71349, 1.8835444, 0.86472135,
];

/// Fang et al. 2008, Table 1: `ln c_i = Σ_j P_ij (ln E)^j`.
pub const POLY_F2008: [[f64; 4]; 8] = [
    [3.49979e-1, -6.18200e-2, -4.08124e-2, 1.65414e-2],
    [5.85425e-1, -5.00793e-2, 5.69309e-2, -4.02491e-3],
    [1.69692e-1, -2.58981e-2, 1.96822e-2, 1.20505e-3],
    [-1.22271e-1, -1.15532e-2, 5.37951e-6, 1.20189e-3],
    [1.57018, 2.87896e-1, -4.14857e-1, 5.18158e-2],
    [8.83195e-1, 4.31402e-2, -8.33599e-2, 1.02515e-2],
    [1.90953, -4.74704e-2, -1.80200e-1, 2.46652e-2],
    [-1.29566, -2.10952e-1, 2.73106e-1, -2.92752e-2],
];

/// Fang et al. 2010, Table 1.
pub const POLY_F2010: [[f64; 4]; 8] = [
    [1.24616E+0, 1.45903E+0, -2.42269E-1, 5.95459E-2],
    [2.23976E+0, -4.22918E-7, 1.36458E-2, 2.53332E-3],
    [1.41754E+0, 1.44597E-1, 1.70433E-2, 6.39717E-4],
    [2.48775E-1, -1.50890E-1, 6.30894E-9, 1.23707E-3],
    [-4.65119E-1, -1.05081E-1, -8.95701E-2, 1.22450E-2],
    [3.86019E-1, 1.75430E-3, -7.42960E-4, 4.60881E-4],
    [-6.45454E-1, 8.49555E-4, -4.28581E-2, -2.99302E-3],
    [9.48930E-1, 1.97385E-1, -2.50660E-3, -2.06938E-3],
];

/// Roble and Ridley 1987 Maxwellian energy dissipation [keV cm⁻³ s⁻¹].
pub fn rr1987(input: &DissipationInput<'_>) -> Result<ArrayD<f64>, IonizationError> {
    evaluate_validated(input, |energy, flux, scale_height, rho| {
        let y = maxwellian_depth(energy, scale_height, rho, 4.0e-6);
        0.5 * flux / scale_height * depth_profile(&RR1987_COEFFS, y)
    })
}

pub fn rr1987_mod(input: &DissipationInput<'_>) -> Result<ArrayD<f64>, IonizationError> {
    evaluate_validated(input, |energy, flux, scale_height, rho| {
        let y = maxwellian_depth(energy, scale_height, rho, 4.6e-6);
        0.5 * flux / scale_height * depth_profile(&RR1987_MOD_COEFFS, y)
    })
}

/// Fang et al. 2008 Maxwellian energy dissipation; `pij` defaults to
/// [`POLY_F2008`].
pub fn fang2008(
    input: &DissipationInput<'_>,
    pij: Option<&[[f64; 4]]>,
) -> Result<ArrayD<f64>, IonizationError> {
    let pij = pij.unwrap_or(&POLY_F2008);
    validate_table("fang2008", pij, 8)?;
    evaluate_validated(input, |energy, flux, scale_height, rho| {
        let coefficients = energy_coefficients(pij, energy);
        let y = maxwellian_depth(energy, scale_height, rho, 4.0e-6);
        0.5 * depth_profile(&coefficients, y) * flux / scale_height
    })
}

/// Fang et al. 2010 mono-energetic beam; `pij` defaults to [`POLY_F2010`].
pub fn fang2010_mono(
    input: &DissipationInput<'_>,
    pij: Option<&[[f64; 4]]>,
) -> Result<ArrayD<f64>, IonizationError> {
    let pij = pij.unwrap_or(&POLY_F2010);
    validate_table("fang2010", pij, 8)?;
    evaluate_validated(input, |energy, flux, scale_height, rho| {
        let coefficients = energy_coefficients(pij, energy);
        let y = 2.0 / energy * (rho * scale_height / 6.0e-6).powf(0.7);
        depth_profile(&coefficients, y) * flux / scale_height
    })
}

// Roble and Ridley 1987, p. 371; divided by E as corrected in Fang et al. 2008, Eq. (4).
fn maxwellian_depth(energy: f64, scale_height: f64, rho: f64, column_scale: f64) -> f64 {
    (rho * scale_height / column_scale).powf(1.0 / 1.65) / energy
}

pub(crate) fn energy_coefficients(pij: &[[f64; 4]], energy: f64) -> Vec<f64> {
    let log_energy = energy.ln();
    pij.iter()
        .map(|row| polyval(row, log_energy).exp())
        .collect()
}
