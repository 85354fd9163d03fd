//! Mono-energetic proton impact ionization.
//!
//! Fang, Lummerzheim and Jackman, JGR Space Physics 118, 5369-5378, 2013,
//! doi:10.1002/jgra.50484.

use super::electrons::energy_coefficients;
use super::{DissipationInput, IonizationError, depth_profile, evaluate_validated, validate_table};
use ndarray::ArrayD;

pub const POLY_F2013: [[f64; 4]; 12] = [
    [2.55050e+0, 2.69476e-1, -2.58425e-1, 4.43190e-2],
    [6.39287e-1, -1.85817e-1, -3.15636e-2, 1.01370e-2],
    [1.63996e+0, 2.43580e-1, 4.29873e-2, 3.77803e-2],
    [-2.13479e-1, 1.42464e-1, 1.55840e-2, 1.97407e-3],
    [-1.65764e-1, 3.39654e-1, -9.87971e-3, 4.02411e-3],
    [-3.59358e-2, 2.50330e-2, -3.29365e-2, 5.08057e-3],
    [-6.26528e-1, 1.46865e+0, 2.51853e-1, -4.57132e-2],
    [1.01384e+0, 5.94301e-2, -3.27839e-2, 3.42688e-3],
    [-1.29454e-6, -1.43623e-1, 2.82583e-1, 8.29809e-2],
    [-1.18622e-1, 1.79191e-1, 6.49171e-2, -3.99715e-3],
    [2.94890e+0, -5.75821e-1, 2.48563e-2, 8.31078e-2],
    [-1.89515e-1, 3.53452e-2, 7.77964e-2, -4.06034e-3],
];

pub fn fang2013_protons(
    input: &DissipationInput<'_>,
    pij: Option<&[[f64; 4]]>,
) -> Result<ArrayD<f64>, IonizationError> {
    let pij = pij.unwrap_or(&POLY_F2013);
    validate_table("fang2013", pij, 12)?;
    evaluate_validated(input, |energy, flux, scale_height, rho| {
        let coefficients = energy_coefficients(pij, energy);
        let y = 7.5 / energy * (1.0e4 * rho * scale_height).powf(0.9);
        depth_profile(&coefficients, y) * flux / scale_height
    })
}
