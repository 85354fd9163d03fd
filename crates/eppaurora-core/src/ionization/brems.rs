//! Bremsstrahlung ionization by secondary electrons.
//!
//! Coefficients from Berger, Seltzer and Maeda, J. Atmos. Terr. Phys. 36(4),
//! 591-617, 1974, doi:10.1016/0021-9169(74)90085-3, interpolated with radial
//! basis functions over (energy, scaled column depth).

use super::{
    DissipationInput, EnergyDissipation, IonizationError, check_non_negative, check_positive,
};
use crate::common::settings::BremsstrahlungSettings;
use crate::numerics::broadcast::try_map_indexed;
use crate::numerics::rbf::RbfInterpolator;
use ndarray::{ArrayD, ArrayViewD, Axis};

const NA: f64 = f64::NAN;

/// Beam energies of the coefficient table [keV].
pub const E_BR: [f64; 10] = [2., 5., 10., 20., 50., 100., 200., 500., 1000., 2000.];

/// Column depth divided by beam energy [g cm⁻² keV⁻¹].
pub const Z_BR: [f64; 17] = [
    2e-6, 4e-6, 8e-6, 2e-5, 4e-5, 8e-5, 2e-4, 4e-4, 8e-4, 2e-3, 4e-3, 8e-3, 2e-2, 4e-2, 8e-2,
    2e-1, 4e-1,
];

/// Bremsstrahlung ionization coefficients [1 / (g cm⁻²)], one row per
/// [`E_BR`] entry and one column per [`Z_BR`] entry; NaN where not tabulated.
pub const A_BR: [[f64; 17]; 10] = [
    [NA, NA, NA, NA, NA, NA, NA, NA, NA, 8.6e-6, 5.1e-7, NA, NA, NA, NA, NA, NA],
    [NA, NA, NA, NA, NA, NA, NA, NA, 7.2e-4, 1.4e-4, 3.3e-5, 5.2e-6, 1.1e-7, NA, NA, NA, NA],
    [
        NA, NA, NA, NA, NA, NA, NA, 2.0e-3, 8.8e-4, 2.7e-4, 9.4e-5, 2.8e-5, 3.0e-6, 3.8e-7, 3.9e-8,
        NA, NA,
    ],
    [
        NA, NA, NA, NA, NA, NA, 3.4e-3, 1.7e-3, 8.0e-4, 3.0e-4, 1.3e-4, 5.7e-5, 1.5e-5, 3.3e-6,
        5.7e-7, 2.9e-8, NA,
    ],
    [
        NA, NA, NA, NA, NA, 7.3e-3, 2.2e-3, 1.1e-3, 5.7e-4, 2.3e-4, 1.1e-4, 5.4e-5, 2.0e-5, 8.3e-6,
        2.6e-6, 3.1e-7, 2.8e-8,
    ],
    [
        NA, NA, NA, NA, 1.1e-2, 7.9e-3, 1.7e-3, 8.4e-4, 4.4e-4, 1.9e-4, 1.0e-4, 5.4e-5, 2.3e-5,
        1.1e-5, 3.9e-6, 5.4e-7, 2.4e-8,
    ],
    [
        NA, NA, NA, 5.0e-3, 5.3e-3, 5.0e-3, 1.8e-3, 6.5e-4, 3.3e-4, 1.5e-4, 8.8e-5, 5.2e-5, 2.4e-5,
        1.1e-5, 3.8e-6, 1.7e-7, 5.9e-9,
    ],
    [
        NA, NA, 2.2e-3, 2.4e-3, 2.5e-3, 2.5e-3, 1.6e-3, 5.2e-4, 2.8e-4, 1.5e-4, 9.9e-5, 6.5e-5,
        2.8e-5, 9.5e-6, 1.5e-6, 6.0e-9, NA,
    ],
    [
        NA, 1.0e-3, 1.1e-3, 1.2e-3, 1.3e-3, 1.4e-3, 1.2e-3, 5.5e-4, 3.2e-4, 1.9e-4, 1.3e-4, 8.3e-5,
        2.8e-5, 5.5e-6, 2.4e-7, NA, NA,
    ],
    [
        6.8e-4, 7.6e-4, 8.4e-4, 9.3e-4, 9.9e-4, 1.1e-3, 1.1e-3, 6.8e-4, 4.5e-4, 2.9e-4, 1.9e-4,
        9.2e-5, 1.7e-5, 1.2e-6, NA, NA, NA,
    ],
];

/// Bremsstrahlung coefficient interpolant, built once and reused across calls.
#[derive(Debug, Clone, PartialEq)]
pub struct Berger1974 {
    interpolator: RbfInterpolator,
    log_space: bool,
}

impl Berger1974 {
    /// Interpolant over the published table.
    pub fn new(settings: &BremsstrahlungSettings) -> Result<Self, IonizationError> {
        let rows: Vec<&[f64]> = A_BR.iter().map(|row| row.as_slice()).collect();
        Self::with_table(&E_BR, &Z_BR, &rows, settings)
    }

    /// Interpolant over a custom table; `coeffs[i][j]` belongs to
    /// `(energies[i], depths[j])`.
    pub fn with_table(
        energies: &[f64],
        depths: &[f64],
        coeffs: &[&[f64]],
        settings: &BremsstrahlungSettings,
    ) -> Result<Self, IonizationError> {
        if coeffs.len() != energies.len() {
            return Err(IonizationError::TableShape {
                table: "berger1974",
                expected: energies.len(),
                actual: coeffs.len(),
            });
        }

        let transform = |value: f64| if settings.log_space { value.ln() } else { value };
        let mut nodes = Vec::new();
        let mut values = Vec::new();
        for (&energy, row) in energies.iter().zip(coeffs) {
            if row.len() != depths.len() {
                return Err(IonizationError::TableShape {
                    table: "berger1974",
                    expected: depths.len(),
                    actual: row.len(),
                });
            }
            for (&depth, &coefficient) in depths.iter().zip(row.iter()) {
                let coefficient = match (coefficient.is_nan(), settings.fill_missing) {
                    (false, _) => coefficient,
                    (true, Some(fill)) => fill,
                    (true, None) => continue,
                };
                nodes.push(vec![transform(energy), transform(depth)]);
                values.push(transform(coefficient));
            }
        }

        tracing::debug!(
            nodes = nodes.len(),
            log_space = settings.log_space,
            basis = ?settings.basis,
            "building bremsstrahlung interpolant"
        );
        let interpolator = RbfInterpolator::new(nodes, &values, settings.basis)?;
        Ok(Self {
            interpolator,
            log_space: settings.log_space,
        })
    }

    /// Coefficient `a_br(E, z = H·rho/E)` [1 / (g cm⁻²)].
    ///
    /// A 0-d `energy` is promoted to one element, so the result always has at
    /// least one axis. Flux does not enter the coefficient.
    pub fn coefficient(
        &self,
        energy: &ArrayViewD<'_, f64>,
        scale_height: &ArrayViewD<'_, f64>,
        rho: &ArrayViewD<'_, f64>,
    ) -> Result<ArrayD<f64>, IonizationError> {
        let energy = promote_to_1d(energy);
        try_map_indexed(&[energy.view(), scale_height.view(), rho.view()], |index, sample| {
            let [energy, scale_height, rho] = [sample[0], sample[1], sample[2]];
            check_positive("energy", index, energy)?;
            check_positive("scale_height", index, scale_height)?;
            self.check_density(index, rho)?;
            self.evaluate(energy, scale_height * rho / energy)
        })
    }

    /// Energy dissipation `a_br · rho · Q`.
    pub fn energy_dissipation_rate(
        &self,
        input: &DissipationInput<'_>,
    ) -> Result<ArrayD<f64>, IonizationError> {
        let energy = promote_to_1d(&input.energy);
        try_map_indexed(
            &[
                energy.view(),
                input.flux.view(),
                input.scale_height.view(),
                input.rho.view(),
            ],
            |index, sample| {
                let [energy, flux, scale_height, rho] =
                    [sample[0], sample[1], sample[2], sample[3]];
                check_positive("energy", index, energy)?;
                check_positive("scale_height", index, scale_height)?;
                self.check_density(index, rho)?;
                check_non_negative("flux", index, flux)?;
                if flux == 0.0 {
                    return Ok(0.0);
                }
                Ok(self.evaluate(energy, scale_height * rho / energy)? * rho * flux)
            },
        )
    }

    fn check_density(&self, index: usize, rho: f64) -> Result<(), IonizationError> {
        if self.log_space {
            check_positive("rho", index, rho)
        } else {
            check_non_negative("rho", index, rho)
        }
    }

    fn evaluate(&self, energy: f64, depth: f64) -> Result<f64, IonizationError> {
        if self.log_space {
            let log_coefficient = self.interpolator.evaluate(&[energy.ln(), depth.ln()])?;
            Ok(log_coefficient.exp())
        } else {
            Ok(self.interpolator.evaluate(&[energy, depth])?)
        }
    }
}

impl EnergyDissipation for Berger1974 {
    fn energy_dissipation(
        &self,
        input: &DissipationInput<'_>,
    ) -> Result<ArrayD<f64>, IonizationError> {
        self.energy_dissipation_rate(input)
    }
}

/// One-shot [`Berger1974::coefficient`] over the published table.
pub fn berger1974(
    input: &DissipationInput<'_>,
    settings: &BremsstrahlungSettings,
) -> Result<ArrayD<f64>, IonizationError> {
    Berger1974::new(settings)?.coefficient(&input.energy, &input.scale_height, &input.rho)
}

/// One-shot [`Berger1974::energy_dissipation_rate`] over the published table.
pub fn berger1974_ediss(
    input: &DissipationInput<'_>,
    settings: &BremsstrahlungSettings,
) -> Result<ArrayD<f64>, IonizationError> {
    Berger1974::new(settings)?.energy_dissipation_rate(input)
}

fn promote_to_1d<'a>(energy: &ArrayViewD<'a, f64>) -> ArrayViewD<'a, f64> {
    if energy.ndim() == 0 {
        energy.clone().insert_axis(Axis(0))
    } else {
        energy.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::{A_BR, Berger1974, E_BR, Z_BR, berger1974, berger1974_ediss};
    use crate::common::settings::BremsstrahlungSettings;
    use crate::ionization::{DissipationInput, IonizationError};
    use crate::numerics::rbf::RadialBasis;
    use ndarray::{ArrayD, IxDyn, arr0};

    fn assert_scalar_close(label: &str, expected: f64, actual: f64, abs_tol: f64, rel_tol: f64) {
        let diff = (expected - actual).abs();
        let scale = expected.abs().max(actual.abs()).max(1.0e-300);
        assert!(
            diff <= abs_tol || diff / scale <= rel_tol,
            "{label}: expected {expected}, got {actual} (|diff|={diff})"
        );
    }

    #[test]
    fn table_has_one_hundred_and_six_tabulated_entries() {
        let tabulated = A_BR.iter().flatten().filter(|value| !value.is_nan()).count();
        assert_eq!(tabulated, 106);
        assert_eq!(A_BR.len(), E_BR.len());
        assert!(A_BR.iter().all(|row| row.len() == Z_BR.len()));
    }

    #[test]
    fn interpolant_reproduces_tabulated_coefficients() {
        let interpolant = Berger1974::new(&BremsstrahlungSettings::default()).expect("berger");
        for (i, j) in [(5, 8), (9, 0), (2, 10), (7, 15)] {
            let energy = E_BR[i];
            let depth = Z_BR[j];
            let (energy_array, scale_height, rho) = (
                arr0(energy).into_dyn(),
                arr0(1.0).into_dyn(),
                arr0(depth * energy).into_dyn(),
            );
            let coefficient = interpolant
                .coefficient(&energy_array.view(), &scale_height.view(), &rho.view())
                .expect("coefficient");
            assert_eq!(coefficient.shape(), &[1]);
            assert_scalar_close(
                &format!("a_br({energy}, {depth})"),
                A_BR[i][j],
                coefficient[[0]],
                0.0,
                1.0e-5,
            );
        }
    }

    #[test]
    fn ediss_is_coefficient_times_density_and_flux() {
        let settings = BremsstrahlungSettings::default();
        let energy = ArrayD::from_shape_vec(IxDyn(&[2]), vec![30.0, 300.0]).expect("energy");
        let flux = ArrayD::from_shape_vec(IxDyn(&[2]), vec![2.0, 0.0]).expect("flux");
        let scale_height = arr0(6.0e5).into_dyn();
        let rho = arr0(5.0e-10).into_dyn();
        let input =
            DissipationInput::new(energy.view(), flux.view(), scale_height.view(), rho.view());

        let coefficient = berger1974(&input, &settings).expect("coefficient");
        let ediss = berger1974_ediss(&input, &settings).expect("ediss");
        assert_scalar_close(
            "ediss",
            coefficient[[0]] * 5.0e-10 * 2.0,
            ediss[[0]],
            0.0,
            1.0e-12,
        );
        assert_eq!(ediss[[1]], 0.0);
    }

    #[test]
    fn filled_zero_entries_cannot_be_used_in_log_space() {
        let settings = BremsstrahlungSettings {
            fill_missing: Some(0.0),
            log_space: true,
            basis: RadialBasis::Multiquadric,
        };
        assert!(matches!(
            Berger1974::new(&settings).expect_err("log of zero"),
            IonizationError::Interpolation(_)
        ));
    }

    #[test]
    fn log_space_requires_positive_density() {
        let interpolant = Berger1974::new(&BremsstrahlungSettings::default()).expect("berger");
        let (energy, scale_height, rho) = (
            arr0(10.0).into_dyn(),
            arr0(6.0e5).into_dyn(),
            arr0(0.0).into_dyn(),
        );
        assert_eq!(
            interpolant
                .coefficient(&energy.view(), &scale_height.view(), &rho.view())
                .expect_err("zero density"),
            IonizationError::InvalidInput {
                field: "rho",
                index: 0,
                value: 0.0,
            }
        );
    }
}
