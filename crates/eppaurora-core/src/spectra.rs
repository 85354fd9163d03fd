//! Particle precipitation spectra and spectral integration of mono-energetic
//! energy-dissipation parametrizations.
//!
//! The `*_general` shapes are normalized to unit number flux,
//! `∫ φ(E) dE = 1`; the `pflux_*` shapes are normalized to unit energy flux,
//! `∫ φ(E) E dE = 1`, and scale to an energy flux `Q` by multiplication.

use crate::common::settings::IntegrationSettings;
use crate::ionization::{DissipationInput, EnergyDissipation, IonizationError, fang2010_mono};
use crate::numerics::broadcast::{
    BroadcastError, broadcast_to, common_shape, map2, with_trailing_axis,
};
use crate::numerics::{log_grid, relative_difference, trapezoid};
use ndarray::{ArrayD, ArrayViewD, Axis, IxDyn, Zip};
use std::f64::consts::PI;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SpectrumError {
    #[error("energy grid is empty")]
    EmptyEnergyGrid,
    #[error("energy grid must be one-dimensional, got {ndim} axes")]
    EnergyGridShape { ndim: usize },
    #[error("energy grid needs at least 2 points, got {actual}")]
    TooFewPoints { actual: usize },
    #[error("energy grid must be strictly increasing: {previous} then {current} at index {index}")]
    NonIncreasingEnergyGrid {
        index: usize,
        previous: f64,
        current: f64,
    },
    #[error("integration bounds must satisfy 0 < lower < upper, got [{lower}, {upper}]")]
    InvalidBounds { lower: f64, upper: f64 },
    #[error("{steps} quadrature steps cannot be doubled {doublings} times")]
    StepOverflow { steps: usize, doublings: usize },
    #[error("gaussian width must be > 0, got {width}")]
    InvalidWidth { width: f64 },
    #[error("power-law exponent {gamma} does not normalize the {tail} tail")]
    InvalidGamma { gamma: f64, tail: &'static str },
    #[error("invalid {field} = {value} at flat index {index}")]
    InvalidParameter {
        field: &'static str,
        index: usize,
        value: f64,
    },
    #[error(transparent)]
    Broadcast(#[from] BroadcastError),
    #[error(transparent)]
    Dissipation(#[from] IonizationError),
}

/// Which integral a spectral shape is normalized to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Normalization {
    /// `∫ φ(E) dE = 1`
    NumberFlux,
    /// `∫ φ(E) E dE = 1`
    #[default]
    EnergyFlux,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SpectrumKind {
    Exponential,
    Gaussian { width: f64 },
    Maxwellian,
    /// `high_energy_tail` selects `E > E0` (Pareto-like), otherwise `E < E0`.
    PowerLaw { gamma: f64, high_energy_tail: bool },
}

impl Default for SpectrumKind {
    fn default() -> Self {
        Self::Maxwellian
    }
}

impl SpectrumKind {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Exponential => "exponential",
            Self::Gaussian { .. } => "gaussian",
            Self::Maxwellian => "maxwellian",
            Self::PowerLaw { .. } => "power-law",
        }
    }

    /// Checks that the shape parameters give a finite normalization.
    pub fn validate(&self, normalization: Normalization) -> Result<(), SpectrumError> {
        match *self {
            Self::Gaussian { width } if !(width.is_finite() && width > 0.0) => {
                Err(SpectrumError::InvalidWidth { width })
            }
            Self::PowerLaw {
                gamma,
                high_energy_tail,
            } => {
                let limit = match normalization {
                    Normalization::NumberFlux => -1.0,
                    Normalization::EnergyFlux => -2.0,
                };
                let valid = if high_energy_tail {
                    gamma < limit
                } else {
                    gamma > -1.0
                };
                if gamma.is_finite() && valid {
                    Ok(())
                } else {
                    Err(SpectrumError::InvalidGamma {
                        gamma,
                        tail: if high_energy_tail { "high-energy" } else { "low-energy" },
                    })
                }
            }
            _ => Ok(()),
        }
    }

    /// Differential flux at `energy` for characteristic energy `en_0`.
    pub fn evaluate(&self, normalization: Normalization, energy: f64, en_0: f64) -> f64 {
        match (normalization, *self) {
            (Normalization::NumberFlux, Self::Exponential) => exp_general(energy, en_0),
            (Normalization::NumberFlux, Self::Gaussian { width }) => {
                gaussian_general(energy, en_0, width)
            }
            (Normalization::NumberFlux, Self::Maxwellian) => maxwell_general(energy, en_0),
            (
                Normalization::NumberFlux,
                Self::PowerLaw {
                    gamma,
                    high_energy_tail,
                },
            ) => pow_general(energy, en_0, gamma, high_energy_tail),
            (Normalization::EnergyFlux, Self::Exponential) => pflux_exp(energy, en_0),
            (Normalization::EnergyFlux, Self::Gaussian { width }) => {
                pflux_gaussian(energy, en_0, width)
            }
            (Normalization::EnergyFlux, Self::Maxwellian) => pflux_maxwell(energy, en_0),
            (
                Normalization::EnergyFlux,
                Self::PowerLaw {
                    gamma,
                    high_energy_tail,
                },
            ) => pflux_pow(energy, en_0, gamma, high_energy_tail),
        }
    }

    /// Array form of [`SpectrumKind::evaluate`] with broadcasting.
    pub fn sample(
        &self,
        normalization: Normalization,
        energy: &ArrayViewD<'_, f64>,
        en_0: &ArrayViewD<'_, f64>,
    ) -> Result<ArrayD<f64>, SpectrumError> {
        self.validate(normalization)?;
        Ok(map2(energy, en_0, |energy, en_0| self.evaluate(normalization, energy, en_0))?)
    }
}

/// `φ(E) = 1/E0 · exp(-E/E0)`
pub fn exp_general(en: f64, en_0: f64) -> f64 {
    1.0 / en_0 * (-en / en_0).exp()
}

/// `φ(E) = 1/(√π W) · exp(-(E - E0)²/W²)`, ignoring the tail below zero.
pub fn gaussian_general(en: f64, en_0: f64, width: f64) -> f64 {
    1.0 / (PI * width * width).sqrt() * (-(en - en_0).powi(2) / (width * width)).exp()
}

/// `φ(E) = E/E0² · exp(-E/E0)`
pub fn maxwell_general(en: f64, en_0: f64) -> f64 {
    en / (en_0 * en_0) * (-en / en_0).exp()
}

/// `φ(E) = ∓(γ + 1)/E0 · (E/E0)^γ`, zero outside the selected tail
/// (after Strickland et al., JGR 98(A12), 21533-21548, 1993).
pub fn pow_general(en: f64, en_0: f64, gamma: f64, high_energy_tail: bool) -> f64 {
    let spectrum = (gamma + 1.0) / en_0 * (en / en_0).powf(gamma);
    if high_energy_tail {
        if en < en_0 { 0.0 } else { -spectrum }
    } else if en > en_0 {
        0.0
    } else {
        spectrum
    }
}

pub fn pflux_exp(en: f64, en_0: f64) -> f64 {
    exp_general(en, en_0) / en_0
}

pub fn pflux_gaussian(en: f64, en_0: f64, width: f64) -> f64 {
    gaussian_general(en, en_0, width) / en_0
}

pub fn pflux_maxwell(en: f64, en_0: f64) -> f64 {
    0.5 / en_0 * maxwell_general(en, en_0)
}

pub fn pflux_pow(en: f64, en_0: f64, gamma: f64, high_energy_tail: bool) -> f64 {
    (gamma + 2.0) / (gamma + 1.0) / en_0 * pow_general(en, en_0, gamma, high_energy_tail)
}

/// `∫ q(E, φ(E)) E dE` over a sampled spectrum.
///
/// `ens` is the 1-D energy grid [keV], evaluated as shape `(1, 1, K)`;
/// `dfluxes` holds the differential particle flux with energy on its last
/// axis. The atmosphere arrays get a trailing axis appended, and the
/// integration removes the energy axis, so the result has at least two axes.
pub fn ediss_spec_int<F>(
    ens: &ArrayViewD<'_, f64>,
    dfluxes: &ArrayViewD<'_, f64>,
    scale_height: &ArrayViewD<'_, f64>,
    rho: &ArrayViewD<'_, f64>,
    func: &F,
) -> Result<ArrayD<f64>, SpectrumError>
where
    F: EnergyDissipation + ?Sized,
{
    let grid = validate_energy_grid(ens)?;
    let energy = ArrayD::from_shape_vec(IxDyn(&[1, 1, grid.len()]), grid.clone())
        .map_err(|_| SpectrumError::EnergyGridShape { ndim: ens.ndim() })?;
    let dfluxes = at_least_1d(dfluxes);
    let scale_height = at_least_1d(scale_height);
    let rho = at_least_1d(rho);
    let (scale_height, rho) = (scale_height.view(), rho.view());

    let input = DissipationInput::new(
        energy.view(),
        dfluxes.view(),
        with_trailing_axis(&scale_height),
        with_trailing_axis(&rho),
    );
    let ediss = func.energy_dissipation(&input)?;
    let last = Axis(ediss.ndim() - 1);

    tracing::debug!(
        points = grid.len(),
        shape = ?ediss.shape(),
        "integrating energy dissipation over spectrum"
    );
    Ok(Zip::from(ediss.lanes(last)).map_collect(|lane| {
        let integrand: Vec<f64> = lane.iter().zip(&grid).map(|(q, e)| q * e).collect();
        trapezoid(&integrand, &grid).unwrap_or(f64::NAN)
    }))
}

/// Integrates `func` over a functional spectrum with characteristic energy
/// `energy` [keV] and total energy flux `flux` [keV cm⁻² s⁻¹].
///
/// The result has shape `broadcast(scale_height, rho)[..., None]` broadcast
/// against `broadcast(energy, flux)`, i.e. `(N, 1)` columns and `(M,)` rows
/// give `(N, M)`.
pub fn ediss_specfun_int<F>(
    energy: &ArrayViewD<'_, f64>,
    flux: &ArrayViewD<'_, f64>,
    scale_height: &ArrayViewD<'_, f64>,
    rho: &ArrayViewD<'_, f64>,
    func: &F,
    spectrum: &SpectrumKind,
    settings: &IntegrationSettings,
) -> Result<ArrayD<f64>, SpectrumError>
where
    F: EnergyDissipation + ?Sized,
{
    spectrum.validate(Normalization::EnergyFlux)?;
    let grid = quadrature_grid(settings)?;
    let shape = common_shape(&[energy.shape(), flux.shape()])?;
    let energy = broadcast_to(energy, &shape)?;
    let flux = broadcast_to(flux, &shape)?;

    let mut dflux_shape = shape.clone();
    dflux_shape.push(grid.len());
    let mut dflux = ArrayD::zeros(IxDyn(&dflux_shape));
    for (index, ((mut lane, &en_0), &flux)) in dflux
        .lanes_mut(Axis(shape.len()))
        .into_iter()
        .zip(energy.iter())
        .zip(flux.iter())
        .enumerate()
    {
        if !(en_0.is_finite() && en_0 > 0.0) {
            return Err(SpectrumError::InvalidParameter {
                field: "energy",
                index,
                value: en_0,
            });
        }
        if !(flux.is_finite() && flux >= 0.0) {
            return Err(SpectrumError::InvalidParameter {
                field: "flux",
                index,
                value: flux,
            });
        }
        for (slot, &en) in lane.iter_mut().zip(&grid) {
            *slot = flux * spectrum.evaluate(Normalization::EnergyFlux, en, en_0);
        }
    }

    let ens = ArrayD::from_shape_vec(IxDyn(&[grid.len()]), grid)
        .map_err(|_| SpectrumError::EnergyGridShape { ndim: 1 })?;
    ediss_spec_int(&ens.view(), &dflux.view(), scale_height, rho, func)
}

struct Fang2010Mono<'p> {
    pij: Option<&'p [[f64; 4]]>,
}

impl EnergyDissipation for Fang2010Mono<'_> {
    fn energy_dissipation(
        &self,
        input: &DissipationInput<'_>,
    ) -> Result<ArrayD<f64>, IonizationError> {
        fang2010_mono(input, self.pij)
    }
}

/// [`ediss_spec_int`] with the Fang et al. 2010 mono-energetic parametrization.
pub fn fang2010_spec_int(
    ens: &ArrayViewD<'_, f64>,
    dfluxes: &ArrayViewD<'_, f64>,
    scale_height: &ArrayViewD<'_, f64>,
    rho: &ArrayViewD<'_, f64>,
    pij: Option<&[[f64; 4]]>,
) -> Result<ArrayD<f64>, SpectrumError> {
    ediss_spec_int(ens, dfluxes, scale_height, rho, &Fang2010Mono { pij })
}

/// Fang et al. 2010 integrated over a Maxwellian spectrum.
pub fn fang2010_maxw_int(
    energy: &ArrayViewD<'_, f64>,
    flux: &ArrayViewD<'_, f64>,
    scale_height: &ArrayViewD<'_, f64>,
    rho: &ArrayViewD<'_, f64>,
    settings: &IntegrationSettings,
    pij: Option<&[[f64; 4]]>,
) -> Result<ArrayD<f64>, SpectrumError> {
    ediss_specfun_int(
        energy,
        flux,
        scale_height,
        rho,
        &Fang2010Mono { pij },
        &SpectrumKind::Maxwellian,
        settings,
    )
}

/// Results of successively doubled quadrature grids.
#[derive(Debug, Clone, PartialEq)]
pub struct ConvergenceReport {
    pub steps: Vec<usize>,
    pub results: Vec<ArrayD<f64>>,
    /// Largest element-wise relative change between consecutive grids,
    /// one entry per doubling.
    pub relative_changes: Vec<f64>,
}

impl ConvergenceReport {
    pub fn is_monotonic(&self) -> bool {
        self.relative_changes
            .windows(2)
            .all(|pair| pair[1] <= pair[0])
    }
}

/// Evaluates [`ediss_specfun_int`] at `settings.steps · 2^k`, `k = 0..=doublings`.
#[allow(clippy::too_many_arguments)]
pub fn integration_convergence<F>(
    energy: &ArrayViewD<'_, f64>,
    flux: &ArrayViewD<'_, f64>,
    scale_height: &ArrayViewD<'_, f64>,
    rho: &ArrayViewD<'_, f64>,
    func: &F,
    spectrum: &SpectrumKind,
    settings: &IntegrationSettings,
    doublings: usize,
) -> Result<ConvergenceReport, SpectrumError>
where
    F: EnergyDissipation + ?Sized,
{
    if doubled_steps(settings.steps, doublings).is_none() {
        return Err(SpectrumError::StepOverflow {
            steps: settings.steps,
            doublings,
        });
    }
    let mut report = ConvergenceReport {
        steps: Vec::with_capacity(doublings + 1),
        results: Vec::with_capacity(doublings + 1),
        relative_changes: Vec::with_capacity(doublings),
    };

    for doubling in 0..=doublings {
        let steps = settings.steps << doubling;
        let result = ediss_specfun_int(
            energy,
            flux,
            scale_height,
            rho,
            func,
            spectrum,
            &settings.with_steps(steps),
        )?;
        if let Some(previous) = report.results.last() {
            let change = Zip::from(previous)
                .and(&result)
                .fold(0.0_f64, |largest, &lhs, &rhs| {
                    largest.max(relative_difference(lhs, rhs, f64::MIN_POSITIVE))
                });
            report.relative_changes.push(change);
        }
        tracing::debug!(steps, "evaluated spectral integral");
        report.steps.push(steps);
        report.results.push(result);
    }

    Ok(report)
}

/// `steps · 2^doubling`, `None` once it no longer fits in `usize`.
fn doubled_steps(steps: usize, doubling: usize) -> Option<usize> {
    let factor = u32::try_from(doubling)
        .ok()
        .and_then(|shift| 1_usize.checked_shl(shift))?;
    steps.checked_mul(factor)
}

fn quadrature_grid(settings: &IntegrationSettings) -> Result<Vec<f64>, SpectrumError> {
    let IntegrationSettings {
        lower_kev,
        upper_kev,
        steps,
    } = *settings;
    if !(lower_kev.is_finite() && upper_kev.is_finite() && lower_kev > 0.0 && lower_kev < upper_kev)
    {
        return Err(SpectrumError::InvalidBounds {
            lower: lower_kev,
            upper: upper_kev,
        });
    }
    log_grid(lower_kev, upper_kev, steps).ok_or(SpectrumError::TooFewPoints { actual: steps })
}

fn validate_energy_grid(ens: &ArrayViewD<'_, f64>) -> Result<Vec<f64>, SpectrumError> {
    if ens.ndim() > 1 {
        return Err(SpectrumError::EnergyGridShape { ndim: ens.ndim() });
    }
    let grid: Vec<f64> = ens.iter().copied().collect();
    if grid.is_empty() {
        return Err(SpectrumError::EmptyEnergyGrid);
    }
    if grid.len() < 2 {
        return Err(SpectrumError::TooFewPoints { actual: grid.len() });
    }
    if let Some(index) = grid.windows(2).position(|pair| !(pair[1] > pair[0])) {
        return Err(SpectrumError::NonIncreasingEnergyGrid {
            index: index + 1,
            previous: grid[index],
            current: grid[index + 1],
        });
    }
    Ok(grid)
}

fn at_least_1d<'a>(array: &ArrayViewD<'a, f64>) -> ArrayViewD<'a, f64> {
    if array.ndim() == 0 {
        array.clone().insert_axis(Axis(0))
    } else {
        array.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::{
        Normalization, SpectrumError, SpectrumKind, ediss_spec_int, ediss_specfun_int,
        exp_general, fang2010_maxw_int, gaussian_general, integration_convergence,
        maxwell_general, pflux_exp, pflux_gaussian, pflux_maxwell, pflux_pow, pow_general,
    };
    use crate::common::settings::IntegrationSettings;
    use crate::ionization::Parametrization;
    use crate::numerics::{log_grid, trapezoid};
    use ndarray::{ArrayD, IxDyn, arr0};

    fn assert_scalar_close(label: &str, expected: f64, actual: f64, abs_tol: f64, rel_tol: f64) {
        let diff = (expected - actual).abs();
        let scale = expected.abs().max(actual.abs()).max(1.0e-300);
        assert!(
            diff <= abs_tol || diff / scale <= rel_tol,
            "{label}: expected {expected}, got {actual} (|diff|={diff})"
        );
    }

    fn vector(values: &[f64]) -> ArrayD<f64> {
        ArrayD::from_shape_vec(IxDyn(&[values.len()]), values.to_vec()).expect("vector")
    }

    #[test]
    fn number_flux_shapes_are_normalized() {
        let energies = log_grid(1.0e-2, 1.0e4, 257).expect("grid");
        let shapes: [(&str, fn(f64) -> f64); 3] = [
            ("exp_general", |e| exp_general(e, 10.0)),
            ("gaussian_general", |e| gaussian_general(e, 10.0, 1.0)),
            ("maxwell_general", |e| maxwell_general(e, 10.0)),
        ];
        for (label, shape) in shapes {
            let values: Vec<f64> = energies.iter().map(|e| shape(*e)).collect();
            let norm = trapezoid(&values, &energies).expect("norm");
            assert_scalar_close(label, 1.0, norm, 0.0, 1.0e-3);
        }
    }

    #[test]
    fn energy_flux_shapes_are_normalized() {
        let energies = log_grid(1.0e-2, 1.0e4, 257).expect("grid");
        let shapes: [(&str, fn(f64) -> f64); 3] = [
            ("pflux_exp", |e| pflux_exp(e, 10.0)),
            ("pflux_gaussian", |e| pflux_gaussian(e, 10.0, 1.0)),
            ("pflux_maxwell", |e| pflux_maxwell(e, 10.0)),
        ];
        for (label, shape) in shapes {
            let values: Vec<f64> = energies.iter().map(|e| shape(*e) * e).collect();
            let norm = trapezoid(&values, &energies).expect("norm");
            assert_scalar_close(label, 1.0, norm, 0.0, 1.0e-3);
        }
    }

    #[test]
    fn power_law_tails_are_normalized_on_their_side_of_e0() {
        let upper = log_grid(10.0, 1.0e6, 4001).expect("grid");
        let values: Vec<f64> = upper.iter().map(|e| pflux_pow(*e, 10.0, -3.0, true) * e).collect();
        assert_scalar_close("het", 1.0, trapezoid(&values, &upper).expect("norm"), 0.0, 1.0e-3);
        assert_eq!(pow_general(5.0, 10.0, -3.0, true), 0.0);

        let lower = log_grid(1.0e-6, 10.0, 4001).expect("grid");
        let values: Vec<f64> = lower.iter().map(|e| pow_general(*e, 10.0, 1.0, false)).collect();
        assert_scalar_close("let", 1.0, trapezoid(&values, &lower).expect("norm"), 0.0, 1.0e-3);
        assert_eq!(pow_general(20.0, 10.0, 1.0, false), 0.0);
    }

    #[test]
    fn spectrum_parameters_are_validated() {
        assert_eq!(
            SpectrumKind::Gaussian { width: 0.0 }.validate(Normalization::EnergyFlux),
            Err(SpectrumError::InvalidWidth { width: 0.0 })
        );
        let het = SpectrumKind::PowerLaw {
            gamma: -1.5,
            high_energy_tail: true,
        };
        assert!(het.validate(Normalization::NumberFlux).is_ok());
        assert!(matches!(
            het.validate(Normalization::EnergyFlux),
            Err(SpectrumError::InvalidGamma { tail: "high-energy", .. })
        ));
    }

    #[test]
    fn sample_broadcasts_energy_against_characteristic_energy() {
        let energies = ArrayD::from_shape_vec(IxDyn(&[1, 3]), vec![1.0, 2.0, 3.0]).expect("e");
        let en_0 = ArrayD::from_shape_vec(IxDyn(&[2, 1]), vec![1.0, 10.0]).expect("e0");
        let sampled = SpectrumKind::Exponential
            .sample(Normalization::NumberFlux, &energies.view(), &en_0.view())
            .expect("sample");
        assert_eq!(sampled.shape(), &[2, 3]);
        assert_eq!(sampled[[1, 2]], exp_general(3.0, 10.0));
    }

    #[test]
    fn maxwellian_integral_matches_reference_profile() {
        let energy = vector(&[0.1, 1.0, 10.0, 100.0]);
        let flux = arr0(1.0).into_dyn();
        let scale_height = arr0(6.0e5).into_dyn();
        let rho = arr0(5.0e-10).into_dyn();
        let profile = fang2010_maxw_int(
            &energy.view(),
            &flux.view(),
            &scale_height.view(),
            &rho.view(),
            &IntegrationSettings::default(),
            None,
        )
        .expect("integral");

        assert_eq!(profile.shape(), &[1, 4]);
        let expected = [
            3.5139809189740406e-29,
            2.0693915646867147e-09,
            4.4134065858684604e-07,
            2.0650982287935832e-08,
        ];
        for (column, expected) in expected.into_iter().enumerate() {
            assert_scalar_close("fang2010_maxw_int", expected, profile[[0, column]], 0.0, 1.0e-8);
        }
    }

    #[test]
    fn sampled_and_functional_integrals_agree() {
        let settings = IntegrationSettings::default();
        let energy = arr0(5.0).into_dyn();
        let flux = arr0(3.0).into_dyn();
        let scale_height = arr0(27.0e5).into_dyn();
        let rho = arr0(1.7e-12).into_dyn();

        let functional = ediss_specfun_int(
            &energy.view(),
            &flux.view(),
            &scale_height.view(),
            &rho.view(),
            &Parametrization::Rr1987,
            &SpectrumKind::Exponential,
            &settings,
        )
        .expect("functional");

        let grid = log_grid(settings.lower_kev, settings.upper_kev, settings.steps).expect("grid");
        let dfluxes: Vec<f64> = grid.iter().map(|e| 3.0 * pflux_exp(*e, 5.0)).collect();
        let sampled = ediss_spec_int(
            &vector(&grid).view(),
            &vector(&dfluxes).view(),
            &scale_height.view(),
            &rho.view(),
            &Parametrization::Rr1987,
        )
        .expect("sampled");

        assert_eq!(functional.shape(), &[1, 1]);
        assert_eq!(sampled.shape(), &[1, 1]);
        assert_scalar_close(
            "sampled vs functional",
            sampled[[0, 0]],
            functional[[0, 0]],
            0.0,
            1.0e-12,
        );
    }

    #[test]
    fn energy_grid_must_increase() {
        let energies = vector(&[1.0, 3.0, 2.0]);
        let fluxes = vector(&[1.0, 1.0, 1.0]);
        let scale_height = arr0(6.0e5).into_dyn();
        let rho = arr0(5.0e-10).into_dyn();
        let error = ediss_spec_int(
            &energies.view(),
            &fluxes.view(),
            &scale_height.view(),
            &rho.view(),
            &Parametrization::Fang2010,
        )
        .expect_err("non-increasing grid");
        assert_eq!(
            error,
            SpectrumError::NonIncreasingEnergyGrid {
                index: 2,
                previous: 3.0,
                current: 2.0,
            }
        );
    }

    #[test]
    fn invalid_bounds_and_step_counts_are_rejected() {
        let energy = arr0(10.0).into_dyn();
        let scalar = arr0(1.0).into_dyn();
        let run = |settings: IntegrationSettings| {
            ediss_specfun_int(
                &energy.view(),
                &scalar.view(),
                &scalar.view(),
                &scalar.view(),
                &Parametrization::Fang2010,
                &SpectrumKind::Maxwellian,
                &settings,
            )
        };
        assert_eq!(
            run(IntegrationSettings::new(300.0, 0.1, 128)).expect_err("reversed"),
            SpectrumError::InvalidBounds {
                lower: 300.0,
                upper: 0.1,
            }
        );
        assert_eq!(
            run(IntegrationSettings::new(0.1, 300.0, 1)).expect_err("one step"),
            SpectrumError::TooFewPoints { actual: 1 }
        );
    }

    #[test]
    fn doubling_past_usize_range_is_an_error() {
        let energy = arr0(10.0).into_dyn();
        let scalar = arr0(1.0).into_dyn();
        let settings = IntegrationSettings::new(0.1, 300.0, 4);
        for doublings in [63, 64, 200] {
            let error = integration_convergence(
                &energy.view(),
                &scalar.view(),
                &scalar.view(),
                &scalar.view(),
                &Parametrization::Fang2010,
                &SpectrumKind::Maxwellian,
                &settings,
                doublings,
            )
            .expect_err("step count overflows");
            assert_eq!(error, SpectrumError::StepOverflow { steps: 4, doublings });
        }
    }
}
