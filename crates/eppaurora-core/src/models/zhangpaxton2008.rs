//! Kp-driven auroral electron energy flux and mean energy.
//!
//! Zhang and Paxton, JASTP 70, 1231-1242, 2008. Each Kp bin holds
//! Fourier expansions in MLT of the four Epstein-function coefficients
//! `[A, B, C, D]`, one table for the energy flux and one for the mean energy.

use super::ModelError;
use crate::numerics::broadcast::try_map_indexed;
use crate::numerics::grid::{GridInterpolationError, searchsorted_left};
use crate::numerics::interpolate_linear;
use ndarray::{ArrayD, ArrayViewD};
use std::fs;
use std::path::{Path, PathBuf};

/// Kp model bin edges.
pub const KP_BIN_EDGES: [(f64, f64); 6] = [
    (0.0, 1.5),
    (1.5, 3.0),
    (3.0, 4.5),
    (4.5, 6.0),
    (6.0, 8.0),
    (8.0, 10.0),
];

/// Kp model bin centres.
pub const KP_BIN_CENTRES: [f64; 6] = [0.75, 2.25, 3.75, 5.25, 7.0, 9.0];

/// Fourier harmonics per Epstein coefficient in the published tables.
pub const DEFAULT_HARMONICS: usize = 6;

pub type EpsteinCoefficients = [f64; 4];

#[derive(Debug, thiserror::Error)]
pub enum EpsteinTableError {
    #[error("failed to read Epstein coefficient table '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("line {line}: {message}")]
    Parse { line: usize, message: String },
    #[error("coefficient table has {actual} rows, {expected} are required")]
    RowCount { expected: usize, actual: usize },
    #[error("{rows} Fourier rows is not 2·nf + 1 for any nf")]
    Inconsistent { rows: usize },
    #[error("{table} table needs one Fourier block per Kp bin ({expected}), got {actual}")]
    BinCount {
        table: &'static str,
        expected: usize,
        actual: usize,
    },
}

/// Hemispheric power [GW] from Kp, Eqs. (1) and (2).
pub fn hemispheric_power(kp: f64) -> f64 {
    if kp <= 5.0 {
        38.66 * (0.1967 * kp).exp() - 33.99
    } else {
        4.592 * (0.4731 * kp).exp() + 20.47
    }
}

/// Epstein coefficients at `angle = MLT · π / 12` from a block of
/// `2·nf + 1` Fourier rows: the mean, `nf` cosine rows, then `nf` sine rows.
pub fn epstein_coeffs(
    angle: f64,
    table: &[EpsteinCoefficients],
) -> Result<EpsteinCoefficients, EpsteinTableError> {
    let harmonics = harmonics_in(table.len())?;
    Ok(fourier_sum(angle, table, harmonics))
}

/// Epstein function `A·exp((x - B)/C) / (1 + exp((x - B)/D))²` at
/// colatitude `x = 90 - |mlat|`.
pub fn epstein_eval(x: f64, coefficients: &EpsteinCoefficients) -> f64 {
    let [a, b, c, d] = *coefficients;
    let loc = x - b;
    a * (loc / c).exp() / (1.0 + (loc / d).exp()).powi(2)
}

/// Energy flux [mW m⁻² = erg cm⁻² s⁻¹] and mean energy [keV].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZpPrediction {
    pub energy_flux: f64,
    pub mean_energy: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ZhangPaxtonModel {
    energy_flux: Vec<Vec<EpsteinCoefficients>>,
    mean_energy: Vec<Vec<EpsteinCoefficients>>,
}

impl ZhangPaxtonModel {
    /// Builds the model from one Fourier block per Kp bin for each quantity.
    pub fn new(
        energy_flux: Vec<Vec<EpsteinCoefficients>>,
        mean_energy: Vec<Vec<EpsteinCoefficients>>,
    ) -> Result<Self, EpsteinTableError> {
        for (table, blocks) in [("energy flux", &energy_flux), ("mean energy", &mean_energy)] {
            if blocks.len() != KP_BIN_CENTRES.len() {
                return Err(EpsteinTableError::BinCount {
                    table,
                    expected: KP_BIN_CENTRES.len(),
                    actual: blocks.len(),
                });
            }
            for block in blocks {
                harmonics_in(block.len())?;
            }
        }
        Ok(Self {
            energy_flux,
            mean_energy,
        })
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, EpsteinTableError> {
        Self::load_with_harmonics(path, DEFAULT_HARMONICS)
    }

    pub fn load_with_harmonics(
        path: impl AsRef<Path>,
        harmonics: usize,
    ) -> Result<Self, EpsteinTableError> {
        let path = path.as_ref();
        let source = fs::read_to_string(path).map_err(|source| EpsteinTableError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let model = Self::from_text(&source, harmonics)?;
        tracing::info!(
            path = %path.display(),
            harmonics,
            bins = KP_BIN_CENTRES.len(),
            "loaded Zhang & Paxton coefficient table"
        );
        Ok(model)
    }

    /// Parses whitespace-separated `name A B C D` rows: the energy-flux
    /// blocks for all Kp bins, followed by the mean-energy blocks.
    pub fn from_text(source: &str, harmonics: usize) -> Result<Self, EpsteinTableError> {
        let rows = parse_rows(source)?;
        let block = 2 * harmonics + 1;
        let bins = KP_BIN_CENTRES.len();
        if rows.len() < 2 * bins * block {
            return Err(EpsteinTableError::RowCount {
                expected: 2 * bins * block,
                actual: rows.len(),
            });
        }

        let mut blocks = rows.chunks_exact(block).map(<[_]>::to_vec);
        let energy_flux: Vec<_> = blocks.by_ref().take(bins).collect();
        let mean_energy: Vec<_> = blocks.take(bins).collect();
        Self::new(energy_flux, mean_energy)
    }

    /// Evaluates the model at magnetic latitude [deg], MLT [h] and Kp.
    ///
    /// The energy flux is interpolated between the two bracketing Kp bins in
    /// hemispheric-power space, the mean energy linearly in Kp; Kp outside the
    /// bin centres takes the value of the closest bin.
    pub fn evaluate(&self, mlat: f64, mlt: f64, kp: f64) -> Result<ZpPrediction, ModelError> {
        for (axis, value) in [("mlat", mlat), ("mlt", mlt), ("Kp", kp)] {
            if !value.is_finite() {
                return Err(GridInterpolationError::NonFinite { axis, value }.into());
            }
        }

        let angle = mlt * std::f64::consts::PI / 12.0;
        let x = 90.0 - mlat.abs();
        let lower = kp_bin_index(kp);
        let bins = [lower, lower + 1];
        let centres = bins.map(|bin| KP_BIN_CENTRES[bin]);

        let [q_lower, q_upper] = bins.map(|bin| self.energy_flux_epstein(bin, angle, x));
        let [e_lower, e_upper] = bins.map(|bin| self.mean_energy_epstein(bin, angle, x));

        let power = centres.map(hemispheric_power);
        let energy_flux = clamped_interp(hemispheric_power(kp), power, [q_lower, q_upper]);
        let mean_energy = clamped_interp(kp, centres, [e_lower, e_upper]);
        tracing::debug!(mlat, mlt, kp, lower, energy_flux, mean_energy, "evaluated zp2008");
        Ok(ZpPrediction {
            energy_flux,
            mean_energy,
        })
    }

    fn energy_flux_epstein(&self, bin: usize, angle: f64, x: f64) -> f64 {
        let block = &self.energy_flux[bin];
        epstein_eval(x, &fourier_sum(angle, block, (block.len() - 1) / 2))
    }

    fn mean_energy_epstein(&self, bin: usize, angle: f64, x: f64) -> f64 {
        let block = &self.mean_energy[bin];
        epstein_eval(x, &fourier_sum(angle, block, (block.len() - 1) / 2))
    }

    /// Broadcasting form of [`ZhangPaxtonModel::evaluate`], returning
    /// `(energy_flux, mean_energy)`.
    pub fn evaluate_array(
        &self,
        mlat: &ArrayViewD<'_, f64>,
        mlt: &ArrayViewD<'_, f64>,
        kp: &ArrayViewD<'_, f64>,
    ) -> Result<(ArrayD<f64>, ArrayD<f64>), ModelError> {
        let predictions = try_map_indexed(&[mlat.view(), mlt.view(), kp.view()], |_, sample| {
            self.evaluate(sample[0], sample[1], sample[2])
        })?;
        let energy_flux = predictions.mapv(|prediction| prediction.energy_flux);
        let mean_energy = predictions.mapv(|prediction| prediction.mean_energy);
        Ok((energy_flux, mean_energy))
    }
}

pub fn zp2008(
    model: &ZhangPaxtonModel,
    mlat: f64,
    mlt: f64,
    kp: f64,
) -> Result<ZpPrediction, ModelError> {
    model.evaluate(mlat, mlt, kp)
}

/// Lower of the two bracketing Kp bins, kept inside the table.
fn kp_bin_index(kp: f64) -> usize {
    searchsorted_left(&KP_BIN_CENTRES, kp)
        .saturating_sub(1)
        .min(KP_BIN_CENTRES.len() - 2)
}

fn fourier_sum(
    angle: f64,
    table: &[EpsteinCoefficients],
    harmonics: usize,
) -> EpsteinCoefficients {
    let mut coefficients = table[0];
    for order in 1..=harmonics {
        let (sin, cos) = (order as f64 * angle).sin_cos();
        let cosine_row = &table[order];
        let sine_row = &table[harmonics + order];
        for (slot, (c, s)) in coefficients
            .iter_mut()
            .zip(cosine_row.iter().zip(sine_row.iter()))
        {
            *slot += cos * c + sin * s;
        }
    }
    coefficients
}

fn clamped_interp(x: f64, grid: [f64; 2], values: [f64; 2]) -> f64 {
    interpolate_linear(x, &grid, &values).unwrap_or(values[0])
}

fn harmonics_in(rows: usize) -> Result<usize, EpsteinTableError> {
    if rows == 0 || rows % 2 == 0 {
        return Err(EpsteinTableError::Inconsistent { rows });
    }
    Ok((rows - 1) / 2)
}

fn parse_rows(source: &str) -> Result<Vec<EpsteinCoefficients>, EpsteinTableError> {
    let mut rows = Vec::new();
    for (index, line) in source.lines().enumerate() {
        let line_number = index + 1;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let fields: Vec<&str> = trimmed.split_whitespace().collect();
        if fields.len() != 5 {
            return Err(EpsteinTableError::Parse {
                line: line_number,
                message: format!("expected 'name A B C D', got {} fields", fields.len()),
            });
        }
        let mut row = [0.0; 4];
        for (slot, field) in row.iter_mut().zip(&fields[1..]) {
            *slot = field.parse().map_err(|_| EpsteinTableError::Parse {
                line: line_number,
                message: format!("'{field}' is not a number"),
            })?;
        }
        rows.push(row);
    }
    Ok(rows)
}
