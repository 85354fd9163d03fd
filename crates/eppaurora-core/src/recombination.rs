//! Effective recombination coefficients `alpha(h)` [cm³ s⁻¹] for altitudes in km.
//!
//! Vickrey et al., JGR 87(A7), 5184-5196, 1982; Gledhill, Radio Sci. 21(3),
//! 399-408, 1986; SSUSI Aurora LID ATBD v2.0, Sect. 2.6.2.15.

use crate::numerics::broadcast::{BroadcastError, try_map_indexed};
use ndarray::{ArrayD, ArrayViewD};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RecombinationError {
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

pub fn vickrey1982(h: f64) -> f64 {
    2.5e-6 * (-h / 51.2).exp()
}

pub fn gledhill1986_aurora(h: f64) -> f64 {
    4.3e-6 * (-2.42e-2 * h).exp() + 8.16e12 * (-0.524 * h).exp()
}

pub fn gledhill1986_day(h: f64) -> f64 {
    0.501 * (-0.165 * h).exp()
}

pub fn gledhill1986_night(h: f64) -> f64 {
    652.0 * (-0.234 * h).exp()
}

pub fn alpha_vickrey1982(h: &ArrayViewD<'_, f64>) -> Result<ArrayD<f64>, RecombinationError> {
    map_altitude(h, vickrey1982)
}

pub fn alpha_gledhill1986_aurora(
    h: &ArrayViewD<'_, f64>,
) -> Result<ArrayD<f64>, RecombinationError> {
    map_altitude(h, gledhill1986_aurora)
}

pub fn alpha_gledhill1986_day(h: &ArrayViewD<'_, f64>) -> Result<ArrayD<f64>, RecombinationError> {
    map_altitude(h, gledhill1986_day)
}

pub fn alpha_gledhill1986_night(
    h: &ArrayViewD<'_, f64>,
) -> Result<ArrayD<f64>, RecombinationError> {
    map_altitude(h, gledhill1986_night)
}

/// Piecewise SSUSI profile: constant below `z0`, exponential decay above and
/// optionally [`vickrey1982`] from `z1` upwards.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SsusiRecombination {
    /// Peak effective recombination coefficient [cm³ s⁻¹].
    pub alpha0: f64,
    /// Decay scale height [km].
    pub scale_height: f64,
    /// Altitude of the peak coefficient [km].
    pub z0: f64,
    pub z1: Option<f64>,
}

impl Default for SsusiRecombination {
    fn default() -> Self {
        Self {
            alpha0: 4.2e-7,
            scale_height: 28.9,
            z0: 108.0,
            z1: None,
        }
    }
}

impl SsusiRecombination {
    pub fn with_vickrey_above(self, z1: f64) -> Self {
        Self {
            z1: Some(z1),
            ..self
        }
    }

    pub fn alpha(&self, z: f64) -> f64 {
        match self.z1 {
            Some(z1) if z >= z1 => vickrey1982(z),
            _ if z < self.z0 => self.alpha0,
            _ => self.alpha0 * (-(z - self.z0) / self.scale_height).exp(),
        }
    }
}

pub fn alpha_ssusi(
    z: &ArrayViewD<'_, f64>,
    profile: &SsusiRecombination,
) -> Result<ArrayD<f64>, RecombinationError> {
    map_altitude(z, |z| profile.alpha(z))
}

/// Equilibrium electron density `n_e = sqrt(q / alpha)` [cm⁻³].
///
/// Requires `q >= 0` and `alpha > 0`.
pub fn electron_density(
    q: &ArrayViewD<'_, f64>,
    alpha: &ArrayViewD<'_, f64>,
) -> Result<ArrayD<f64>, RecombinationError> {
    try_map_indexed(&[q.view(), alpha.view()], |index, sample| {
        let [q, alpha] = [sample[0], sample[1]];
        require("q", "finite and >= 0", index, q, q >= 0.0)?;
        require("alpha", "finite and > 0", index, alpha, alpha > 0.0)?;
        Ok((q / alpha).sqrt())
    })
}

fn map_altitude<F>(h: &ArrayViewD<'_, f64>, alpha: F) -> Result<ArrayD<f64>, RecombinationError>
where
    F: Fn(f64) -> f64,
{
    try_map_indexed(&[h.view()], |index, sample| {
        require("altitude", "finite", index, sample[0], true)?;
        Ok(alpha(sample[0]))
    })
}

fn require(
    field: &'static str,
    requirement: &'static str,
    index: usize,
    value: f64,
    valid: bool,
) -> Result<(), RecombinationError> {
    if value.is_finite() && valid {
        Ok(())
    } else {
        Err(RecombinationError::InvalidInput {
            field,
            requirement,
            index,
            value,
        })
    }
}
