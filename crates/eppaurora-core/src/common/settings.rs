//! Tunable evaluation settings, deserializable from JSON.
//!
//! Every field has a default matching the published parametrizations, so an
//! empty JSON object (or a missing section) yields the reference behavior.

use crate::numerics::grid::InterpolationMethod;
use crate::numerics::rbf::RadialBasis;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_LOWER_KEV: f64 = 0.1;
pub const DEFAULT_UPPER_KEV: f64 = 300.0;
pub const DEFAULT_STEPS: usize = 128;

/// Log-spaced quadrature grid used to integrate over a spectral shape.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct IntegrationSettings {
    pub lower_kev: f64,
    pub upper_kev: f64,
    pub steps: usize,
}

impl Default for IntegrationSettings {
    fn default() -> Self {
        Self {
            lower_kev: DEFAULT_LOWER_KEV,
            upper_kev: DEFAULT_UPPER_KEV,
            steps: DEFAULT_STEPS,
        }
    }
}

impl IntegrationSettings {
    pub fn new(lower_kev: f64, upper_kev: f64, steps: usize) -> Self {
        Self {
            lower_kev,
            upper_kev,
            steps,
        }
    }

    pub fn with_steps(self, steps: usize) -> Self {
        Self { steps, ..self }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BremsstrahlungSettings {
    /// Replacement for missing table entries; `None` skips them.
    pub fill_missing: Option<f64>,
    /// Interpolate log(coefficient) over log(energy) and log(depth).
    pub log_space: bool,
    pub basis: RadialBasis,
}

impl Default for BremsstrahlungSettings {
    fn default() -> Self {
        Self {
            fill_missing: None,
            log_space: true,
            basis: RadialBasis::Multiquadric,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SsusiModelSettings {
    /// Bilinear interpolation in latitude and MLT instead of nearest-bin selection.
    pub interpolate: bool,
    pub method: InterpolationMethod,
    pub return_variance: bool,
}

impl Default for SsusiModelSettings {
    fn default() -> Self {
        Self {
            interpolate: false,
            method: InterpolationMethod::Linear,
            return_variance: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AuroraSettings {
    pub integration: IntegrationSettings,
    pub bremsstrahlung: BremsstrahlungSettings,
    pub ssusi_model: SsusiModelSettings,
}

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("failed to read settings '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse settings '{}': {source}", path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

pub fn load_settings(path: impl AsRef<Path>) -> Result<AuroraSettings, SettingsError> {
    let path = path.as_ref();
    let source = fs::read_to_string(path).map_err(|source| SettingsError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let settings: AuroraSettings =
        serde_json::from_str(&source).map_err(|source| SettingsError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
    tracing::debug!(path = %path.display(), ?settings, "loaded settings");
    Ok(settings)
}
