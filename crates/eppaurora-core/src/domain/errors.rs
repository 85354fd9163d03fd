use std::error::Error;
use std::fmt::{Display, Formatter};

use super::AtmosphereError;
use crate::common::settings::SettingsError;
use crate::conductivity::ConductivityError;
use crate::ionization::IonizationError;
use crate::models::ModelError;
use crate::models::ssusiq2023::CoefficientTableError;
use crate::models::zhangpaxton2008::EpsteinTableError;
use crate::numerics::broadcast::BroadcastError;
use crate::recombination::RecombinationError;
use crate::spectra::SpectrumError;

pub type AuroraResult<T> = Result<T, AuroraError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AuroraErrorCategory {
    InputValidationError,
    IoSystemError,
    ComputationError,
}

impl AuroraErrorCategory {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::InputValidationError => "InputValidationError",
            Self::IoSystemError => "IoSystemError",
            Self::ComputationError => "ComputationError",
        }
    }

    pub const fn severity(self) -> &'static str {
        match self {
            Self::InputValidationError => "INPUT",
            Self::IoSystemError => "IO",
            Self::ComputationError => "RUN",
        }
    }
}

/// Crate-level error: a category, a stable placeholder tag for the failing
/// operation, and the rendered message of the underlying module error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuroraError {
    category: AuroraErrorCategory,
    placeholder: &'static str,
    message: String,
}

impl AuroraError {
    pub fn new(
        category: AuroraErrorCategory,
        placeholder: &'static str,
        message: impl Into<String>,
    ) -> Self {
        Self {
            category,
            placeholder,
            message: message.into(),
        }
    }

    pub fn input_validation(placeholder: &'static str, message: impl Into<String>) -> Self {
        Self::new(
            AuroraErrorCategory::InputValidationError,
            placeholder,
            message,
        )
    }

    pub fn io_system(placeholder: &'static str, message: impl Into<String>) -> Self {
        Self::new(AuroraErrorCategory::IoSystemError, placeholder, message)
    }

    pub fn computation(placeholder: &'static str, message: impl Into<String>) -> Self {
        Self::new(AuroraErrorCategory::ComputationError, placeholder, message)
    }

    pub const fn category(&self) -> AuroraErrorCategory {
        self.category
    }

    pub const fn placeholder(&self) -> &'static str {
        self.placeholder
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn diagnostic_line(&self) -> String {
        format!(
            "ERROR: {} [{}] {}",
            self.category.severity(),
            self.placeholder,
            self.message
        )
    }
}

impl Display for AuroraError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} [{}] {}",
            self.category.as_str(),
            self.placeholder,
            self.message
        )
    }
}

impl Error for AuroraError {}

impl From<BroadcastError> for AuroraError {
    fn from(error: BroadcastError) -> Self {
        Self::input_validation("INPUT.BROADCAST", error.to_string())
    }
}

impl From<AtmosphereError> for AuroraError {
    fn from(error: AtmosphereError) -> Self {
        Self::input_validation("INPUT.ATMOSPHERE", error.to_string())
    }
}

impl From<IonizationError> for AuroraError {
    fn from(error: IonizationError) -> Self {
        match error {
            IonizationError::Interpolation(_) => {
                Self::computation("RUN.IONIZATION", error.to_string())
            }
            _ => Self::input_validation("INPUT.IONIZATION", error.to_string()),
        }
    }
}

impl From<RecombinationError> for AuroraError {
    fn from(error: RecombinationError) -> Self {
        Self::input_validation("INPUT.RECOMBINATION", error.to_string())
    }
}

impl From<ConductivityError> for AuroraError {
    fn from(error: ConductivityError) -> Self {
        Self::input_validation("INPUT.CONDUCTIVITY", error.to_string())
    }
}

impl From<SpectrumError> for AuroraError {
    fn from(error: SpectrumError) -> Self {
        Self::input_validation("INPUT.SPECTRUM", error.to_string())
    }
}

impl From<ModelError> for AuroraError {
    fn from(error: ModelError) -> Self {
        Self::input_validation("INPUT.MODEL", error.to_string())
    }
}

impl From<CoefficientTableError> for AuroraError {
    fn from(error: CoefficientTableError) -> Self {
        match error {
            CoefficientTableError::Read { .. } => Self::io_system("IO.COEFFS", error.to_string()),
            _ => Self::input_validation("INPUT.COEFFS", error.to_string()),
        }
    }
}

impl From<EpsteinTableError> for AuroraError {
    fn from(error: EpsteinTableError) -> Self {
        match error {
            EpsteinTableError::Read { .. } => Self::io_system("IO.EPSTEIN", error.to_string()),
            _ => Self::input_validation("INPUT.EPSTEIN", error.to_string()),
        }
    }
}

impl From<SettingsError> for AuroraError {
    fn from(error: SettingsError) -> Self {
        match error {
            SettingsError::Read { .. } => Self::io_system("IO.SETTINGS", error.to_string()),
            _ => Self::input_validation("INPUT.SETTINGS", error.to_string()),
        }
    }
}
