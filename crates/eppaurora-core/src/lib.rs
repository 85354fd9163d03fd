//! Atmospheric ionization, recombination and conductivity from auroral and
//! energetic particle precipitation.
//!
//! All array operations accept `ndarray` views (0-d views for scalars) and
//! broadcast their inputs NumPy-style; scalar `f64` kernels are exposed next
//! to them.
//!
//! Units follow the published parametrizations: energies in keV, energy
//! fluxes in keV cm⁻² s⁻¹ (erg cm⁻² s⁻¹ where noted), scale heights in cm,
//! mass densities in g cm⁻³ and altitudes in km.

pub mod common;
pub mod conductivity;
pub mod domain;
pub mod ionization;
pub mod models;
pub mod numerics;
pub mod recombination;
pub mod spectra;

pub use common::settings::{AuroraSettings, IntegrationSettings, load_settings};
pub use domain::{AtmosphereColumn, AuroraError, AuroraErrorCategory, AuroraResult, Species};
pub use ionization::{DissipationInput, EnergyDissipation, IonizationError, Parametrization};
pub use spectra::{SpectrumError, SpectrumKind};
