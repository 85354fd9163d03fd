//! Physical constants and unit conversions shared by the parametrizations.

/// Elementary charge [C] (2019 SI).
pub const E_CHARGE: f64 = 1.602_176_634e-19;
/// 1 eV in J.
pub const EV_J: f64 = E_CHARGE;
/// 1 erg in J.
pub const ERG_J: f64 = 1.0e-7;
/// 1 erg in keV.
pub const ERG_KEV: f64 = ERG_J / EV_J * 1.0e-3;
/// Electron rest mass [GeV / c²], used to scale ion gyro frequencies.
pub const ELECTRON_MASS_GEV: f64 = 511.0e-6;
/// Electron gyro frequency per tesla [Hz / T].
pub const ELECTRON_GYRO_HZ_PER_T: f64 = 2.8e10;
/// Mean energy lost per ion pair produced in air [keV].
pub const ION_PAIR_ENERGY_KEV: f64 = 0.035;
/// Hours of magnetic local time per full revolution.
pub const MLT_PERIOD_HOURS: f64 = 24.0;
