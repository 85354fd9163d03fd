pub mod constants;
pub mod settings;

pub use settings::{
    AuroraSettings, BremsstrahlungSettings, IntegrationSettings, SettingsError, SsusiModelSettings,
    load_settings,
};
