//! Service configuration: YAML file, environment expansion and validation.

pub mod loader;
pub mod providers;
pub mod settings;
pub mod validator;

use serde::Deserialize;

use crate::config::{providers::ProvidersConfig, settings::SettingsConfig};

/// ================================
/// Full service configuration
/// ================================
#[derive(Debug, Deserialize, Clone)]
pub struct ServiceConfig {
    pub settings: SettingsConfig,
    pub providers: ProvidersConfig,
}
