pub mod config;
pub mod process;

use anyhow::{Context, Result};
use chronoperates_core::config::{ApiConfig, ClientSettings, ConfigResolver};

pub fn load_settings() -> Result<ClientSettings> {
    ClientSettings::load().context("Failed to load chronoperates settings")
}

/// Resolve the API URL: served config.json, then CHRONOPERATES_API_URL, then the default host.
pub async fn resolve_api(settings: &ClientSettings) -> ApiConfig {
    let mut resolver = ConfigResolver::from_env(settings.origin.clone(), settings.default_target());
    resolver.resolve_config().await
}
