//! Client settings file.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::resolver::DefaultTarget;
use crate::error::{ExtractError, ExtractResult};

static DEFAULT_HOST: &str = "localhost";

/// Settings at ~/.config/chronoperates/config.toml
///
/// None of the keys are required. A missing file behaves like an empty one.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct ClientSettings {
    /// Where `config.json` is served from (e.g. the web front-end's origin).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub origin: Option<String>,

    /// Host used for the `http://{host}:8000` fallback.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_host: Option<String>,

    /// Where downloaded calendar files are saved.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub download_dir: Option<PathBuf>,
}

impl ClientSettings {
    pub fn config_path() -> ExtractResult<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| ExtractError::Config("Could not determine config directory".into()))?
            .join("chronoperates");

        Ok(config_dir.join("config.toml"))
    }

    /// Load settings from the default location.
    pub fn load() -> ExtractResult<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> ExtractResult<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path).map_err(|e| {
            ExtractError::Config(format!("Could not read {}: {e}", path.display()))
        })?;

        toml::from_str(&contents)
            .map_err(|e| ExtractError::Config(format!("Invalid {}: {e}", path.display())))
    }

    pub fn default_target(&self) -> DefaultTarget {
        DefaultTarget::Host(
            self.default_host
                .clone()
                .unwrap_or_else(|| DEFAULT_HOST.to_string()),
        )
    }
}
