//! Resolves the API base URL once, from an ordered list of sources.
//!
//! 1. A `config.json` descriptor served next to the client (`{"apiUrl": "..."}`)
//! 2. The `CHRONOPERATES_API_URL` environment variable
//! 3. A hard default for the platform

use serde::Deserialize;
use tracing::{debug, info};

use crate::error::{ExtractError, ExtractResult};

pub const API_URL_ENV: &str = "CHRONOPERATES_API_URL";
pub const DEFAULT_API_PORT: u16 = 8000;

/// Android emulators reach the host machine through this address.
pub const EMULATOR_LOOPBACK_URL: &str = "http://10.0.2.2:8000";

const CONFIG_DESCRIPTOR: &str = "config.json";

/// The resolved backend location. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    api_url: String,
}

impl ApiConfig {
    pub fn new(api_url: impl Into<String>) -> Self {
        let api_url = api_url.into().trim_end_matches('/').to_string();
        ApiConfig { api_url }
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    /// `{api_url}/{path}`
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.api_url, path)
    }
}

/// Descriptor served at `/config.json`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServedConfig {
    #[serde(default)]
    pub api_url: Option<String>,
}

/// Where the last-resort URL comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DefaultTarget {
    /// `http://{host}:8000`
    Host(String),
    EmulatorLoopback,
}

impl DefaultTarget {
    pub fn url(&self) -> String {
        match self {
            DefaultTarget::Host(host) => format!("http://{}:{}", host, DEFAULT_API_PORT),
            DefaultTarget::EmulatorLoopback => EMULATOR_LOOPBACK_URL.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigSource {
    Served,
    Environment,
    Default,
}

/// Deployments template `config.json` at container start. A value that was
/// never substituted still carries its token (`${API_URL}`, `__API_URL__`).
fn is_placeholder(value: &str) -> bool {
    let value = value.trim();
    value.is_empty()
        || value.contains("${")
        || (value.len() > 4 && value.starts_with("__") && value.ends_with("__"))
}

/// Pick the API URL from the available sources, first usable one wins.
pub fn resolve_api_url(
    served: Option<&ServedConfig>,
    env: Option<&str>,
    default: &DefaultTarget,
) -> (ApiConfig, ConfigSource) {
    if let Some(url) = served.and_then(|s| s.api_url.as_deref()) {
        if !is_placeholder(url) {
            return (ApiConfig::new(url), ConfigSource::Served);
        }
        debug!(value = url, "served_config_placeholder_ignored");
    }

    if let Some(url) = env.map(str::trim).filter(|url| !url.is_empty()) {
        return (ApiConfig::new(url), ConfigSource::Environment);
    }

    (ApiConfig::new(default.url()), ConfigSource::Default)
}

/// Holds the once-resolved [`ApiConfig`] for a process.
///
/// The resolved value is meant to be handed to [`crate::ApiClient`]; reading
/// it before [`ConfigResolver::resolve_config`] has run is an error.
pub struct ConfigResolver {
    http: reqwest::Client,
    origin: Option<String>,
    env_url: Option<String>,
    default: DefaultTarget,
    resolved: Option<ApiConfig>,
}

impl ConfigResolver {
    /// `origin` is where `config.json` is served from; `None` skips that source.
    pub fn new(origin: Option<String>, env_url: Option<String>, default: DefaultTarget) -> Self {
        ConfigResolver {
            http: reqwest::Client::new(),
            origin,
            env_url,
            default,
            resolved: None,
        }
    }

    /// Like [`ConfigResolver::new`], reading the environment source from
    /// `CHRONOPERATES_API_URL`.
    pub fn from_env(origin: Option<String>, default: DefaultTarget) -> Self {
        Self::new(origin, std::env::var(API_URL_ENV).ok(), default)
    }

    /// Resolve the config if it hasn't been already. Later calls return the
    /// first result without touching the network.
    pub async fn resolve_config(&mut self) -> ApiConfig {
        if let Some(config) = &self.resolved {
            return config.clone();
        }

        let served = self.fetch_served_config().await;
        let (config, source) =
            resolve_api_url(served.as_ref(), self.env_url.as_deref(), &self.default);

        info!(api_url = config.api_url(), source = ?source, "config_resolved");
        self.resolved = Some(config.clone());
        config
    }

    pub fn config(&self) -> ExtractResult<&ApiConfig> {
        self.resolved.as_ref().ok_or(ExtractError::ConfigNotLoaded)
    }

    pub fn base_url(&self) -> ExtractResult<&str> {
        self.config().map(ApiConfig::api_url)
    }

    /// Forget the resolved value so the next `resolve_config` starts over.
    #[doc(hidden)]
    pub fn reset_for_testing(&mut self) {
        self.resolved = None;
    }

    async fn fetch_served_config(&self) -> Option<ServedConfig> {
        let origin = self.origin.as_deref()?;
        let url = format!("{}/{}", origin.trim_end_matches('/'), CONFIG_DESCRIPTOR);

        let resp = match self.http.get(&url).send().await {
            Ok(resp) => resp,
            Err(e) => {
                debug!(url = %url, error = %e, "served_config_unreachable");
                return None;
            }
        };

        if !resp.status().is_success() {
            debug!(url = %url, status = resp.status().as_u16(), "served_config_missing");
            return None;
        }

        match resp.json::<ServedConfig>().await {
            Ok(served) => Some(served),
            Err(e) => {
                debug!(url = %url, error = %e, "served_config_invalid");
                None
            }
        }
    }
}
