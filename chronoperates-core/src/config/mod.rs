//! Configuration types for chronoperates.

mod resolver;
mod settings;

pub use resolver::{
    API_URL_ENV, ApiConfig, ConfigResolver, ConfigSource, DEFAULT_API_PORT, DefaultTarget,
    EMULATOR_LOOPBACK_URL, ServedConfig, resolve_api_url,
};
pub use settings::ClientSettings;
