//! Layered runtime configuration.
//!
//! Submodules:
//! - [`defaults`]: `default_*()` functions backing every `#[serde(default = ...)]`.
//! - [`logging`]: [`logging::LoggingConfig`] / [`logging::LogFormat`].
//! - [`town`]: [`town::TownConfig`] — capacities, token lengths, name limits.
//! - [`video`]: [`video::VideoConfig`] — which [`crate::video::VideoTokenSource`] to wire up.
//! - [`loader`]: precedence-ordered assembly of [`Config`] from env/file/defaults.
//! - [`validation`]: [`validation::validate_config_security`].

pub mod defaults;
pub mod loader;
pub mod logging;
pub mod town;
pub mod validation;
pub mod video;

pub use loader::load;
pub use logging::{LogFormat, LoggingConfig};
pub use town::TownConfig;
pub use validation::validate_config_security;
pub use video::VideoConfig;

use defaults::{default_bind_address, default_cors_origins, default_port};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
    #[serde(default = "default_cors_origins")]
    pub cors_origins: String,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub town: TownConfig,
    #[serde(default)]
    pub video: VideoConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: default_port(),
            bind_address: default_bind_address(),
            cors_origins: default_cors_origins(),
            logging: LoggingConfig::default(),
            town: TownConfig::default(),
            video: VideoConfig::default(),
        }
    }
}
