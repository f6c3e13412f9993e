//! Logging configuration types.

use super::defaults::{
    default_enable_file_logging, default_log_dir, default_log_filename, default_log_format,
    default_rotation,
};
use serde::{Deserialize, Serialize};

/// Output formatter for `tracing-subscriber`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Json,
    Text,
}

impl LogFormat {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Text => "text",
        }
    }
}

impl std::fmt::Display for LogFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// Overrides `RUST_LOG` / the `info` fallback when set.
    #[serde(default)]
    pub level: Option<String>,
    #[serde(default = "default_log_format")]
    pub format: LogFormat,
    #[serde(default = "default_enable_file_logging")]
    pub enable_file_logging: bool,
    #[serde(default = "default_log_dir")]
    pub log_dir: String,
    #[serde(default = "default_log_filename")]
    pub log_filename: String,
    /// One of "minutely", "hourly", "daily", "never".
    #[serde(default = "default_rotation")]
    pub rotation: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: None,
            format: default_log_format(),
            enable_file_logging: default_enable_file_logging(),
            log_dir: default_log_dir(),
            log_filename: default_log_filename(),
            rotation: default_rotation(),
        }
    }
}
