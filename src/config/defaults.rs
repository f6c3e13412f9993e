//! Default value functions used by `#[serde(default = ...)]` across [`super::Config`].

use super::logging::LogFormat;

pub const fn default_port() -> u16 {
    8081
}

pub fn default_bind_address() -> String {
    "0.0.0.0".to_string()
}

pub fn default_cors_origins() -> String {
    "http://localhost:3000".to_string()
}

// Town defaults

pub const fn default_town_capacity() -> u32 {
    100
}

pub const fn default_session_token_bytes() -> usize {
    16
}

pub const fn default_town_password_bytes() -> usize {
    12
}

pub const fn default_min_admin_password_length() -> usize {
    8
}

pub const fn default_max_friendly_name_length() -> usize {
    200
}

// Logging defaults

pub fn default_log_dir() -> String {
    "logs".to_string()
}

pub fn default_log_filename() -> String {
    "town-server.log".to_string()
}

pub fn default_rotation() -> String {
    "daily".to_string()
}

pub const fn default_enable_file_logging() -> bool {
    false
}

pub const fn default_log_format() -> LogFormat {
    LogFormat::Text
}

// Video token source defaults

pub fn default_video_provider() -> String {
    "in-memory".to_string()
}
