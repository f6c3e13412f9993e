//! Town-controller behavior configuration.

use super::defaults::{
    default_max_friendly_name_length, default_min_admin_password_length,
    default_session_token_bytes, default_town_capacity, default_town_password_bytes,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TownConfig {
    /// Default `capacity` assigned to towns created without an explicit override.
    #[serde(default = "default_town_capacity")]
    pub default_capacity: u32,
    /// Number of random bytes used to generate a session token before hex-encoding.
    #[serde(default = "default_session_token_bytes")]
    pub session_token_bytes: usize,
    /// Number of random bytes used to generate a town update password.
    #[serde(default = "default_town_password_bytes")]
    pub town_password_bytes: usize,
    #[serde(default = "default_min_admin_password_length")]
    pub min_admin_password_length: usize,
    #[serde(default = "default_max_friendly_name_length")]
    pub max_friendly_name_length: usize,
}

impl Default for TownConfig {
    fn default() -> Self {
        Self {
            default_capacity: default_town_capacity(),
            session_token_bytes: default_session_token_bytes(),
            town_password_bytes: default_town_password_bytes(),
            min_admin_password_length: default_min_admin_password_length(),
            max_friendly_name_length: default_max_friendly_name_length(),
        }
    }
}
