//! Video token source selection/configuration.

use super::defaults::default_video_provider;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct VideoConfig {
    /// Selects the [`crate::video::VideoTokenSource`] implementation wired up at startup.
    /// Only `"in-memory"` is built in; anything else is rejected by
    /// [`super::validation::validate_config_security`].
    #[serde(default = "default_video_provider")]
    pub provider: String,
}

impl Default for VideoConfig {
    fn default() -> Self {
        Self {
            provider: default_video_provider(),
        }
    }
}
