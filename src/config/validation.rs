//! Security-relevant configuration validation.

use super::Config;

/// Rejects configuration combinations that would be insecure in production but are
/// not otherwise caught by deserialization. Never panics; returns a descriptive error.
pub fn validate_config_security(config: &Config) -> Result<(), String> {
    if config.town.min_admin_password_length < 6 {
        return Err(format!(
            "town.min_admin_password_length is {}, which is too low to resist guessing",
            config.town.min_admin_password_length
        ));
    }

    if config.town.town_password_bytes < 8 {
        return Err(format!(
            "town.town_password_bytes is {}, which produces guessable update passwords",
            config.town.town_password_bytes
        ));
    }

    if config.town.session_token_bytes < 8 {
        return Err(format!(
            "town.session_token_bytes is {}, which produces guessable session tokens",
            config.town.session_token_bytes
        ));
    }

    if config.video.provider != "in-memory" {
        return Err(format!(
            "unknown video.provider '{}': only 'in-memory' is built in",
            config.video.provider
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_passes_validation() {
        assert!(validate_config_security(&Config::default()).is_ok());
    }

    #[test]
    fn rejects_short_session_tokens() {
        let mut cfg = Config::default();
        cfg.town.session_token_bytes = 2;
        assert!(validate_config_security(&cfg).is_err());
    }

    #[test]
    fn rejects_unknown_video_provider() {
        let mut cfg = Config::default();
        cfg.video.provider = "acme-video".to_string();
        assert!(validate_config_security(&cfg).is_err());
    }
}
