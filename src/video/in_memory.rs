//! Built-in [`super::VideoTokenSource`] used when `config.video.provider == "in-memory"`.
//!
//! Mints deterministic-looking but unguessable tokens locally; there is no real
//! video vendor to call out to in this deployment shape.

use super::{TokenMintError, VideoTokenSource};
use async_trait::async_trait;
use rand::RngExt;

/// Mints a token of the form `vtok_<town>_<user>_<random-hex>` without talking to
/// any external service. Suitable for local development and for tests that don't
/// care about the provider, only about the contract `TownController` relies on.
#[derive(Debug, Default)]
pub struct InMemoryVideoTokenSource {
    token_bytes: usize,
}

impl InMemoryVideoTokenSource {
    pub fn new(token_bytes: usize) -> Self {
        Self { token_bytes: token_bytes.max(1) }
    }
}

#[async_trait]
impl VideoTokenSource for InMemoryVideoTokenSource {
    async fn mint_token(&self, town_id: &str, user_id: &str) -> Result<String, TokenMintError> {
        if town_id.is_empty() || user_id.is_empty() {
            return Err(TokenMintError {
                town_id: town_id.to_string(),
                user_id: user_id.to_string(),
                reason: "town_id and user_id must be non-empty".to_string(),
            });
        }

        let mut rng = rand::rng();
        let mut bytes = vec![0u8; self.token_bytes];
        for byte in &mut bytes {
            *byte = rng.random_range(0..=u8::MAX);
        }
        let hex: String = bytes.iter().map(|b| format!("{b:02x}")).collect();

        Ok(format!("vtok_{town_id}_{user_id}_{hex}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn mints_a_token_scoped_to_town_and_user() {
        let source = InMemoryVideoTokenSource::new(8);
        let token = source.mint_token("town1", "user1").await.unwrap();
        assert!(token.starts_with("vtok_town1_user1_"));
    }

    #[tokio::test]
    async fn rejects_empty_identifiers() {
        let source = InMemoryVideoTokenSource::new(8);
        assert!(source.mint_token("", "user1").await.is_err());
        assert!(source.mint_token("town1", "").await.is_err());
    }

    #[tokio::test]
    async fn tokens_are_not_reused() {
        let source = InMemoryVideoTokenSource::new(16);
        let a = source.mint_token("town1", "user1").await.unwrap();
        let b = source.mint_token("town1", "user1").await.unwrap();
        assert_ne!(a, b);
    }
}
