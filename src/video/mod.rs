//! The third-party video-chat credential provider, abstracted behind a trait so the
//! town controller never depends on a concrete vendor.
//!
//! This module owns only the trait and its error type; [`crate::town::TownController`]
//! calls through it during `add_player` and propagates [`TokenMintError`] unchanged.

mod in_memory;

pub use in_memory::InMemoryVideoTokenSource;

use async_trait::async_trait;

/// Returned when a [`VideoTokenSource`] cannot mint a token for a (town, user) pair.
#[derive(Debug, thiserror::Error)]
#[error("video token source failed to mint a token for town {town_id} / user {user_id}: {reason}")]
pub struct TokenMintError {
    pub town_id: String,
    pub user_id: String,
    pub reason: String,
}

/// Mints a capability token scoped to one (townID, userID) pair.
///
/// Implementations may suspend (network call to a vendor); `TownController::add_player`
/// is the only place this is awaited, and the player is not yet visible to any listener
/// while the mint is outstanding.
#[async_trait]
pub trait VideoTokenSource: Send + Sync {
    async fn mint_token(&self, town_id: &str, user_id: &str) -> Result<String, TokenMintError>;
}
