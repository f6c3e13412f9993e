use super::player::PlayerId;

/// Opaque, unguessable token identifying a [`PlayerSession`] on the wire.
pub type SessionToken = String;

/// Binds one player to one [`crate::town::TownController`].
///
/// Holds `player_id` rather than a `Player` so the session never goes stale when
/// the controller mutates the player's location — callers resolve the live
/// `Player` through the controller's registry when they need current state.
#[derive(Debug, Clone)]
pub struct PlayerSession {
    pub session_token: SessionToken,
    pub player_id: PlayerId,
    pub video_token: String,
}

impl PlayerSession {
    pub fn new(session_token: SessionToken, player_id: PlayerId, video_token: String) -> Self {
        Self { session_token, player_id, video_token }
    }
}
