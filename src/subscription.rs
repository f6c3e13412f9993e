//! Bridges one [`crate::town::TownController`] to one socket.
//!
//! `SubscriptionHandler` is the only [`TownListener`] implementation in this
//! crate that lives outside the in-process tests — it exists to turn
//! controller events into outbound [`ServerMessage`]s for exactly one
//! subscriber. The actual socket plumbing lives in `server::ws`; this module
//! only owns the translation.

use std::sync::Arc;

use tokio::sync::mpsc;

use crate::listener::TownListener;
use crate::model::{ConversationArea, Player};
use crate::protocol::ServerMessage;

/// Forwards every town-wide event to one outbound channel. Constructed per
/// socket and registered with `TownController::add_town_listener`; dropping
/// the matching `Arc` (after `remove_town_listener`) is the only cleanup
/// needed, since this type holds no other resources.
pub struct SubscriptionHandler {
    outbound: mpsc::Sender<ServerMessage>,
}

impl SubscriptionHandler {
    pub fn new(outbound: mpsc::Sender<ServerMessage>) -> Arc<Self> {
        Arc::new(Self { outbound })
    }

    /// Dispatch is synchronous, so a full channel or a socket that's already
    /// gone is silently dropped rather than blocking the town's state lock.
    fn send(&self, message: ServerMessage) {
        if let Err(err) = self.outbound.try_send(message) {
            tracing::debug!(?err, "dropping outbound message for a lagging or closed subscriber");
        }
    }
}

impl TownListener for SubscriptionHandler {
    fn on_player_joined(&self, player: &Player) {
        self.send(ServerMessage::NewPlayer(player.clone()));
    }

    fn on_player_moved(&self, player: &Player) {
        self.send(ServerMessage::PlayerMoved(player.clone()));
    }

    fn on_player_disconnected(&self, player: &Player) {
        self.send(ServerMessage::PlayerDisconnect(player.clone()));
    }

    fn on_conversation_area_updated(&self, area: &ConversationArea) {
        self.send(ServerMessage::ConversationAreaUpdated(area.into()));
    }

    fn on_conversation_area_destroyed(&self, area: &ConversationArea) {
        self.send(ServerMessage::ConversationAreaDestroyed(area.into()));
    }

    fn on_town_destroyed(&self) {
        self.send(ServerMessage::TownClosing);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::BoundingBox;

    #[tokio::test]
    async fn forwards_player_joined_as_new_player() {
        let (tx, mut rx) = mpsc::channel(4);
        let handler = SubscriptionHandler::new(tx);
        handler.on_player_joined(&Player::new("p1".into(), "alice"));

        match rx.recv().await.unwrap() {
            ServerMessage::NewPlayer(player) => assert_eq!(player.id, "p1"),
            other => panic!("unexpected message: {other:?}"),
        }
    }

    #[tokio::test]
    async fn a_full_channel_does_not_panic() {
        let (tx, _rx) = mpsc::channel(1);
        let handler = SubscriptionHandler::new(tx);
        handler.on_town_destroyed();
        handler.on_town_destroyed();
    }

    #[tokio::test]
    async fn forwards_area_updates_as_views() {
        let (tx, mut rx) = mpsc::channel(4);
        let handler = SubscriptionHandler::new(tx);
        let mut area = ConversationArea::new("a", "chat", BoundingBox::new(0.0, 0.0, 2.0, 2.0));
        area.add_occupant("p1".into());
        handler.on_conversation_area_updated(&area);

        match rx.recv().await.unwrap() {
            ServerMessage::ConversationAreaUpdated(view) => assert_eq!(view.label, "a"),
            other => panic!("unexpected message: {other:?}"),
        }
    }
}
