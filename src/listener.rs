//! The controller-wide observer interface.
//!
//! Mirrors the duck-typed listener objects of the source system as a small fixed
//! interface (`SPEC_FULL.md` §9 "Dynamic dispatch of events"): every method has a
//! no-op default so a listener — a UI hook, a per-socket bridge, a test double —
//! only overrides the events it actually cares about.

use crate::model::{ConversationArea, Player};

/// Observer of controller-wide events. Distinct from
/// [`crate::model::AreaListener`], which scopes to one area.
///
/// Implementations must be `Send + Sync`: the controller may be shared across
/// tasks, and dispatch happens from whichever task is driving the mutating call.
pub trait TownListener: Send + Sync {
    fn on_player_joined(&self, _player: &Player) {}
    fn on_player_moved(&self, _player: &Player) {}
    fn on_player_disconnected(&self, _player: &Player) {}
    fn on_conversation_area_updated(&self, _area: &ConversationArea) {}
    fn on_conversation_area_destroyed(&self, _area: &ConversationArea) {}
    fn on_town_destroyed(&self) {}
}
