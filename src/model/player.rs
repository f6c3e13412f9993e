use serde::{Deserialize, Serialize};

/// Globally unique, opaque player identifier. Assigned once at creation and never
/// reused; callers must treat it as an opaque token, not a parseable format.
pub type PlayerId = String;

/// Facing direction reported by the client. Purely cosmetic to the controller —
/// never inspected by the state machine, only carried through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Front,
    Back,
    Left,
    Right,
}

/// A position update as reported by a client's `playerMovement` event.
///
/// `conversation_label`, when present and naming a live area, is authoritative:
/// the server never second-guesses it against `(x, y)` (`SPEC_FULL.md` §4.1 step 1).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserLocation {
    pub x: f64,
    pub y: f64,
    pub rotation: Direction,
    pub moving: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conversation_label: Option<String>,
}

impl UserLocation {
    pub fn at(x: f64, y: f64) -> Self {
        Self {
            x,
            y,
            rotation: Direction::Front,
            moving: false,
            conversation_label: None,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.conversation_label = Some(label.into());
        self
    }
}

/// One connected player's identity and live position.
///
/// `active_conversation_area` holds only the area's *label* (a value, not a
/// reference) so a player and an area never form an ownership cycle — resolving
/// the actual [`crate::model::ConversationArea`] always goes back through the
/// owning [`crate::town::TownController`]'s registry (`SPEC_FULL.md` §9).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    pub id: PlayerId,
    pub user_name: String,
    pub location: UserLocation,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_conversation_area: Option<String>,
}

impl Player {
    pub fn new(id: PlayerId, user_name: impl Into<String>) -> Self {
        Self {
            id,
            user_name: user_name.into(),
            location: UserLocation::at(0.0, 0.0),
            active_conversation_area: None,
        }
    }
}
