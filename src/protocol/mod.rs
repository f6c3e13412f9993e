//! Wire formats exchanged over the `subscribe` WebSocket.
//!
//! Both enums tag on a `"type"` field with the payload under `"data"`
//! (`SPEC_FULL.md` §6), e.g. `{"type":"playerMoved","data":{...}}`. Variant
//! names are camelCased by serde, so no field is renamed by hand.

use serde::{Deserialize, Serialize};

use crate::model::{BoundingBox, ConversationArea, Player, PlayerId, UserLocation};

/// A read-only, wire-safe view of a [`ConversationArea`]. The live type carries
/// an `Arc<dyn AreaListener>` list that has no serialized form; this is the
/// projection that actually crosses the socket.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationAreaView {
    pub label: String,
    pub topic: String,
    pub bounding_box: BoundingBox,
    pub occupants_by_id: Vec<PlayerId>,
}

impl From<&ConversationArea> for ConversationAreaView {
    fn from(area: &ConversationArea) -> Self {
        Self {
            label: area.label.clone(),
            topic: area.topic.clone(),
            bounding_box: area.bounding_box,
            occupants_by_id: area.occupants().to_vec(),
        }
    }
}

/// Server-to-client events pushed over the subscription socket.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "camelCase")]
pub enum ServerMessage {
    NewPlayer(Player),
    PlayerMoved(Player),
    PlayerDisconnect(Player),
    ConversationAreaUpdated(ConversationAreaView),
    ConversationAreaDestroyed(ConversationAreaView),
    TownClosing,
}

/// Client-to-server events accepted over the subscription socket. Today this
/// is only the periodic position report; everything else (joining, creating
/// areas) happens over the HTTP/RPC surface before the socket is opened.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "camelCase")]
pub enum ClientMessage {
    PlayerMovement(UserLocation),
}
