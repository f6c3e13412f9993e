//! The `subscribe` WebSocket: one connection per [`crate::model::PlayerSession`].
//!
//! Mirrors the split-socket, channel-bridged connection loop used throughout
//! this crate's ancestry: the socket is split into a sender and receiver half,
//! an outbound `mpsc` channel decouples controller-thread dispatch from the
//! actual write, and two tasks race under `select!` so either a client
//! disconnect or a server-initiated close tears the whole thing down.

use axum::extract::ws::{CloseFrame, Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Path, Query, State};
use axum::response::Response;
use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;
use tokio::sync::mpsc;

use crate::listener::TownListener;
use crate::protocol::ClientMessage;
use crate::subscription::SubscriptionHandler;

use super::AppState;

/// WebSocket close codes for the two "disconnect with reason=true" cases
/// (`SPEC_FULL.md` §6): an auth failure at handshake time, or a later
/// server-initiated close (town destroyed while the socket was open).
const AUTH_FAILURE_CLOSE_CODE: u16 = 4001;
const SERVER_CLOSING_CLOSE_CODE: u16 = 4002;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscribeQuery {
    pub session_token: String,
}

pub async fn subscribe_handler(
    ws: WebSocketUpgrade,
    Path(town_id): Path<String>,
    Query(query): Query<SubscribeQuery>,
    State(state): State<AppState>,
) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state, town_id, query.session_token))
}

/// Closes `socket` with a reason frame and drops it. Used for both reject
/// conditions (`SPEC_FULL.md` §4.4): unknown townID, unknown sessionToken.
async fn reject(mut socket: WebSocket, reason: &'static str) {
    let _ = socket
        .send(Message::Close(Some(CloseFrame {
            code: AUTH_FAILURE_CLOSE_CODE,
            reason: reason.into(),
        })))
        .await;
}

async fn handle_socket(socket: WebSocket, state: AppState, town_id: String, session_token: String) {
    let Some(controller) = state.towns.get_controller_for_town(&town_id) else {
        reject(socket, "unknown townID").await;
        return;
    };
    let Some(session) = controller.find_session(&session_token).await else {
        reject(socket, "unknown sessionToken").await;
        return;
    };

    let (mut sender, mut receiver) = socket.split();
    let (outbound_tx, mut outbound_rx) = mpsc::channel(128);

    let listener: std::sync::Arc<dyn TownListener> = SubscriptionHandler::new(outbound_tx);
    controller.add_town_listener(listener.clone()).await;

    let send_task = tokio::spawn(async move {
        while let Some(message) = outbound_rx.recv().await {
            let is_town_closing = matches!(message, crate::protocol::ServerMessage::TownClosing);
            let Ok(text) = serde_json::to_string(&message) else {
                continue;
            };
            if sender.send(Message::Text(text.into())).await.is_err() {
                break;
            }
            // "onTownDestroyed() -> emit townClosing, then disconnect the socket"
            // (`SPEC_FULL.md` §4.4): the server closes from its side rather than
            // waiting for the client to react to the message it just sent.
            if is_town_closing {
                let _ = sender
                    .send(Message::Close(Some(CloseFrame {
                        code: SERVER_CLOSING_CLOSE_CODE,
                        reason: "town closed".into(),
                    })))
                    .await;
                break;
            }
        }
    });

    let player_id = session.player_id.clone();
    let recv_controller = controller.clone();
    let receive_task = tokio::spawn(async move {
        while let Some(Ok(message)) = receiver.next().await {
            match message {
                Message::Text(text) => {
                    if let Ok(ClientMessage::PlayerMovement(location)) = serde_json::from_str(&text) {
                        let _ = recv_controller.update_player_location(&player_id, location).await;
                    }
                }
                Message::Close(_) => break,
                _ => {}
            }
        }
    });

    tokio::select! {
        _ = send_task => {}
        _ = receive_task => {}
    }

    // Idempotent teardown: whichever branch of the select above ran, both the
    // listener removal and the session destruction are safe to call again if
    // a later event (e.g. a stray `disconnect`) reaches here a second time.
    controller.remove_town_listener(&listener).await;
    let _ = controller.destroy_session(&session_token).await;
}
