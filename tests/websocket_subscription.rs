//! Black-box coverage of the subscribe socket: mint sessions directly through
//! the store (the HTTP layer is exercised by `server::http`'s own tests), open
//! the socket with the minted token, and observe a second player's arrival.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use futures_util::StreamExt;
use tokio_tungstenite::tungstenite::Message as WsMessage;

use town_server::config::TownConfig;
use town_server::metrics::Metrics;
use town_server::server::{self, AppState};
use town_server::town::TownsStore;
use town_server::video::InMemoryVideoTokenSource;

async fn spawn_server() -> (SocketAddr, Arc<TownsStore>) {
    let towns = Arc::new(TownsStore::new(
        TownConfig::default(),
        Arc::new(InMemoryVideoTokenSource::new(8)),
        Arc::new(Metrics::new()),
    ));
    let state = AppState { towns: towns.clone(), metrics: Arc::new(Metrics::new()) };
    let app = server::router(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app.into_make_service()).await.unwrap();
    });
    (addr, towns)
}

#[tokio::test]
async fn second_player_join_is_observed_on_the_first_players_socket() {
    let (addr, towns) = spawn_server().await;

    let created = towns.create_town("Test Town".to_string(), true);
    let controller = towns.get_controller_for_town(&created.town_id).unwrap();

    let alice = controller.add_player("alice".to_string()).await.unwrap();

    let (mut socket, _response) = tokio_tungstenite::connect_async(format!(
        "ws://{addr}/towns/{}/subscribe?sessionToken={}",
        created.town_id, alice.session_token
    ))
    .await
    .expect("alice should be able to open the subscribe socket");

    let bob = controller.add_player("bob".to_string()).await.unwrap();

    let received = tokio::time::timeout(Duration::from_secs(2), socket.next())
        .await
        .expect("should receive an event before the timeout")
        .expect("socket should still be open")
        .expect("should be a valid websocket frame");

    let WsMessage::Text(text) = received else {
        panic!("expected a text frame, got {received:?}");
    };
    let event: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(event["type"], "newPlayer");
    assert_eq!(event["data"]["userName"], "bob");
    assert_eq!(event["data"]["id"], bob.player_id);

    socket.close(None).await.ok();

    // Give the connection's cleanup task a moment to run, then confirm a
    // second teardown of the same session is a harmless no-op.
    tokio::time::sleep(Duration::from_millis(200)).await;
    assert!(controller.destroy_session(&alice.session_token).await.is_err());
}

#[tokio::test]
async fn unknown_session_token_is_rejected_with_a_close_frame() {
    let (addr, towns) = spawn_server().await;
    let created = towns.create_town("Test Town".to_string(), true);

    let (mut socket, _response) = tokio_tungstenite::connect_async(format!(
        "ws://{addr}/towns/{}/subscribe?sessionToken=not-a-real-token",
        created.town_id
    ))
    .await
    .expect("upgrade itself succeeds; rejection happens after");

    let received = tokio::time::timeout(Duration::from_secs(2), socket.next())
        .await
        .expect("should receive a close frame before the timeout")
        .expect("socket should yield a frame")
        .expect("should be a valid websocket frame");

    assert!(matches!(received, WsMessage::Close(_)), "expected a close frame, got {received:?}");
}

#[tokio::test]
async fn town_destruction_emits_town_closing_then_closes_the_socket() {
    let (addr, towns) = spawn_server().await;
    let created = towns.create_town("Test Town".to_string(), true);
    let controller = towns.get_controller_for_town(&created.town_id).unwrap();
    let alice = controller.add_player("alice".to_string()).await.unwrap();

    let (mut socket, _response) = tokio_tungstenite::connect_async(format!(
        "ws://{addr}/towns/{}/subscribe?sessionToken={}",
        created.town_id, alice.session_token
    ))
    .await
    .expect("alice should be able to open the subscribe socket");

    towns.delete_town(&created.town_id, &created.town_update_password).await.unwrap();

    let first = tokio::time::timeout(Duration::from_secs(2), socket.next())
        .await
        .expect("should receive townClosing before the timeout")
        .expect("socket should yield a frame")
        .expect("should be a valid websocket frame");
    let WsMessage::Text(text) = first else {
        panic!("expected a text frame, got {first:?}");
    };
    let event: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(event["type"], "townClosing");

    let second = tokio::time::timeout(Duration::from_secs(2), socket.next())
        .await
        .expect("should receive a close frame before the timeout")
        .expect("socket should yield a frame")
        .expect("should be a valid websocket frame");
    assert!(matches!(second, WsMessage::Close(_)), "expected a close frame, got {second:?}");
}
