#![allow(dead_code)]

use std::net::SocketAddr;
use std::time::Duration;

use axum::Router;
use futures_util::{SinkExt, StreamExt};
use tokio::time;
use tokio_tungstenite::tungstenite;

use signal_api::config::Config;
use signal_api::AppState;

pub type WsClient =
    tokio_tungstenite::WebSocketStream<tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>>;

/// Relay settings used by tests unless a test needs its own.
pub fn test_config() -> Config {
    Config {
        port: 5000,
        ..Config::default()
    }
}

/// Build a test AppState with default relay settings.
pub fn test_state() -> AppState {
    AppState::new(test_config())
}

/// Build the full application router wired to a fresh test state.
pub fn test_app() -> (Router, AppState) {
    test_app_with(test_config())
}

pub fn test_app_with(config: Config) -> (Router, AppState) {
    let state = AppState::new(config);
    let app = signal_api::routes::router().with_state(state.clone());
    (app, state)
}

/// Start an actual TCP server for WebSocket testing. The server runs in the background.
pub async fn start_ws_server() -> (SocketAddr, AppState) {
    start_ws_server_with(test_config()).await
}

pub async fn start_ws_server_with(config: Config) -> (SocketAddr, AppState) {
    let (app, state) = test_app_with(config);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind");
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (addr, state)
}

/// Open a relay connection. `query` is appended verbatim, e.g. `"?room=abc&user=x"`.
pub async fn connect(addr: SocketAddr, query: &str) -> WsClient {
    let url = format!("ws://{addr}/ws{query}");
    let (ws_stream, _) = tokio_tungstenite::connect_async(&url)
        .await
        .expect("ws connect");
    ws_stream
}

/// Wait until the registry shows `count` members in `room`.
///
/// The server joins a connection after the upgrade response has been sent,
/// so a client can be connected before the registry knows about it.
pub async fn wait_for_members(state: &AppState, room: &str, count: usize) {
    time::timeout(Duration::from_secs(5), async {
        while state.rooms.members_of(room).len() != count {
            time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .unwrap_or_else(|_| panic!("room {room} never reached {count} members"));
}

/// Wait until `room` no longer exists in the registry.
pub async fn wait_for_room_gone(state: &AppState, room: &str) {
    time::timeout(Duration::from_secs(5), async {
        while state.rooms.contains_room(room) {
            time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .unwrap_or_else(|_| panic!("room {room} was never deleted"));
}

pub async fn send_json(ws: &mut WsClient, value: &serde_json::Value) {
    ws.send(tungstenite::Message::Text(value.to_string().into()))
        .await
        .expect("send");
}

pub async fn send_text(ws: &mut WsClient, text: &str) {
    ws.send(tungstenite::Message::Text(text.to_string().into()))
        .await
        .expect("send");
}

/// Read the next text frame as JSON, skipping control frames.
pub async fn recv_json(ws: &mut WsClient) -> serde_json::Value {
    loop {
        let msg = time::timeout(Duration::from_secs(5), ws.next())
            .await
            .expect("timeout waiting for message")
            .expect("stream ended")
            .expect("ws read error");

        match msg {
            tungstenite::Message::Text(text) => {
                return serde_json::from_str(&text).expect("parse message");
            }
            tungstenite::Message::Ping(_) | tungstenite::Message::Pong(_) => continue,
            other => panic!("Expected text frame, got: {other:?}"),
        }
    }
}

/// Assert that nothing arrives on `ws` for a short while.
pub async fn assert_silent(ws: &mut WsClient) {
    let result = time::timeout(Duration::from_millis(300), ws.next()).await;
    if let Ok(next) = result {
        panic!("Expected no message, got: {next:?}");
    }
}
