//! WebSocket upgrade handler and per-connection event loop.

use axum::extract::rejection::QueryRejection;
use axum::extract::ws::{Message, WebSocket};
use axum::extract::{Query, State, WebSocketUpgrade};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use futures_util::{SinkExt, StreamExt};
use mentorconnect_common::ConnectParams;

use crate::error::ApiError;
use crate::AppState;

use super::connection::PeerHandle;
use super::session::SignalingSession;

pub fn router() -> Router<AppState> {
    // The relay also answers on `/` so clients that point at the bare server
    // address keep working.
    Router::new()
        .route("/ws", get(ws_upgrade))
        .route("/", get(ws_upgrade))
}

async fn ws_upgrade(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
    params: Result<Query<ConnectParams>, QueryRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Query(params) = params.map_err(|err| ApiError::bad_request(err.body_text()))?;
    let max_message_bytes = state.config.max_message_bytes;

    Ok(ws
        .max_message_size(max_message_bytes)
        .on_upgrade(move |socket| handle_connection(socket, state, params)))
}

async fn handle_connection(socket: WebSocket, state: AppState, params: ConnectParams) {
    let (mut ws_tx, mut ws_rx) = socket.split();

    let (peer, mut outbound_rx) =
        PeerHandle::new(params.identity(), state.config.outbound_capacity);
    let mut session = SignalingSession::new(peer);
    session.accept(params.room(), &state.rooms);

    tracing::info!(
        connection_id = %session.peer().id(),
        identity = %session.peer().identity(),
        state = ?session.state(),
        "signaling connection opened"
    );

    loop {
        tokio::select! {
            // Client sends us a message.
            msg = ws_rx.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        session.handle_inbound(&state.rooms, text.as_str());
                    }
                    Some(Ok(Message::Binary(bytes))) => match std::str::from_utf8(&bytes) {
                        Ok(text) => {
                            session.handle_inbound(&state.rooms, text);
                        }
                        Err(_) => {
                            tracing::debug!(
                                connection_id = %session.peer().id(),
                                "dropping non-utf8 binary message"
                            );
                        }
                    },
                    Some(Ok(Message::Ping(_))) | Some(Ok(Message::Pong(_))) => continue,
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Err(e)) => {
                        tracing::debug!(?e, connection_id = %session.peer().id(), "ws read error");
                        break;
                    }
                }
            }

            // Frame relayed to us by another member of the room.
            Some(frame) = outbound_rx.recv() => {
                if ws_tx.send(Message::Text(frame.to_string().into())).await.is_err() {
                    break;
                }
            }
        }
    }

    // Stop accepting frames before peers are told we left.
    outbound_rx.close();
    let delivery = session.close(&state.rooms);

    tracing::info!(
        connection_id = %session.peer().id(),
        notified = delivery.delivered,
        "signaling connection closed"
    );
}
