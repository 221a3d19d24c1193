use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Query, State};
use axum::http::HeaderMap;
use axum::response::IntoResponse;
use futures::{SinkExt, StreamExt};
use serde::Deserialize;

use easel_core::identity::Identity;
use easel_core::protocol::ClientEvent;
use easel_core::types::ConnectionId;

use crate::auth::{bearer_token, resolve_identity};
use crate::state::AppState;
use crate::ws::session::Session;

/// Upgrade-time query parameters. Browser WebSocket clients cannot set an
/// `Authorization` header, so the token may arrive as `?token=`.
#[derive(Debug, Deserialize)]
pub struct WsQuery {
    token: Option<String>,
}

/// HTTP handler that upgrades the connection to WebSocket.
///
/// The credential is resolved exactly once, before the upgrade completes;
/// a missing or invalid token downgrades the connection to anonymous
/// instead of rejecting it.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    Query(query): Query<WsQuery>,
    headers: HeaderMap,
    State(state): State<AppState>,
) -> impl IntoResponse {
    let token = bearer_token(&headers).or(query.token);
    let identity = resolve_identity(&state.pool, &state.config.jwt, token.as_deref()).await;
    ws.on_upgrade(move |socket| handle_socket(socket, state, identity))
}

/// Manage a single WebSocket connection after upgrade.
///
/// Splits the socket into a sink (outbound) and stream (inbound), then:
///   1. Registers the connection with `WsManager`.
///   2. Spawns a sender task that forwards messages from the manager channel.
///   3. Dispatches inbound events on the current task, one at a time --
///      this sequencing is what preserves per-sender event order.
///   4. Runs the disconnect cascade exactly once on teardown.
async fn handle_socket(socket: WebSocket, state: AppState, identity: Identity) {
    let conn_id = ConnectionId::new_v4();
    tracing::info!(
        conn_id = %conn_id,
        user = identity.display_name(),
        anonymous = identity.is_anonymous(),
        "WebSocket connected"
    );

    // Register and get the receiver for outbound messages.
    let mut rx = state.ws.add(conn_id).await;

    let (mut sink, mut stream) = socket.split();

    // Sender task: forward channel messages to the WebSocket sink.
    let send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if sink.send(msg).await.is_err() {
                tracing::debug!(conn_id = %conn_id, "WebSocket sink closed");
                break;
            }
        }
    });

    let session = Session::new(state.clone(), conn_id, identity);

    // Receiver loop: decode and dispatch inbound events.
    while let Some(result) = stream.next().await {
        match result {
            Ok(Message::Text(text)) => match serde_json::from_str::<ClientEvent>(&text) {
                Ok(event) => session.dispatch(event).await,
                Err(e) => {
                    // Reject the single event; the connection stays up.
                    tracing::warn!(conn_id = %conn_id, error = %e, "Malformed event rejected");
                }
            },
            Ok(Message::Close(_)) => break,
            Ok(Message::Pong(_)) => {
                tracing::trace!(conn_id = %conn_id, "Pong received");
            }
            Ok(_) => {}
            Err(e) => {
                tracing::debug!(conn_id = %conn_id, error = %e, "WebSocket receive error");
                break;
            }
        }
    }

    // Single ordered cleanup: presence, then video, then deregistration.
    // Runs on every teardown path (close frame, transport error, EOF).
    session.cleanup().await;
    state.ws.remove(conn_id).await;
    send_task.abort();
    tracing::info!(conn_id = %conn_id, "WebSocket disconnected");
}
