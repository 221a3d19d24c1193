use std::collections::HashMap;

use axum::body::Bytes;
use axum::extract::ws::Message;
use tokio::sync::{mpsc, RwLock};

use easel_core::protocol::ServerEvent;
use easel_core::types::{ConnectionId, Timestamp};

/// Channel sender half for pushing messages to a WebSocket connection.
pub type WsSender = mpsc::UnboundedSender<Message>;

/// Metadata for a single WebSocket connection.
pub struct WsConnection {
    /// Channel sender for outbound messages to this connection. The
    /// unbounded queue preserves enqueue order, which is what upholds the
    /// per-sender, per-kind delivery ordering contract.
    pub sender: WsSender,
    /// When this connection was established.
    pub connected_at: Timestamp,
}

/// Manages all active WebSocket connections.
///
/// Thread-safe via interior `RwLock`; designed to be wrapped in `Arc` and
/// shared across the application.
pub struct WsManager {
    connections: RwLock<HashMap<ConnectionId, WsConnection>>,
}

impl WsManager {
    /// Create a new, empty connection manager.
    pub fn new() -> Self {
        Self {
            connections: RwLock::new(HashMap::new()),
        }
    }

    /// Register a new connection.
    ///
    /// Returns the receiver half of the message channel so the caller can
    /// forward messages to the WebSocket sink.
    pub async fn add(&self, conn_id: ConnectionId) -> mpsc::UnboundedReceiver<Message> {
        let (tx, rx) = mpsc::unbounded_channel();
        let conn = WsConnection {
            sender: tx,
            connected_at: chrono::Utc::now(),
        };
        self.connections.write().await.insert(conn_id, conn);
        rx
    }

    /// Remove a connection by its ID.
    pub async fn remove(&self, conn_id: ConnectionId) {
        self.connections.write().await.remove(&conn_id);
    }

    /// Send one event to one connection.
    ///
    /// Returns `false` when the connection is unknown or its channel is
    /// closed -- addressing a connection that already went away is a silent
    /// no-op for callers, per the stale-reference rules.
    pub async fn send_event(&self, conn_id: ConnectionId, event: &ServerEvent) -> bool {
        let Some(text) = encode(event) else {
            return false;
        };
        let conns = self.connections.read().await;
        match conns.get(&conn_id) {
            Some(conn) => conn.sender.send(Message::Text(text.into())).is_ok(),
            None => false,
        }
    }

    /// Send one event to a list of connections, serializing it once.
    ///
    /// Connections whose send channels are closed are silently skipped
    /// (they will be cleaned up on their next receive loop iteration).
    pub async fn send_event_to_many(&self, conn_ids: &[ConnectionId], event: &ServerEvent) {
        let Some(text) = encode(event) else {
            return;
        };
        let conns = self.connections.read().await;
        for conn_id in conn_ids {
            if let Some(conn) = conns.get(conn_id) {
                let _ = conn.sender.send(Message::Text(text.clone().into()));
            }
        }
    }

    /// Return the current number of active connections.
    pub async fn connection_count(&self) -> usize {
        self.connections.read().await.len()
    }

    /// Send a Close frame to every connection, then clear the map.
    ///
    /// Used during graceful shutdown to notify all clients before the
    /// server stops accepting new connections.
    pub async fn shutdown_all(&self) {
        let mut conns = self.connections.write().await;
        let count = conns.len();
        for conn in conns.values() {
            let _ = conn.sender.send(Message::Close(None));
        }
        conns.clear();
        tracing::info!(count, "Closed all WebSocket connections");
    }

    /// Send a Ping frame to every connected client.
    ///
    /// Used by the heartbeat task to keep connections alive and detect
    /// stale ones.
    pub async fn ping_all(&self) {
        let conns = self.connections.read().await;
        for conn in conns.values() {
            let _ = conn.sender.send(Message::Ping(Bytes::new()));
        }
    }
}

fn encode(event: &ServerEvent) -> Option<String> {
    match serde_json::to_string(event) {
        Ok(text) => Some(text),
        Err(e) => {
            tracing::error!(error = %e, "Failed to serialize outbound event");
            None
        }
    }
}

impl Default for WsManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text_of(msg: Message) -> String {
        match msg {
            Message::Text(text) => text.to_string(),
            other => panic!("expected text frame, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_send_event_reaches_registered_connection() {
        let manager = WsManager::new();
        let conn = ConnectionId::new_v4();
        let mut rx = manager.add(conn).await;

        let delivered = manager
            .send_event(conn, &ServerEvent::UserLeft { connection_id: conn })
            .await;
        assert!(delivered);

        let frame: serde_json::Value =
            serde_json::from_str(&text_of(rx.try_recv().unwrap())).unwrap();
        assert_eq!(frame["event"], "user-left");
    }

    #[tokio::test]
    async fn test_send_to_unknown_connection_is_a_noop() {
        let manager = WsManager::new();
        let delivered = manager
            .send_event(
                ConnectionId::new_v4(),
                &ServerEvent::UserLeft {
                    connection_id: ConnectionId::new_v4(),
                },
            )
            .await;
        assert!(!delivered);
    }

    #[tokio::test]
    async fn test_consecutive_sends_preserve_order() {
        let manager = WsManager::new();
        let conn = ConnectionId::new_v4();
        let mut rx = manager.add(conn).await;

        for text in ["first", "second", "third"] {
            manager
                .send_event(
                    conn,
                    &ServerEvent::ChatMessage {
                        user: "ada".into(),
                        text: text.into(),
                        timestamp: 0,
                    },
                )
                .await;
        }

        for expected in ["first", "second", "third"] {
            let frame: serde_json::Value =
                serde_json::from_str(&text_of(rx.try_recv().unwrap())).unwrap();
            assert_eq!(frame["data"]["text"], expected);
        }
    }

    #[tokio::test]
    async fn test_removed_connection_is_unreachable() {
        let manager = WsManager::new();
        let conn = ConnectionId::new_v4();
        let _rx = manager.add(conn).await;
        manager.remove(conn).await;

        assert_eq!(manager.connection_count().await, 0);
        assert!(
            !manager
                .send_event(conn, &ServerEvent::UserLeft { connection_id: conn })
                .await
        );
    }
}
