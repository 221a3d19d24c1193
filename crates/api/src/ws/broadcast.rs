//! Room-addressed fan-out.
//!
//! Pure addressing layer: room membership (the presence registry) resolves
//! a room id to connection ids, and the connection manager delivers.
//! Per-sender, per-kind ordering holds because each connection's inbound
//! events are handled sequentially and each recipient's outbound messages
//! go through one FIFO channel; nothing here reorders in between. Across
//! senders or across event kinds, no ordering is promised.

use std::sync::Arc;

use easel_core::protocol::ServerEvent;
use easel_core::types::ConnectionId;

use crate::rooms::PresenceRegistry;
use crate::ws::manager::WsManager;

/// Fans events out to room members, everyone-but-sender, or single targets.
#[derive(Clone)]
pub struct Broadcaster {
    ws: Arc<WsManager>,
    presence: Arc<PresenceRegistry>,
}

impl Broadcaster {
    pub fn new(ws: Arc<WsManager>, presence: Arc<PresenceRegistry>) -> Self {
        Self { ws, presence }
    }

    /// Deliver to every connection subscribed to the room, sender included.
    pub async fn to_room(&self, room_id: &str, event: &ServerEvent) {
        let members = self.presence.members(room_id).await;
        self.ws.send_event_to_many(&members, event).await;
    }

    /// Deliver to every room subscriber except the originating connection.
    pub async fn to_room_except(
        &self,
        room_id: &str,
        except: ConnectionId,
        event: &ServerEvent,
    ) {
        let members: Vec<ConnectionId> = self
            .presence
            .members(room_id)
            .await
            .into_iter()
            .filter(|cid| *cid != except)
            .collect();
        self.ws.send_event_to_many(&members, event).await;
    }

    /// Deliver to one connection. `false` when it no longer exists --
    /// callers treat that as a silent no-op.
    pub async fn to_connection(&self, conn_id: ConnectionId, event: &ServerEvent) -> bool {
        self.ws.send_event(conn_id, event).await
    }

    /// Deliver to an explicit list of connections (video call peers are
    /// addressed this way, independent of room presence).
    pub async fn to_connections(&self, conn_ids: &[ConnectionId], event: &ServerEvent) {
        self.ws.send_event_to_many(conn_ids, event).await;
    }
}
