//! Per-room video call membership.
//!
//! A separate table from room presence: a connection can be present in a
//! room without joining its call. Membership is an ordered list of
//! connection ids per room plus a reverse index, so disconnects find the
//! affected call without scanning every room.
//!
//! The signaling relay itself lives with the event handlers; this registry
//! only answers "who is in which call".

use std::collections::HashMap;

use tokio::sync::RwLock;

use easel_core::types::{ConnectionId, RoomId};

#[derive(Default)]
struct Inner {
    /// room -> announced connections, in join order.
    rooms: HashMap<RoomId, Vec<ConnectionId>>,
    /// connection -> the one call it is announced in.
    locations: HashMap<ConnectionId, RoomId>,
}

impl Inner {
    fn leave_locked(&mut self, connection_id: ConnectionId) -> Option<(RoomId, Vec<ConnectionId>)> {
        let room_id = self.locations.remove(&connection_id)?;
        let members = self.rooms.get_mut(&room_id)?;
        members.retain(|cid| *cid != connection_id);
        let remaining = members.clone();
        if remaining.is_empty() {
            self.rooms.remove(&room_id);
        }
        Some((room_id, remaining))
    }
}

/// Tracks which connections are announced in which room's call.
pub struct VideoRegistry {
    inner: RwLock<Inner>,
}

impl VideoRegistry {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Inner::default()),
        }
    }

    /// Announce a connection in a room's call and return the other
    /// participants already announced there, in join order.
    ///
    /// Idempotent: any stale prior entry for this connection (in this room
    /// or another) is evicted first, so a double join yields exactly one
    /// membership entry.
    pub async fn join(&self, room_id: &str, connection_id: ConnectionId) -> Vec<ConnectionId> {
        let mut inner = self.inner.write().await;
        inner.leave_locked(connection_id);

        let members = inner.rooms.entry(room_id.to_string()).or_default();
        let others = members.clone();
        members.push(connection_id);
        inner
            .locations
            .insert(connection_id, room_id.to_string());
        others
    }

    /// Remove a connection from whatever call it is announced in. Returns
    /// the call's room and remaining participants (to notify), or `None` if
    /// the connection was not in a call.
    pub async fn leave(&self, connection_id: ConnectionId) -> Option<(RoomId, Vec<ConnectionId>)> {
        let mut inner = self.inner.write().await;
        inner.leave_locked(connection_id)
    }

    /// Explicit leave of a named room's call. A no-op (`None`) unless the
    /// connection is announced in that exact room.
    pub async fn leave_room(
        &self,
        room_id: &str,
        connection_id: ConnectionId,
    ) -> Option<Vec<ConnectionId>> {
        let mut inner = self.inner.write().await;
        if inner.locations.get(&connection_id).map(String::as_str) != Some(room_id) {
            return None;
        }
        inner
            .leave_locked(connection_id)
            .map(|(_, remaining)| remaining)
    }

    /// Announced connections in a room's call, in join order.
    pub async fn members(&self, room_id: &str) -> Vec<ConnectionId> {
        let inner = self.inner.read().await;
        inner.rooms.get(room_id).cloned().unwrap_or_default()
    }
}

impl Default for VideoRegistry {
    fn default() -> Self {
        Self::new()
    }
}
