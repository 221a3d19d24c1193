//! Per-room presence registry.
//!
//! Shared mutable state across all connections in the process. Both maps
//! live under one `RwLock`; every mutation takes the write lock and holds
//! it across the whole dedup-and-insert step with no await points, which is
//! the exclusion mechanism that keeps two near-simultaneous joins from the
//! same identity from both surviving.
//!
//! All operations are no-ops (not errors) against an unknown room or
//! connection: callers act on a possibly-stale view of a live system.

use std::collections::{HashMap, HashSet};

use tokio::sync::RwLock;

use easel_core::identity::{Identity, PresenceEntry, PresenceKey};
use easel_core::types::{ConnectionId, RoomId};

struct Member {
    key: PresenceKey,
    entry: PresenceEntry,
}

#[derive(Default)]
struct Inner {
    /// room -> connection -> roster entry.
    rooms: HashMap<RoomId, HashMap<ConnectionId, Member>>,
    /// connection -> rooms it joined; drives disconnect cleanup.
    memberships: HashMap<ConnectionId, HashSet<RoomId>>,
}

impl Inner {
    fn drop_membership(&mut self, connection_id: ConnectionId, room_id: &str) {
        let emptied = match self.memberships.get_mut(&connection_id) {
            Some(rooms) => {
                rooms.remove(room_id);
                rooms.is_empty()
            }
            None => false,
        };
        if emptied {
            self.memberships.remove(&connection_id);
        }
    }

    fn leave_locked(
        &mut self,
        room_id: &str,
        connection_id: ConnectionId,
    ) -> Option<Vec<PresenceEntry>> {
        let members = self.rooms.get_mut(room_id)?;
        members.remove(&connection_id)?;
        let roster: Vec<PresenceEntry> = members.values().map(|m| m.entry.clone()).collect();
        // Garbage-collect empty rooms. The persisted canvas session is a
        // separate record and survives.
        if members.is_empty() {
            self.rooms.remove(room_id);
        }
        self.drop_membership(connection_id, room_id);
        Some(roster)
    }
}

/// Tracks which connections are present in which rooms, at most one entry
/// per user identity per room.
pub struct PresenceRegistry {
    inner: RwLock<Inner>,
}

impl PresenceRegistry {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Inner::default()),
        }
    }

    /// Add a connection to a room, evicting any stale entry held by the
    /// same identity under a different connection (reconnect, duplicated
    /// tab). Returns the full updated roster for broadcast.
    ///
    /// Anonymous identities key by connection id, so they are never
    /// deduplicated.
    pub async fn join(
        &self,
        room_id: &str,
        connection_id: ConnectionId,
        identity: &Identity,
    ) -> Vec<PresenceEntry> {
        let mut inner = self.inner.write().await;
        let key = identity.presence_key(connection_id);

        let members = inner.rooms.entry(room_id.to_string()).or_default();
        let stale: Vec<ConnectionId> = members
            .iter()
            .filter(|(cid, member)| member.key == key && **cid != connection_id)
            .map(|(cid, _)| *cid)
            .collect();
        for cid in &stale {
            tracing::debug!(conn_id = %cid, room_id, "Evicting stale presence entry");
            members.remove(cid);
        }
        members.insert(
            connection_id,
            Member {
                key,
                entry: PresenceEntry::new(connection_id, identity),
            },
        );
        let roster: Vec<PresenceEntry> = members.values().map(|m| m.entry.clone()).collect();

        for cid in stale {
            inner.drop_membership(cid, room_id);
        }
        inner
            .memberships
            .entry(connection_id)
            .or_default()
            .insert(room_id.to_string());

        roster
    }

    /// Update a member's cursor in place, returning the updated entry.
    /// `None` if the connection has no entry (race with join) -- the caller
    /// skips its broadcast.
    pub async fn update_cursor(
        &self,
        room_id: &str,
        connection_id: ConnectionId,
        x: f64,
        y: f64,
    ) -> Option<PresenceEntry> {
        let mut inner = self.inner.write().await;
        let member = inner.rooms.get_mut(room_id)?.get_mut(&connection_id)?;
        member.entry.x = x;
        member.entry.y = y;
        Some(member.entry.clone())
    }

    /// Toggle a member's isDrawing flag, returning the updated entry.
    pub async fn set_drawing(
        &self,
        room_id: &str,
        connection_id: ConnectionId,
        is_drawing: bool,
    ) -> Option<PresenceEntry> {
        let mut inner = self.inner.write().await;
        let member = inner.rooms.get_mut(room_id)?.get_mut(&connection_id)?;
        member.entry.is_drawing = is_drawing;
        Some(member.entry.clone())
    }

    /// Remove a connection from one room. Returns the remaining roster, or
    /// `None` if the connection was not present.
    pub async fn leave(
        &self,
        room_id: &str,
        connection_id: ConnectionId,
    ) -> Option<Vec<PresenceEntry>> {
        let mut inner = self.inner.write().await;
        inner.leave_locked(room_id, connection_id)
    }

    /// Remove a connection from every room it joined. Returns the remaining
    /// roster per affected room so the caller can broadcast each exactly
    /// once.
    pub async fn remove_connection(
        &self,
        connection_id: ConnectionId,
    ) -> Vec<(RoomId, Vec<PresenceEntry>)> {
        let mut inner = self.inner.write().await;
        let rooms: Vec<RoomId> = inner
            .memberships
            .remove(&connection_id)
            .map(|set| set.into_iter().collect())
            .unwrap_or_default();

        let mut departed = Vec::with_capacity(rooms.len());
        for room_id in rooms {
            if let Some(roster) = inner.leave_locked(&room_id, connection_id) {
                departed.push((room_id, roster));
            }
        }
        departed
    }

    /// Connection ids currently subscribed to a room -- the broadcast
    /// router's addressing scheme.
    pub async fn members(&self, room_id: &str) -> Vec<ConnectionId> {
        let inner = self.inner.read().await;
        inner
            .rooms
            .get(room_id)
            .map(|members| members.keys().copied().collect())
            .unwrap_or_default()
    }

    /// Display name of one room member, for the video broker's roster
    /// replies.
    pub async fn display_name(&self, room_id: &str, connection_id: ConnectionId) -> Option<String> {
        let inner = self.inner.read().await;
        inner
            .rooms
            .get(room_id)?
            .get(&connection_id)
            .map(|m| m.entry.name.clone())
    }
}

impl Default for PresenceRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(id: i64, name: &str) -> Identity {
        Identity::User {
            id,
            name: name.into(),
        }
    }

    #[tokio::test]
    async fn test_rejoin_evicts_stale_entry_for_same_user() {
        let registry = PresenceRegistry::new();
        let old_conn = ConnectionId::new_v4();
        let new_conn = ConnectionId::new_v4();
        let ada = user(1, "ada");

        registry.join("r1", old_conn, &ada).await;
        let roster = registry.join("r1", new_conn, &ada).await;

        assert_eq!(roster.len(), 1, "one entry per user identity");
        assert_eq!(roster[0].connection_id, new_conn);
        assert_eq!(registry.members("r1").await, vec![new_conn]);
    }

    #[tokio::test]
    async fn test_anonymous_connections_are_not_deduplicated() {
        let registry = PresenceRegistry::new();
        let a = ConnectionId::new_v4();
        let b = ConnectionId::new_v4();

        registry.join("r1", a, &Identity::Anonymous).await;
        let roster = registry.join("r1", b, &Identity::Anonymous).await;

        assert_eq!(roster.len(), 2, "anonymous users key by connection id");
    }

    #[tokio::test]
    async fn test_same_user_in_two_rooms_keeps_both_entries() {
        let registry = PresenceRegistry::new();
        let conn = ConnectionId::new_v4();
        let ada = user(1, "ada");

        registry.join("r1", conn, &ada).await;
        registry.join("r2", conn, &ada).await;

        assert_eq!(registry.members("r1").await.len(), 1);
        assert_eq!(registry.members("r2").await.len(), 1);
    }

    #[tokio::test]
    async fn test_cursor_update_on_unknown_connection_is_a_noop() {
        let registry = PresenceRegistry::new();
        let result = registry
            .update_cursor("nowhere", ConnectionId::new_v4(), 1.0, 2.0)
            .await;
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_cursor_and_drawing_flag_update_in_place() {
        let registry = PresenceRegistry::new();
        let conn = ConnectionId::new_v4();
        registry.join("r1", conn, &user(1, "ada")).await;

        let entry = registry.update_cursor("r1", conn, 120.0, 45.5).await.unwrap();
        assert_eq!((entry.x, entry.y), (120.0, 45.5));

        let entry = registry.set_drawing("r1", conn, true).await.unwrap();
        assert!(entry.is_drawing);
    }

    #[tokio::test]
    async fn test_last_leave_garbage_collects_the_room() {
        let registry = PresenceRegistry::new();
        let conn = ConnectionId::new_v4();
        registry.join("r1", conn, &user(1, "ada")).await;

        let remaining = registry.leave("r1", conn).await.unwrap();
        assert!(remaining.is_empty());
        // A second leave finds nothing: the room record is gone.
        assert!(registry.leave("r1", conn).await.is_none());
        assert!(registry.members("r1").await.is_empty());
    }

    #[tokio::test]
    async fn test_remove_connection_reports_every_joined_room() {
        let registry = PresenceRegistry::new();
        let conn = ConnectionId::new_v4();
        let other = ConnectionId::new_v4();
        registry.join("r1", conn, &user(1, "ada")).await;
        registry.join("r2", conn, &user(1, "ada")).await;
        registry.join("r1", other, &user(2, "grace")).await;

        let mut departed = registry.remove_connection(conn).await;
        departed.sort_by(|a, b| a.0.cmp(&b.0));

        assert_eq!(departed.len(), 2);
        assert_eq!(departed[0].0, "r1");
        assert_eq!(departed[0].1.len(), 1, "grace remains in r1");
        assert_eq!(departed[1].0, "r2");
        assert!(departed[1].1.is_empty());

        // Cleanup ran once; there is nothing left to remove.
        assert!(registry.remove_connection(conn).await.is_empty());
    }

    #[tokio::test]
    async fn test_evicted_connection_no_longer_reports_the_room() {
        let registry = PresenceRegistry::new();
        let old_conn = ConnectionId::new_v4();
        let new_conn = ConnectionId::new_v4();
        let ada = user(1, "ada");

        registry.join("r1", old_conn, &ada).await;
        registry.join("r1", new_conn, &ada).await;

        // The evicted connection's later disconnect must not disturb the
        // room again.
        assert!(registry.remove_connection(old_conn).await.is_empty());
        assert_eq!(registry.members("r1").await, vec![new_conn]);
    }
}
