//! Resolved user identities and room roster entries.
//!
//! A connection resolves its credential exactly once, before any room event
//! is accepted. Identity is stable across reconnects (same user id); the
//! connection id is not.

use serde::{Deserialize, Serialize};

use crate::types::{ConnectionId, DbId};

/// Display name used when no credential resolves.
pub const ANONYMOUS_NAME: &str = "Anonymous";

/// The identity a connection acts under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Identity {
    /// Verified credential mapped to a stored user.
    User { id: DbId, name: String },
    /// Missing, malformed, or expired credential. The connection proceeds
    /// anyway; its connection id stands in for a user id.
    Anonymous,
}

impl Identity {
    pub fn display_name(&self) -> &str {
        match self {
            Identity::User { name, .. } => name,
            Identity::Anonymous => ANONYMOUS_NAME,
        }
    }

    pub fn is_anonymous(&self) -> bool {
        matches!(self, Identity::Anonymous)
    }

    /// The key a room presence entry is de-duplicated by: the stable user id
    /// when known, otherwise the ephemeral connection id (no de-duplication
    /// possible for anonymous connections).
    pub fn presence_key(&self, connection_id: ConnectionId) -> PresenceKey {
        match self {
            Identity::User { id, .. } => PresenceKey::User(*id),
            Identity::Anonymous => PresenceKey::Connection(connection_id),
        }
    }
}

/// Dedup key for room presence. A room holds at most one entry per key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PresenceKey {
    User(DbId),
    Connection(ConnectionId),
}

/// One member of a room's live roster, as broadcast to clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresenceEntry {
    /// Stable user id for known users, the connection id for anonymous ones.
    pub id: String,
    pub name: String,
    pub connection_id: ConnectionId,
    pub x: f64,
    pub y: f64,
    pub is_drawing: bool,
}

impl PresenceEntry {
    /// Fresh entry for a connection that just joined: cursor at the origin,
    /// not drawing.
    pub fn new(connection_id: ConnectionId, identity: &Identity) -> Self {
        let id = match identity {
            Identity::User { id, .. } => id.to_string(),
            Identity::Anonymous => connection_id.to_string(),
        };
        Self {
            id,
            name: identity.display_name().to_string(),
            connection_id,
            x: 0.0,
            y: 0.0,
            is_drawing: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_user_keys_by_user_id() {
        let identity = Identity::User {
            id: 7,
            name: "ada".into(),
        };
        let conn = ConnectionId::new_v4();
        assert_eq!(identity.presence_key(conn), PresenceKey::User(7));

        let entry = PresenceEntry::new(conn, &identity);
        assert_eq!(entry.id, "7");
        assert_eq!(entry.name, "ada");
        assert!(!entry.is_drawing);
    }

    #[test]
    fn test_anonymous_keys_by_connection_id() {
        let conn = ConnectionId::new_v4();
        assert_eq!(
            Identity::Anonymous.presence_key(conn),
            PresenceKey::Connection(conn)
        );

        let entry = PresenceEntry::new(conn, &Identity::Anonymous);
        assert_eq!(entry.id, conn.to_string());
        assert_eq!(entry.name, ANONYMOUS_NAME);
    }
}
