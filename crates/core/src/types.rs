/// All database primary keys are PostgreSQL BIGSERIAL.
pub type DbId = i64;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Opaque client-chosen room name. Rooms are created implicitly on first
/// join; the name doubles as the persistence key for the canvas session.
pub type RoomId = String;

/// Unique per live transport session. Assigned at WebSocket upgrade,
/// never persisted, never reused across reconnects.
pub type ConnectionId = uuid::Uuid;
