//! Per-event error handling for the WebSocket surface.
//!
//! The error taxonomy is deliberately narrow. Authentication misses are
//! downgraded to anonymous before a session exists, and stale references
//! (unknown room/connection/identity) are silent no-ops at the registries,
//! so neither produces an error value. What remains is the durable store:
//! a failed load or append must be surfaced to the acting connection
//! instead of pretending success, without affecting anyone else.

use easel_core::protocol::ServerEvent;

/// A failure inside one event handler, isolated to the triggering
/// connection.
#[derive(Debug, thiserror::Error)]
pub enum EventError {
    /// The durable canvas store rejected or could not complete an operation.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Convenience type alias for event handler return values.
pub type EventResult = Result<(), EventError>;

impl EventError {
    /// The `server-error` event delivered to the acting connection.
    /// Internals stay in the logs; clients get a stable, sanitized message.
    pub fn surface(&self, context: &str) -> ServerEvent {
        let message = match self {
            EventError::Database(_) => "The canvas store is unavailable".to_string(),
        };
        ServerEvent::ServerError {
            context: context.to_string(),
            message,
        }
    }
}
