//! WebSocket infrastructure for real-time collaboration.
//!
//! Provides connection management, room-addressed broadcast, per-connection
//! event handling, heartbeat monitoring, and the HTTP upgrade handler used
//! by Axum routes.

mod broadcast;
mod handler;
mod heartbeat;
pub mod manager;
pub mod session;

pub use broadcast::Broadcaster;
pub use handler::ws_handler;
pub use heartbeat::start_heartbeat;
pub use manager::WsManager;
