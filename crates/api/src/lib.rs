//! Easel coordinator server library.
//!
//! Exposes the building blocks (config, state, registries, WebSocket
//! infrastructure) so integration tests and the binary entrypoint can both
//! access them.

pub mod auth;
pub mod config;
pub mod error;
pub mod rooms;
pub mod router;
pub mod routes;
pub mod state;
pub mod video;
pub mod ws;
