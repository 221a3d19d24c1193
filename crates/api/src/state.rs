use std::sync::Arc;

use crate::config::ServerConfig;
use crate::rooms::PresenceRegistry;
use crate::video::VideoRegistry;
use crate::ws::{Broadcaster, WsManager};

/// Shared application state available to all Axum handlers via
/// `State<AppState>`.
///
/// Cheaply cloneable: inner data is behind `Arc` or is already `Clone`.
/// The registries are the process-wide shared mutable state; everything
/// mutating them goes through their own locks.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool (drawing log + user lookups).
    pub pool: easel_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// WebSocket connection manager (transport senders).
    pub ws: Arc<WsManager>,
    /// Per-room live rosters.
    pub presence: Arc<PresenceRegistry>,
    /// Per-room video call membership.
    pub video: Arc<VideoRegistry>,
    /// Room-addressed fan-out on top of `ws` + `presence`.
    pub broadcast: Broadcaster,
}

impl AppState {
    pub fn new(pool: easel_db::DbPool, config: ServerConfig) -> Self {
        let ws = Arc::new(WsManager::new());
        let presence = Arc::new(PresenceRegistry::new());
        let video = Arc::new(VideoRegistry::new());
        let broadcast = Broadcaster::new(Arc::clone(&ws), Arc::clone(&presence));
        Self {
            pool,
            config: Arc::new(config),
            ws,
            presence,
            video,
            broadcast,
        }
    }
}
