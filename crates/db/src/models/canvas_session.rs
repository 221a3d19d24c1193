//! Canvas session entity model.

use sqlx::types::Json;
use sqlx::FromRow;

use easel_core::canvas::{Shape, Stroke};
use easel_core::types::{DbId, RoomId, Timestamp};

/// Row from the `canvas_sessions` table: the durable aggregate for one room.
///
/// `strokes` and `shapes` are the authoritative append-only logs, replayed
/// in order by new joiners. `snapshot` is a non-authoritative raster cache
/// for fast initial paint and may lag the logs.
#[derive(Debug, Clone, FromRow)]
pub struct CanvasSession {
    pub id: DbId,
    pub room_id: RoomId,
    /// User id of the first joiner, or their connection id when anonymous.
    pub owner: String,
    pub strokes: Json<Vec<Stroke>>,
    pub shapes: Json<Vec<Shape>>,
    pub snapshot: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}
