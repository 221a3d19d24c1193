//! Repository for the `canvas_sessions` table: the per-room drawing log.
//!
//! Append order is room-scoped, not global: the row lock taken by each
//! `UPDATE` serializes appends to one room while leaving other rooms
//! untouched, including across server processes.

use sqlx::types::Json;
use sqlx::PgPool;

use easel_core::canvas::{Shape, Stroke};

use crate::models::canvas_session::CanvasSession;

const COLUMNS: &str = "id, room_id, owner, strokes, shapes, snapshot, created_at, updated_at";

/// Durable storage for room canvases.
pub struct CanvasSessionRepo;

impl CanvasSessionRepo {
    /// Fetch the session for a room, creating an empty one if absent.
    ///
    /// Concurrent first-joiners race on the `uq_canvas_sessions_room_id`
    /// constraint: `ON CONFLICT DO NOTHING` lets exactly one INSERT win, and
    /// the loser falls through to read the winner's row. `owner` is only
    /// recorded by the winning insert.
    pub async fn load_or_create(
        pool: &PgPool,
        room_id: &str,
        owner: &str,
    ) -> Result<CanvasSession, sqlx::Error> {
        let insert = format!(
            "INSERT INTO canvas_sessions (room_id, owner)
             VALUES ($1, $2)
             ON CONFLICT (room_id) DO NOTHING
             RETURNING {COLUMNS}"
        );
        if let Some(created) = sqlx::query_as::<_, CanvasSession>(&insert)
            .bind(room_id)
            .bind(owner)
            .fetch_optional(pool)
            .await?
        {
            tracing::debug!(room_id, owner, "Created canvas session");
            return Ok(created);
        }

        let select = format!("SELECT {COLUMNS} FROM canvas_sessions WHERE room_id = $1");
        sqlx::query_as::<_, CanvasSession>(&select)
            .bind(room_id)
            .fetch_one(pool)
            .await
    }

    /// Append one stroke to a room's log. Returns `false` if the room has no
    /// session (stale reference).
    pub async fn append_stroke(
        pool: &PgPool,
        room_id: &str,
        stroke: &Stroke,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE canvas_sessions
             SET strokes = strokes || $2, updated_at = NOW()
             WHERE room_id = $1",
        )
        .bind(room_id)
        .bind(Json(stroke))
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Append one shape to a room's log. Returns `false` if the room has no
    /// session.
    pub async fn append_shape(
        pool: &PgPool,
        room_id: &str,
        shape: &Shape,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE canvas_sessions
             SET shapes = shapes || $2, updated_at = NOW()
             WHERE room_id = $1",
        )
        .bind(room_id)
        .bind(Json(shape))
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Reposition the shape with the given stable id.
    ///
    /// Rewrites only the matching element's `x`/`y`, leaving log order
    /// intact. Returns `false` when the room or the shape id is unknown.
    pub async fn move_shape(
        pool: &PgPool,
        room_id: &str,
        shape_id: &str,
        x: f64,
        y: f64,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE canvas_sessions
             SET shapes = (
                 SELECT COALESCE(jsonb_agg(
                     CASE WHEN elem->>'id' = $2
                          THEN elem || jsonb_build_object('x', $3::float8, 'y', $4::float8)
                          ELSE elem
                     END), '[]'::jsonb)
                 FROM jsonb_array_elements(shapes) AS elem
             ), updated_at = NOW()
             WHERE room_id = $1
               AND EXISTS (
                   SELECT 1 FROM jsonb_array_elements(shapes) AS e
                   WHERE e->>'id' = $2
               )",
        )
        .bind(room_id)
        .bind(shape_id)
        .bind(x)
        .bind(y)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Last-writer-wins overwrite of the raster snapshot. Does not touch the
    /// stroke/shape logs.
    pub async fn replace_snapshot(
        pool: &PgPool,
        room_id: &str,
        snapshot: &str,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE canvas_sessions
             SET snapshot = $2, updated_at = NOW()
             WHERE room_id = $1",
        )
        .bind(room_id)
        .bind(snapshot)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
