//! Drawing vocabulary: strokes and shapes.
//!
//! Wire and storage representations are the same serde shape (camelCase
//! JSON), so a stroke received from a client is persisted verbatim and
//! replayed byte-for-byte to later joiners.

use serde::{Deserialize, Serialize};

use crate::types::Timestamp;

/// Freehand drawing tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StrokeTool {
    Brush,
    Eraser,
}

/// Shape tools. `Text` carries its content and font size in the shape's
/// optional fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeKind {
    Rectangle,
    Circle,
    Triangle,
    Star,
    Line,
    Arrow,
    Text,
}

/// One continuous freehand gesture. Append-only once committed to a room's
/// drawing log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stroke {
    pub tool: StrokeTool,
    pub color: String,
    pub stroke_width: f64,
    /// Flattened coordinate pairs: `[x0, y0, x1, y1, ...]`.
    pub points: Vec<f64>,
    #[serde(default = "chrono::Utc::now")]
    pub created_at: Timestamp,
}

/// A placed shape. Geometry fields are per-kind: rectangles use
/// width/height, lines and arrows use end_x/end_y, text uses text/font_size.
///
/// The `id` is a client-generated stable identifier; move operations address
/// shapes by it, never by position in the log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Shape {
    pub id: String,
    pub tool: ShapeKind,
    pub color: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fill_color: Option<String>,
    pub x: f64,
    pub y: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_x: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_y: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_size: Option<f64>,
    #[serde(default = "chrono::Utc::now")]
    pub created_at: Timestamp,
}
