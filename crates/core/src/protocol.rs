//! WebSocket wire protocol.
//!
//! Every frame is a JSON object `{"event": "<kebab-case name>", "data": ...}`.
//! Inbound and outbound events are explicit tagged unions so dispatch is a
//! single typed `match` instead of string-keyed handler lookup.
//!
//! Signaling payloads (`signal` fields) are opaque: the coordinator relays
//! them verbatim between peers and never inspects their contents.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::canvas::{Shape, Stroke};
use crate::identity::PresenceEntry;
use crate::types::{ConnectionId, RoomId};

/// Events a client sends to the coordinator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "kebab-case")]
pub enum ClientEvent {
    #[serde(rename_all = "camelCase")]
    JoinRoom { room_id: RoomId },

    #[serde(rename_all = "camelCase")]
    DrawStroke { room_id: RoomId, stroke: Stroke },

    #[serde(rename_all = "camelCase")]
    DrawShape { room_id: RoomId, shape: Shape },

    /// Reposition a shape, addressed by its stable id.
    #[serde(rename_all = "camelCase")]
    MoveShape {
        room_id: RoomId,
        shape_id: String,
        x: f64,
        y: f64,
    },

    #[serde(rename_all = "camelCase")]
    CursorMove { room_id: RoomId, x: f64, y: f64 },

    #[serde(rename_all = "camelCase")]
    StartDraw { room_id: RoomId },

    #[serde(rename_all = "camelCase")]
    StopDraw { room_id: RoomId },

    /// Client-supplied timestamp (epoch milliseconds), echoed back verbatim.
    #[serde(rename_all = "camelCase")]
    SendChatMessage {
        room_id: RoomId,
        text: String,
        timestamp: i64,
    },

    #[serde(rename_all = "camelCase")]
    SaveSnapshot {
        room_id: RoomId,
        snapshot_base64: String,
    },

    #[serde(rename_all = "camelCase")]
    JoinVideoRoom { room_id: RoomId },

    #[serde(rename_all = "camelCase")]
    LeaveVideoRoom { room_id: RoomId },

    /// Offer half of the signaling handshake, relayed to `target` as
    /// `user-joined`.
    #[serde(rename_all = "camelCase")]
    SendingSignal { target: ConnectionId, signal: Value },

    /// Answer half, relayed to `target` as `receiving-returned-signal`.
    #[serde(rename_all = "camelCase")]
    ReturningSignal { target: ConnectionId, signal: Value },
}

/// A video call participant, as listed in the `all-users` reply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoPeer {
    pub connection_id: ConnectionId,
    pub name: String,
}

/// Events the coordinator sends to clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "kebab-case")]
pub enum ServerEvent {
    /// Reply to `join-room`: the full persisted drawing log plus the latest
    /// raster snapshot, if any.
    #[serde(rename_all = "camelCase")]
    LoadCanvas {
        strokes: Vec<Stroke>,
        shapes: Vec<Shape>,
        snapshot: Option<String>,
    },

    /// Full roster of a room, broadcast after every membership change.
    Presence { users: Vec<PresenceEntry> },

    RemoteStroke(Stroke),

    RemoteShape(Shape),

    #[serde(rename_all = "camelCase")]
    ShapeMoved { shape_id: String, x: f64, y: f64 },

    #[serde(rename_all = "camelCase")]
    RemoteCursor {
        connection_id: ConnectionId,
        x: f64,
        y: f64,
        user: PresenceEntry,
    },

    #[serde(rename_all = "camelCase")]
    UserStartedDrawing {
        connection_id: ConnectionId,
        user: PresenceEntry,
    },

    #[serde(rename_all = "camelCase")]
    UserStoppedDrawing { connection_id: ConnectionId },

    ChatMessage {
        user: String,
        text: String,
        timestamp: i64,
    },

    /// Reply to `join-video-room`: everyone already announced in the call.
    AllUsers(Vec<VideoPeer>),

    /// A peer's offer, delivered to the signaled connection.
    #[serde(rename_all = "camelCase")]
    UserJoined { signal: Value, caller_id: ConnectionId },

    /// A peer's answer, delivered back to the original caller.
    #[serde(rename_all = "camelCase")]
    ReceivingReturnedSignal { signal: Value, id: ConnectionId },

    #[serde(rename_all = "camelCase")]
    UserLeft { connection_id: ConnectionId },

    /// A per-event failure surfaced to the acting connection only (e.g. the
    /// durable store rejected an append). Never broadcast.
    ServerError { context: String, message: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_inbound_event_names_are_kebab_case() {
        let event: ClientEvent = serde_json::from_value(json!({
            "event": "join-room",
            "data": { "roomId": "r1" }
        }))
        .unwrap();
        assert_eq!(
            event,
            ClientEvent::JoinRoom {
                room_id: "r1".into()
            }
        );
    }

    #[test]
    fn test_draw_stroke_payload() {
        let event: ClientEvent = serde_json::from_value(json!({
            "event": "draw-stroke",
            "data": {
                "roomId": "r1",
                "stroke": {
                    "tool": "brush",
                    "color": "#222",
                    "strokeWidth": 2,
                    "points": [0, 1, 2, 3]
                }
            }
        }))
        .unwrap();
        match event {
            ClientEvent::DrawStroke { room_id, stroke } => {
                assert_eq!(room_id, "r1");
                assert_eq!(stroke.points.len(), 4);
            }
            other => panic!("wrong variant: {other:?}"),
        }
    }

    #[test]
    fn test_signal_payload_is_opaque() {
        let target = ConnectionId::new_v4();
        // An SDP-ish blob the coordinator must not interpret.
        let blob = json!({ "type": "offer", "sdp": "v=0\r\no=- 46117 2 IN IP4 127.0.0.1" });
        let event: ClientEvent = serde_json::from_value(json!({
            "event": "sending-signal",
            "data": { "target": target, "signal": blob }
        }))
        .unwrap();
        match event {
            ClientEvent::SendingSignal { signal, .. } => assert_eq!(signal, blob),
            other => panic!("wrong variant: {other:?}"),
        }
    }

    #[test]
    fn test_remote_stroke_serializes_stroke_as_data() {
        let stroke = Stroke {
            tool: crate::canvas::StrokeTool::Brush,
            color: "#000".into(),
            stroke_width: 1.0,
            points: vec![1.0, 2.0],
            created_at: chrono::Utc::now(),
        };
        let json = serde_json::to_value(ServerEvent::RemoteStroke(stroke)).unwrap();
        assert_eq!(json["event"], "remote-stroke");
        // Newtype payload: the stroke object itself, not nested further.
        assert_eq!(json["data"]["strokeWidth"], 1.0);
    }

    #[test]
    fn test_server_event_names() {
        let json = serde_json::to_value(ServerEvent::UserStoppedDrawing {
            connection_id: ConnectionId::new_v4(),
        })
        .unwrap();
        assert_eq!(json["event"], "user-stopped-drawing");
        assert!(json["data"]["connectionId"].is_string());

        let json = serde_json::to_value(ServerEvent::ReceivingReturnedSignal {
            signal: json!(null),
            id: ConnectionId::new_v4(),
        })
        .unwrap();
        assert_eq!(json["event"], "receiving-returned-signal");
    }

    #[test]
    fn test_malformed_event_is_a_decode_error() {
        let result: Result<ClientEvent, _> = serde_json::from_value(json!({
            "event": "draw-stroke",
            "data": { "roomId": "r1" }
        }));
        assert!(result.is_err(), "missing stroke field must not decode");
    }
}
