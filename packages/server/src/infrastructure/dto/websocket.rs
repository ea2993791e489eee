//! WebSocket message DTOs.
//!
//! Inbound messages form a closed tagged union on the `type` field. A message
//! with any other tag decodes to [`InboundMessage::Unknown`].

use serde::{Deserialize, Serialize};

/// Room id as it appears on the wire (a JSON string or integer).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum WireRoomId {
    Text(String),
    Number(i64),
}

/// Messages sent by clients.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type")]
pub enum InboundMessage {
    #[serde(rename = "join_room")]
    JoinRoom {
        #[serde(rename = "roomId")]
        room_id: WireRoomId,
    },
    #[serde(rename = "leave_room")]
    LeaveRoom {
        #[serde(rename = "roomId")]
        room_id: WireRoomId,
    },
    #[serde(rename = "mouse-move")]
    MouseMove(MouseMoveMessage),
    /// Shape creation. `message` is a JSON string encoding `{shape: ...}`.
    #[serde(rename = "chat")]
    Chat {
        #[serde(rename = "roomId")]
        room_id: WireRoomId,
        message: String,
    },
    /// Shape deletion. `message` is a JSON string encoding `{deletedShape: [...]}`.
    #[serde(rename = "deleted")]
    Deleted {
        #[serde(rename = "roomId")]
        room_id: WireRoomId,
        message: String,
    },
    #[serde(other)]
    Unknown,
}

/// Cursor position of a peer. Relayed verbatim, never persisted.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MouseMoveMessage {
    #[serde(rename = "userId")]
    pub user_id: Option<String>,
    pub username: Option<String>,
    #[serde(rename = "roomId")]
    pub room_id: WireRoomId,
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageType {
    Chat,
    Deleted,
}

/// `chat` as broadcast to peers. `message` is passed through unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatBroadcast {
    pub r#type: MessageType,
    pub message: String,
    #[serde(rename = "roomId")]
    pub room_id: String,
}

/// `deleted` as broadcast to peers. Carries bare shape ids, unlike the inbound form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeletedBroadcast {
    pub r#type: MessageType,
    pub message: Vec<String>,
    #[serde(rename = "roomId")]
    pub room_id: String,
}

/// Query parameters for the WebSocket handshake.
#[derive(Debug, Default, Deserialize)]
pub struct ConnectQuery {
    #[serde(default)]
    pub token: String,
}
