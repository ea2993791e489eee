//! Conversion logic between DTOs and domain values.

use crate::domain::{RoomId, ShapeEvent, ShapeId, ValueObjectError};
use crate::infrastructure::dto::{http, websocket as dto};

// ========================================
// DTO → Domain
// ========================================

impl TryFrom<dto::WireRoomId> for RoomId {
    type Error = ValueObjectError;

    fn try_from(value: dto::WireRoomId) -> Result<Self, Self::Error> {
        match value {
            dto::WireRoomId::Text(text) => RoomId::new(text),
            dto::WireRoomId::Number(number) => Ok(RoomId::from_number(number)),
        }
    }
}

// ========================================
// Domain → DTO
// ========================================

impl From<ShapeEvent> for http::ShapeEventDto {
    fn from(event: ShapeEvent) -> Self {
        Self {
            id: event.id,
            room_id: event.room_id.into_string(),
            user_id: event.user_id.into_string(),
            shape_id: event.shape_id.into_string(),
            message: event.message,
        }
    }
}

impl dto::ChatBroadcast {
    pub fn new(room_id: &RoomId, message: String) -> Self {
        Self {
            r#type: dto::MessageType::Chat,
            message,
            room_id: room_id.as_str().to_string(),
        }
    }
}

impl dto::DeletedBroadcast {
    pub fn new(room_id: &RoomId, shape_ids: &[ShapeId]) -> Self {
        Self {
            r#type: dto::MessageType::Deleted,
            message: shape_ids
                .iter()
                .map(|id| id.as_str().to_string())
                .collect(),
            room_id: room_id.as_str().to_string(),
        }
    }
}
