//! HTTP API response DTOs.

use serde::{Deserialize, Serialize};

/// One persisted shape event, as returned by `GET /chats/{room_id}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShapeEventDto {
    pub id: i64,
    pub room_id: String,
    pub user_id: String,
    pub shape_id: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponseDto {
    pub message: String,
}
