//! HTTP API endpoint handlers.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

use crate::{
    domain::RoomId,
    infrastructure::dto::http::{ErrorResponseDto, ShapeEventDto},
    ui::state::AppState,
};

type ErrorResponse = (StatusCode, Json<ErrorResponseDto>);

fn error_response(status: StatusCode, message: impl Into<String>) -> ErrorResponse {
    (
        status,
        Json(ErrorResponseDto {
            message: message.into(),
        }),
    )
}

/// Health check endpoint
pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}

/// ルームの図形履歴（再生順）
///
/// 参加チェックは行わない。履歴を読むのに WebSocket 接続は不要。
pub async fn get_chats(
    State(state): State<Arc<AppState>>,
    Path(room_id): Path<String>,
) -> Result<Json<Vec<ShapeEventDto>>, ErrorResponse> {
    let room_id = RoomId::new(room_id).map_err(|e| {
        tracing::warn!("Rejected history request: {}", e);
        error_response(StatusCode::BAD_REQUEST, e.to_string())
    })?;

    match state.get_shape_history_usecase.execute(&room_id).await {
        Ok(events) => {
            tracing::debug!(
                "Returning {} event(s) of room '{}'",
                events.len(),
                room_id
            );
            // Domain Model から DTO への変換
            Ok(Json(events.into_iter().map(ShapeEventDto::from).collect()))
        }
        Err(e) => {
            tracing::error!("Failed to fetch history of room '{}': {}", room_id, e);
            Err(error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "failed to fetch chats",
            ))
        }
    }
}
