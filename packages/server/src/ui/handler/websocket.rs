//! WebSocket connection handlers.

use std::sync::Arc;

use axum::{
    extract::{
        Query, State,
        rejection::QueryRejection,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    http::StatusCode,
    response::IntoResponse,
};
use futures_util::{
    sink::SinkExt,
    stream::{SplitSink, StreamExt},
};
use tokio::sync::mpsc;

use crate::{
    domain::{ConnectionId, RoomId, UserId, parse_deleted_shapes, parse_shape_message},
    infrastructure::dto::websocket::{
        ChatBroadcast, ConnectQuery, DeletedBroadcast, InboundMessage, WireRoomId,
    },
    ui::state::AppState,
    usecase::{CreateShapeError, DeleteShapesError},
};

/// `/ws?token=...`
///
/// トークンはアップグレード前に検証し、失敗した場合は 401 を返す。
/// クエリ文字列が解釈できない場合も認証失敗として扱う。
/// 接続の登録はアップグレード後のタスクの中で行う。
pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
    query: Result<Query<ConnectQuery>, QueryRejection>,
) -> Result<impl IntoResponse, StatusCode> {
    let Query(query) = query.map_err(|e| {
        tracing::warn!("Rejected WebSocket handshake: malformed query: {}", e);
        StatusCode::UNAUTHORIZED
    })?;

    let user_id = match state.connect_session_usecase.authenticate(&query.token) {
        Ok(user_id) => user_id,
        Err(e) => {
            tracing::warn!("Rejected WebSocket handshake: {}", e);
            return Err(StatusCode::UNAUTHORIZED);
        }
    };

    Ok(ws.on_upgrade(move |socket| handle_socket(socket, state, user_id)))
}

/// Spawns a task that forwards messages queued for this connection to its socket.
///
/// The task ends when the channel is closed or the socket write fails.
fn pusher_loop(
    mut rx: mpsc::UnboundedReceiver<String>,
    mut sender: SplitSink<WebSocket, Message>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if sender.send(Message::Text(msg.into())).await.is_err() {
                break;
            }
        }
    })
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>, user_id: UserId) {
    let (tx, rx) = mpsc::unbounded_channel();

    let connection_id = match state
        .connect_session_usecase
        .execute(user_id.clone(), tx)
        .await
    {
        Ok(connection_id) => connection_id,
        Err(e) => {
            tracing::error!("Failed to register connection of user '{}': {}", user_id, e);
            return;
        }
    };
    tracing::info!("User '{}' connected as '{}'", user_id, connection_id);

    let (sender, mut receiver) = socket.split();
    let state_clone = state.clone();

    // このクライアントからのメッセージは 1 件ずつ順番に処理する
    let mut recv_task = tokio::spawn(async move {
        while let Some(msg) = receiver.next().await {
            let msg = match msg {
                Ok(msg) => msg,
                Err(e) => {
                    tracing::warn!("WebSocket error on '{}': {}", connection_id, e);
                    break;
                }
            };

            match msg {
                Message::Text(text) => dispatch(&state_clone, &connection_id, text.as_str()).await,
                Message::Close(_) => {
                    tracing::info!("Connection '{}' requested close", connection_id);
                    break;
                }
                _ => {}
            }
        }
    });

    let mut send_task = pusher_loop(rx, sender);

    let send_finished_first = tokio::select! {
        _ = &mut recv_task => false,
        _ = &mut send_task => true,
    };
    if send_finished_first {
        // 書き込み中のストア操作を中断しないよう、受信側は abort せず終了を待つ
        if let Err(e) = recv_task.await {
            tracing::error!("Receive task of '{}' failed: {}", connection_id, e);
        }
    } else {
        send_task.abort();
    }

    match state
        .disconnect_session_usecase
        .execute(&connection_id)
        .await
    {
        Ok(session) => tracing::info!(
            "User '{}' disconnected ('{}', {} room(s) left)",
            session.user_id,
            connection_id,
            session.rooms.len()
        ),
        Err(e) => tracing::warn!("Failed to disconnect '{}': {}", connection_id, e),
    }
}

fn to_room_id(room_id: WireRoomId, connection_id: &ConnectionId) -> Option<RoomId> {
    match RoomId::try_from(room_id) {
        Ok(room_id) => Some(room_id),
        Err(e) => {
            tracing::warn!("Dropping message from '{}': {}", connection_id, e);
            None
        }
    }
}

/// 受信したテキストを解釈して対応するユースケースに振り分ける
///
/// どの失敗もクライアントには返さず、ログに残して破棄する。
async fn dispatch(state: &AppState, connection_id: &ConnectionId, text: &str) {
    let inbound = match serde_json::from_str::<InboundMessage>(text) {
        Ok(inbound) => inbound,
        Err(e) => {
            tracing::warn!("Dropping malformed message from '{}': {}", connection_id, e);
            return;
        }
    };

    match inbound {
        InboundMessage::JoinRoom { room_id } => {
            let Some(room_id) = to_room_id(room_id, connection_id) else {
                return;
            };
            match state
                .room_membership_usecase
                .join(connection_id, room_id.clone())
                .await
            {
                Ok(()) => tracing::info!("'{}' joined room '{}'", connection_id, room_id),
                Err(e) => tracing::warn!("join_room failed for '{}': {}", connection_id, e),
            }
        }
        InboundMessage::LeaveRoom { room_id } => {
            let Some(room_id) = to_room_id(room_id, connection_id) else {
                return;
            };
            match state
                .room_membership_usecase
                .leave(connection_id, &room_id)
                .await
            {
                Ok(()) => tracing::info!("'{}' left room '{}'", connection_id, room_id),
                Err(e) => tracing::warn!("leave_room failed for '{}': {}", connection_id, e),
            }
        }
        InboundMessage::MouseMove(cursor) => {
            let Some(room_id) = to_room_id(cursor.room_id, connection_id) else {
                return;
            };
            // 受信したテキストをそのまま中継する
            state
                .relay_cursor_usecase
                .execute(connection_id, &room_id, text)
                .await;
        }
        InboundMessage::Chat { room_id, message } => {
            let Some(room_id) = to_room_id(room_id, connection_id) else {
                return;
            };
            handle_chat(state, connection_id, room_id, message).await;
        }
        InboundMessage::Deleted { room_id, message } => {
            let Some(room_id) = to_room_id(room_id, connection_id) else {
                return;
            };
            handle_deleted(state, connection_id, room_id, &message).await;
        }
        InboundMessage::Unknown => {
            tracing::debug!("Ignoring message of unknown type from '{}'", connection_id);
        }
    }
}

async fn handle_chat(
    state: &AppState,
    connection_id: &ConnectionId,
    room_id: RoomId,
    message: String,
) {
    let shape = match parse_shape_message(&message) {
        Ok(shape) => shape,
        Err(e) => {
            tracing::warn!("Dropping chat from '{}': {}", connection_id, e);
            return;
        }
    };

    let broadcast_json = match serde_json::to_string(&ChatBroadcast::new(&room_id, message.clone()))
    {
        Ok(json) => json,
        Err(e) => {
            tracing::error!("Failed to encode chat broadcast: {}", e);
            return;
        }
    };

    match state
        .create_shape_usecase
        .execute(connection_id, &room_id, &shape, message, &broadcast_json)
        .await
    {
        Ok(targets) => tracing::debug!(
            "Shape '{}' from '{}' relayed to {} peer(s) in room '{}'",
            shape.shape_id(),
            connection_id,
            targets.len(),
            room_id
        ),
        Err(CreateShapeError::Store(e)) => {
            tracing::error!("Failed to store shape '{}': {}", shape.shape_id(), e);
        }
        Err(e) => tracing::warn!("Dropping chat from '{}': {}", connection_id, e),
    }
}

async fn handle_deleted(
    state: &AppState,
    connection_id: &ConnectionId,
    room_id: RoomId,
    message: &str,
) {
    let shape_ids = match parse_deleted_shapes(message) {
        Ok(shape_ids) => shape_ids,
        Err(e) => {
            tracing::warn!("Dropping deleted from '{}': {}", connection_id, e);
            return;
        }
    };

    let broadcast_json = match serde_json::to_string(&DeletedBroadcast::new(&room_id, &shape_ids))
    {
        Ok(json) => json,
        Err(e) => {
            tracing::error!("Failed to encode deleted broadcast: {}", e);
            return;
        }
    };

    match state
        .delete_shapes_usecase
        .execute(connection_id, &room_id, &shape_ids, &broadcast_json)
        .await
    {
        Ok(deleted) => tracing::debug!(
            "Deleted {} event(s) for '{}', notified {} peer(s) in room '{}'",
            deleted.removed,
            connection_id,
            deleted.targets.len(),
            room_id
        ),
        Err(DeleteShapesError::EmptySelection) => {
            tracing::debug!("Ignoring empty deletion from '{}'", connection_id);
        }
        Err(DeleteShapesError::Store(e)) => {
            tracing::error!("Failed to delete shapes: {}", e);
        }
        Err(e) => tracing::warn!("Dropping deleted from '{}': {}", connection_id, e),
    }
}
