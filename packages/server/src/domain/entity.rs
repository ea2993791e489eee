//! Entities

use std::collections::HashSet;

use super::{
    shape::created_at_millis_of,
    value_object::{RoomId, ShapeId, UserId},
};

/// 接続中のセッション（1 接続 = 1 セッション）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    /// 認証済みユーザー（接続中は変わらない）
    pub user_id: UserId,
    /// 参加中のルーム（順序は持たない）
    pub rooms: HashSet<RoomId>,
    /// 接続時刻（Unix ミリ秒）
    pub connected_at: i64,
}

impl Session {
    pub fn new(user_id: UserId, connected_at: i64) -> Self {
        Self {
            user_id,
            rooms: HashSet::new(),
            connected_at,
        }
    }

    pub fn is_member(&self, room_id: &RoomId) -> bool {
        self.rooms.contains(room_id)
    }
}

/// これから保存する図形イベント
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewShapeEvent {
    pub room_id: RoomId,
    pub user_id: UserId,
    pub shape_id: ShapeId,
    /// `chat` メッセージの `message`（そのまま保存する）
    pub message: String,
}

/// 保存済みの図形イベント
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShapeEvent {
    /// ストアが採番する ID（挿入順に単調増加）
    pub id: i64,
    pub room_id: RoomId,
    pub user_id: UserId,
    pub shape_id: ShapeId,
    pub message: String,
}

impl ShapeEvent {
    pub fn from_new(id: i64, event: NewShapeEvent) -> Self {
        Self {
            id,
            room_id: event.room_id,
            user_id: event.user_id,
            shape_id: event.shape_id,
            message: event.message,
        }
    }

    /// 図形の `createdAt`（エポックミリ秒）
    pub fn created_at_millis(&self) -> Option<i64> {
        created_at_millis_of(&self.message)
    }
}

/// 履歴を再生順（`createdAt` 昇順）に並べ替える
///
/// 挿入順と `createdAt` はネットワーク越しの到着順によってずれることがある。
/// `createdAt` が同じ、または解釈できないイベントは挿入順を保つ。
pub fn sort_for_replay(events: &mut [ShapeEvent]) {
    events.sort_by_key(|event| (event.created_at_millis(), event.id));
}
