//! UseCase: ルームの図形履歴の取得

use std::sync::Arc;

use crate::domain::{RoomId, ShapeEvent, ShapeStore, sort_for_replay};

use super::error::HistoryError;

/// 履歴として返すイベント数の既定値
pub const DEFAULT_HISTORY_LIMIT: usize = 50;

/// 図形履歴取得のユースケース
///
/// 遅れて参加したクライアントがキャンバスを再構築するために使う。
/// ルームの参加チェックは行わない。
pub struct GetShapeHistoryUseCase {
    store: Arc<dyn ShapeStore>,
    limit: usize,
}

impl GetShapeHistoryUseCase {
    pub fn new(store: Arc<dyn ShapeStore>, limit: usize) -> Self {
        Self { store, limit }
    }

    /// 新しい順に最大 `limit` 件を取得し、再生順（`createdAt` 昇順）に並べて返す
    pub async fn execute(&self, room_id: &RoomId) -> Result<Vec<ShapeEvent>, HistoryError> {
        let mut events = self.store.fetch_recent(room_id, self.limit).await?;
        sort_for_replay(&mut events);
        Ok(events)
    }
}
