//! InMemory Shape Store 実装
//!
//! 図形イベントを挿入順の `Vec` に保持します。データベースが設定されていない場合と
//! テストで使われ、プロセス終了とともに内容は失われます。

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{NewShapeEvent, RoomId, ShapeEvent, ShapeId, ShapeStore, StoreError};

#[derive(Default)]
struct Log {
    events: Vec<ShapeEvent>,
    next_id: i64,
}

/// インメモリ Shape Store 実装
#[derive(Default)]
pub struct InMemoryShapeStore {
    log: Mutex<Log>,
}

impl InMemoryShapeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 保存されているイベント数
    pub async fn len(&self) -> usize {
        self.log.lock().await.events.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl ShapeStore for InMemoryShapeStore {
    async fn append(&self, event: NewShapeEvent) -> Result<ShapeEvent, StoreError> {
        let mut log = self.log.lock().await;
        log.next_id += 1;
        let stored = ShapeEvent::from_new(log.next_id, event);
        log.events.push(stored.clone());
        Ok(stored)
    }

    async fn delete_by_shape_ids(&self, shape_ids: &[ShapeId]) -> Result<u64, StoreError> {
        let mut log = self.log.lock().await;
        let before = log.events.len();
        log.events.retain(|event| !shape_ids.contains(&event.shape_id));
        Ok((before - log.events.len()) as u64)
    }

    async fn fetch_recent(
        &self,
        room_id: &RoomId,
        limit: usize,
    ) -> Result<Vec<ShapeEvent>, StoreError> {
        let log = self.log.lock().await;
        Ok(log
            .events
            .iter()
            .rev()
            .filter(|event| &event.room_id == room_id)
            .take(limit)
            .cloned()
            .collect())
    }
}
