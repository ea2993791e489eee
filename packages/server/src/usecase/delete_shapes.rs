//! UseCase: 図形の削除（deleted）

use std::sync::Arc;

use crate::domain::{ConnectionId, MessagePusher, RoomId, SessionRegistry, ShapeId, ShapeStore};

use super::{broadcast_targets::other_members, error::DeleteShapesError};

/// 削除結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeletedShapes {
    /// ストアから削除された行数
    pub removed: u64,
    /// ブロードキャスト対象
    pub targets: Vec<ConnectionId>,
}

/// 図形削除のユースケース
pub struct DeleteShapesUseCase {
    registry: Arc<dyn SessionRegistry>,
    store: Arc<dyn ShapeStore>,
    message_pusher: Arc<dyn MessagePusher>,
}

impl DeleteShapesUseCase {
    pub fn new(
        registry: Arc<dyn SessionRegistry>,
        store: Arc<dyn ShapeStore>,
        message_pusher: Arc<dyn MessagePusher>,
    ) -> Self {
        Self {
            registry,
            store,
            message_pusher,
        }
    }

    /// 図形削除を実行
    ///
    /// 削除はルームをまたいで図形 ID 単位で行われる。ブロードキャストは
    /// 削除が完了した後に、送信者以外のルーム参加者にだけ送られる。
    /// 削除対象が空の場合は何もしない。
    pub async fn execute(
        &self,
        sender: &ConnectionId,
        room_id: &RoomId,
        shape_ids: &[ShapeId],
        broadcast_json: &str,
    ) -> Result<DeletedShapes, DeleteShapesError> {
        if !self.registry.is_member(sender, room_id).await {
            return Err(DeleteShapesError::NotAMember(room_id.to_string()));
        }
        if shape_ids.is_empty() {
            return Err(DeleteShapesError::EmptySelection);
        }

        let removed = self.store.delete_by_shape_ids(shape_ids).await?;
        tracing::debug!(
            "Deleted {} event(s) for {} shape(s) requested in room '{}'",
            removed,
            shape_ids.len(),
            room_id
        );

        let targets = other_members(self.registry.as_ref(), room_id, sender).await;
        if !targets.is_empty() {
            self.message_pusher
                .broadcast(targets.clone(), broadcast_json)
                .await;
        }

        Ok(DeletedShapes { removed, targets })
    }
}
