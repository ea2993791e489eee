//! UseCase: カーソル位置の中継（mouse-move）
//!
//! 受け取ったメッセージをそのまま、同じルームの他の参加者へ送る。
//! 永続化はせず、配信も保証しない。

use std::sync::Arc;

use crate::domain::{ConnectionId, MessagePusher, RoomId, SessionRegistry};

use super::broadcast_targets::other_members;

/// カーソル中継のユースケース
pub struct RelayCursorUseCase {
    registry: Arc<dyn SessionRegistry>,
    message_pusher: Arc<dyn MessagePusher>,
}

impl RelayCursorUseCase {
    pub fn new(
        registry: Arc<dyn SessionRegistry>,
        message_pusher: Arc<dyn MessagePusher>,
    ) -> Self {
        Self {
            registry,
            message_pusher,
        }
    }

    /// カーソル位置を中継し、送信できた宛先の数を返す
    ///
    /// # Arguments
    ///
    /// * `sender` - 送信元の接続
    /// * `room_id` - 宛先のルーム
    /// * `raw_message` - 受信したメッセージ（そのまま転送する）
    pub async fn execute(
        &self,
        sender: &ConnectionId,
        room_id: &RoomId,
        raw_message: &str,
    ) -> usize {
        let targets = other_members(self.registry.as_ref(), room_id, sender).await;
        if targets.is_empty() {
            return 0;
        }
        self.message_pusher.broadcast(targets, raw_message).await
    }
}
