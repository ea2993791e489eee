//! UseCase: ルームへの参加・退出（join_room / leave_room）
//!
//! 参加状況は接続ごとに持ち、サーバー側にルームの実体は作らない。
//! ブロードキャストは行わない。

use std::sync::Arc;

use crate::domain::{ConnectionId, RoomId, SessionRegistry};

use super::error::RoomMembershipError;

/// ルーム参加・退出のユースケース
pub struct RoomMembershipUseCase {
    registry: Arc<dyn SessionRegistry>,
}

impl RoomMembershipUseCase {
    pub fn new(registry: Arc<dyn SessionRegistry>) -> Self {
        Self { registry }
    }

    /// ルームに参加する（参加済みなら何もしない）
    pub async fn join(
        &self,
        connection_id: &ConnectionId,
        room_id: RoomId,
    ) -> Result<(), RoomMembershipError> {
        Ok(self.registry.join_room(connection_id, room_id).await?)
    }

    /// ルームから退出する（接続は閉じない）
    pub async fn leave(
        &self,
        connection_id: &ConnectionId,
        room_id: &RoomId,
    ) -> Result<(), RoomMembershipError> {
        Ok(self.registry.leave_room(connection_id, room_id).await?)
    }
}
