//! ブロードキャスト対象の選定

use crate::domain::{ConnectionId, RoomId, SessionRegistry};

/// ルームの参加者のうち、送信者以外の接続を返す
///
/// 送信者はローカルに状態を持っているため、自分の操作のエコーは返さない。
pub(crate) async fn other_members(
    registry: &dyn SessionRegistry,
    room_id: &RoomId,
    sender: &ConnectionId,
) -> Vec<ConnectionId> {
    registry
        .members_of(room_id)
        .await
        .into_iter()
        .filter(|id| id != sender)
        .collect()
}
