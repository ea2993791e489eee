//! UseCase: 切断処理
//!
//! 切断された接続をレジストリと MessagePusher の両方から取り除く。
//! 取り除いた後は、どのルームのブロードキャスト対象にもならない。

use std::sync::Arc;

use crate::domain::{ConnectionId, MessagePusher, Session, SessionRegistry};

use super::error::DisconnectError;

/// 切断のユースケース
pub struct DisconnectSessionUseCase {
    registry: Arc<dyn SessionRegistry>,
    message_pusher: Arc<dyn MessagePusher>,
}

impl DisconnectSessionUseCase {
    pub fn new(
        registry: Arc<dyn SessionRegistry>,
        message_pusher: Arc<dyn MessagePusher>,
    ) -> Self {
        Self {
            registry,
            message_pusher,
        }
    }

    /// 切断を実行し、取り除いたセッションを返す
    pub async fn execute(
        &self,
        connection_id: &ConnectionId,
    ) -> Result<Session, DisconnectError> {
        // 1. レジストリから削除（以降のブロードキャスト対象から外れる）
        let session = self.registry.remove(connection_id).await;

        // 2. 送信チャンネルを登録解除（レジストリに無くても解除する）
        self.message_pusher.unregister_client(connection_id).await;

        session.ok_or_else(|| DisconnectError::SessionNotFound(connection_id.to_string()))
    }
}
