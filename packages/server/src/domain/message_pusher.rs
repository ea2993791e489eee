//! MessagePusher trait 定義
//!
//! 接続中のクライアントへメッセージを届けるためのインターフェース。
//! 具体的な実装（WebSocket など）は Infrastructure 層が提供します。

use async_trait::async_trait;
use tokio::sync::mpsc;

use super::{error::MessagePushError, value_object::ConnectionId};

/// クライアントへの送信チャンネル
pub type PusherChannel = mpsc::UnboundedSender<String>;

/// メッセージ通知の抽象化
#[async_trait]
pub trait MessagePusher: Send + Sync {
    /// クライアントの送信チャンネルを登録
    async fn register_client(&self, connection_id: ConnectionId, sender: PusherChannel);

    /// クライアントの送信チャンネルを登録解除
    async fn unregister_client(&self, connection_id: &ConnectionId);

    /// 特定のクライアントに送信
    async fn push_to(
        &self,
        connection_id: &ConnectionId,
        content: &str,
    ) -> Result<(), MessagePushError>;

    /// 複数のクライアントに送信
    ///
    /// 個々の送信失敗はログに残して次の宛先へ進む（全体としては失敗しない）。
    /// 送信できた宛先の数を返す。
    async fn broadcast(&self, targets: Vec<ConnectionId>, content: &str) -> usize;
}
