//! UseCase: 接続処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - ConnectSessionUseCase::authenticate() / execute() メソッド
//!
//! ### なぜこのテストが必要か
//! - 認証に失敗した接続がレジストリに登録されないことを保証
//! - 登録された接続がメッセージを受け取れることを確認
//!
//! ### どのような状況を想定しているか
//! - 正常系：認証成功と登録
//! - 異常系：不正なトークン、空のトークン

use std::sync::Arc;

use sketchroom_shared::time::Clock;

use crate::domain::{
    AuthError, ConnectionId, MessagePusher, PusherChannel, SessionRegistry, TokenVerifier, UserId,
};

use super::error::ConnectError;

/// 接続のユースケース
pub struct ConnectSessionUseCase {
    /// TokenVerifier（認証の抽象化）
    verifier: Arc<dyn TokenVerifier>,
    /// SessionRegistry（接続とルーム参加状況）
    registry: Arc<dyn SessionRegistry>,
    /// MessagePusher（メッセージ通知の抽象化）
    message_pusher: Arc<dyn MessagePusher>,
    clock: Arc<dyn Clock>,
}

impl ConnectSessionUseCase {
    pub fn new(
        verifier: Arc<dyn TokenVerifier>,
        registry: Arc<dyn SessionRegistry>,
        message_pusher: Arc<dyn MessagePusher>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            verifier,
            registry,
            message_pusher,
            clock,
        }
    }

    /// ハンドシェイクのトークンを検証する
    ///
    /// ここではレジストリに何も登録しない。
    pub fn authenticate(&self, token: &str) -> Result<UserId, AuthError> {
        self.verifier.verify(token)
    }

    /// 認証済みの接続を登録する
    ///
    /// # Arguments
    ///
    /// * `user_id` - 認証済みユーザー
    /// * `sender` - この接続へのメッセージ送信用チャンネル
    ///
    /// # Returns
    ///
    /// * `Ok(ConnectionId)` - 割り当てた接続 ID
    /// * `Err(ConnectError)` - 登録失敗
    pub async fn execute(
        &self,
        user_id: UserId,
        sender: PusherChannel,
    ) -> Result<ConnectionId, ConnectError> {
        let connection_id = ConnectionId::generate();
        let connected_at = self.clock.now_millis();

        // 1. レジストリに登録
        self.registry
            .add(connection_id, user_id, connected_at)
            .await?;

        // 2. MessagePusher に送信チャンネルを登録
        self.message_pusher
            .register_client(connection_id, sender)
            .await;

        Ok(connection_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::{
        message_pusher::WebSocketMessagePusher, repository::InMemorySessionRegistry,
    };
    use sketchroom_shared::time::FixedClock;

    struct StaticVerifier;

    impl TokenVerifier for StaticVerifier {
        fn verify(&self, token: &str) -> Result<UserId, AuthError> {
            match token {
                "" => Err(AuthError::MissingToken),
                "good" => Ok(UserId::new("alice".to_string()).unwrap()),
                other => Err(AuthError::InvalidToken(other.to_string())),
            }
        }
    }

    fn create_usecase() -> (
        ConnectSessionUseCase,
        Arc<InMemorySessionRegistry>,
        Arc<WebSocketMessagePusher>,
    ) {
        let registry = Arc::new(InMemorySessionRegistry::new());
        let pusher = Arc::new(WebSocketMessagePusher::new());
        let usecase = ConnectSessionUseCase::new(
            Arc::new(StaticVerifier),
            registry.clone(),
            pusher.clone(),
            Arc::new(FixedClock::new(1000)),
        );
        (usecase, registry, pusher)
    }

    #[tokio::test]
    async fn test_connect_registers_session_and_channel() {
        // テスト項目: 認証済みの接続がレジストリと MessagePusher に登録される
        // given (前提条件):
        let (usecase, registry, pusher) = create_usecase();
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();

        // when (操作):
        let user_id = usecase.authenticate("good").unwrap();
        let connection_id = usecase.execute(user_id.clone(), tx).await.unwrap();

        // then (期待する結果):
        assert_eq!(registry.count_sessions().await, 1);
        assert_eq!(registry.user_of(&connection_id).await, Some(user_id));
        pusher.push_to(&connection_id, "ping").await.unwrap();
        assert_eq!(rx.recv().await, Some("ping".to_string()));
    }

    #[tokio::test]
    async fn test_authenticate_invalid_token_registers_nothing() {
        // テスト項目: 認証に失敗した場合はレジストリに何も登録されない
        // given (前提条件):
        let (usecase, registry, _pusher) = create_usecase();

        // when (操作):
        let invalid = usecase.authenticate("forged");
        let missing = usecase.authenticate("");

        // then (期待する結果):
        assert_eq!(invalid, Err(AuthError::InvalidToken("forged".to_string())));
        assert_eq!(missing, Err(AuthError::MissingToken));
        assert_eq!(registry.count_sessions().await, 0);
    }

    #[tokio::test]
    async fn test_connect_same_user_twice() {
        // テスト項目: 同じユーザーの複数接続はそれぞれ別のセッションになる
        // given (前提条件):
        let (usecase, registry, _pusher) = create_usecase();
        let user_id = usecase.authenticate("good").unwrap();
        let (tx1, _rx1) = tokio::sync::mpsc::unbounded_channel();
        let (tx2, _rx2) = tokio::sync::mpsc::unbounded_channel();

        // when (操作):
        let first = usecase.execute(user_id.clone(), tx1).await.unwrap();
        let second = usecase.execute(user_id, tx2).await.unwrap();

        // then (期待する結果):
        assert_ne!(first, second);
        assert_eq!(registry.count_sessions().await, 2);
    }
}
