//! UseCase: 図形の作成（chat）
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - CreateShapeUseCase::execute() メソッド
//! - 参加チェック → 永続化 → ブロードキャストの順序
//!
//! ### なぜこのテストが必要か
//! - ルームに参加していない接続は書き込みも配信もできない（唯一の認可境界）
//! - 永続化される前に他の参加者が図形を見てはならない
//!   （遅れて参加したクライアントの履歴から欠けるため）
//! - 永続化に失敗した場合は何も配信しない
//!
//! ### どのような状況を想定しているか
//! - 正常系：保存と送信者以外へのブロードキャスト
//! - 異常系：未参加ルームへの書き込み、ストアの失敗
//! - エッジケース：送信者のみが参加しているルーム、書き込み中の送信者の切断

use std::sync::Arc;

use crate::domain::{
    ConnectionId, MessagePusher, NewShapeEvent, RoomId, SessionRegistry, Shape, ShapeStore,
};

use super::{broadcast_targets::other_members, error::CreateShapeError};

/// 図形作成のユースケース
pub struct CreateShapeUseCase {
    registry: Arc<dyn SessionRegistry>,
    store: Arc<dyn ShapeStore>,
    message_pusher: Arc<dyn MessagePusher>,
}

impl CreateShapeUseCase {
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

    /// 図形作成を実行
    ///
    /// # Arguments
    ///
    /// * `sender` - 送信元の接続
    /// * `room_id` - 図形を追加するルーム
    /// * `shape` - 解釈済みの図形（ID の取り出しに使う）
    /// * `message` - 受信した `message`（そのまま保存する）
    /// * `broadcast_json` - 他の参加者に送る JSON（DTO 層で生成されたもの）
    ///
    /// # Returns
    ///
    /// * `Ok(Vec<ConnectionId>)` - ブロードキャスト対象
    /// * `Err(CreateShapeError)` - 未参加、またはストアの失敗（何も配信されない）
    pub async fn execute(
        &self,
        sender: &ConnectionId,
        room_id: &RoomId,
        shape: &Shape,
        message: String,
        broadcast_json: &str,
    ) -> Result<Vec<ConnectionId>, CreateShapeError> {
        // 1. 送信者の参加チェック
        if !self.registry.is_member(sender, room_id).await {
            return Err(CreateShapeError::NotAMember(room_id.to_string()));
        }
        let user_id = self
            .registry
            .user_of(sender)
            .await
            .ok_or_else(|| CreateShapeError::SessionNotFound(sender.to_string()))?;

        // 2. 永続化（完了するまで配信しない）
        let stored = self
            .store
            .append(NewShapeEvent {
                room_id: room_id.clone(),
                user_id,
                shape_id: shape.shape_id().clone(),
                message,
            })
            .await?;
        tracing::debug!(
            "Stored shape '{}' in room '{}' as event {}",
            stored.shape_id,
            stored.room_id,
            stored.id
        );

        // 3. 送信者以外の参加者にブロードキャスト
        let targets = other_members(self.registry.as_ref(), room_id, sender).await;
        if !targets.is_empty() {
            self.message_pusher
                .broadcast(targets.clone(), broadcast_json)
                .await;
        }

        Ok(targets)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::{
            MessagePushError, MockShapeStore, PusherChannel, ShapeEvent, ShapeId, StoreError,
            UserId, parse_shape_message,
        },
        infrastructure::{
            message_pusher::WebSocketMessagePusher,
            repository::{InMemorySessionRegistry, InMemoryShapeStore},
        },
    };
    use std::sync::Mutex as StdMutex;
    use tokio::sync::{Notify, mpsc};

    const MESSAGE: &str = r##"{"shape":{"type":"rect","x":0,"y":0,"width":10,"height":10,"strokeColor":"#000","backgroundColor":"#fff","fillStyle":"solid","strokeWidth":1,"opacity":1,"shapeId":"s1","createdAt":"1"}}"##;
    const BROADCAST: &str = r#"{"type":"chat","message":"...","roomId":"42"}"#;

    struct Fixture {
        registry: Arc<InMemorySessionRegistry>,
        pusher: Arc<WebSocketMessagePusher>,
        room: RoomId,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                registry: Arc::new(InMemorySessionRegistry::new()),
                pusher: Arc::new(WebSocketMessagePusher::new()),
                room: RoomId::new("42".to_string()).unwrap(),
            }
        }

        async fn connect(
            &self,
            name: &str,
            join: bool,
        ) -> (ConnectionId, mpsc::UnboundedReceiver<String>) {
            let id = ConnectionId::generate();
            let (tx, rx) = mpsc::unbounded_channel();
            self.registry
                .add(id, UserId::new(name.to_string()).unwrap(), 0)
                .await
                .unwrap();
            self.pusher.register_client(id, tx).await;
            if join {
                self.registry.join_room(&id, self.room.clone()).await.unwrap();
            }
            (id, rx)
        }
    }

    #[tokio::test]
    async fn test_create_shape_stores_and_broadcasts_to_others() {
        // テスト項目: 図形が保存され、送信者以外の参加者にだけ届く
        // given (前提条件):
        let fixture = Fixture::new();
        let store = Arc::new(InMemoryShapeStore::new());
        let usecase = CreateShapeUseCase::new(
            fixture.registry.clone(),
            store.clone(),
            fixture.pusher.clone(),
        );
        let (alice, mut alice_rx) = fixture.connect("alice", true).await;
        let (bob, mut bob_rx) = fixture.connect("bob", true).await;
        let (_outsider, mut outsider_rx) = fixture.connect("outsider", false).await;
        let shape = parse_shape_message(MESSAGE).unwrap();

        // when (操作):
        let result = usecase
            .execute(&alice, &fixture.room, &shape, MESSAGE.to_string(), BROADCAST)
            .await;

        // then (期待する結果):
        assert_eq!(result, Ok(vec![bob]));
        assert_eq!(bob_rx.recv().await, Some(BROADCAST.to_string()));
        assert!(alice_rx.try_recv().is_err());
        assert!(outsider_rx.try_recv().is_err());

        let events = store.fetch_recent(&fixture.room, 50).await.unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].shape_id.as_str(), "s1");
        assert_eq!(events[0].user_id.as_str(), "alice");
        assert_eq!(events[0].message, MESSAGE);
    }

    #[tokio::test]
    async fn test_create_shape_not_a_member() {
        // テスト項目: 未参加のルームへの書き込みは保存も配信もされない
        // given (前提条件):
        let fixture = Fixture::new();
        let mut store = MockShapeStore::new();
        store.expect_append().times(0);
        let usecase = CreateShapeUseCase::new(
            fixture.registry.clone(),
            Arc::new(store),
            fixture.pusher.clone(),
        );
        let (intruder, _intruder_rx) = fixture.connect("intruder", false).await;
        let (_bob, mut bob_rx) = fixture.connect("bob", true).await;
        let shape = parse_shape_message(MESSAGE).unwrap();

        // when (操作):
        let result = usecase
            .execute(&intruder, &fixture.room, &shape, MESSAGE.to_string(), BROADCAST)
            .await;

        // then (期待する結果):
        assert_eq!(result, Err(CreateShapeError::NotAMember("42".to_string())));
        assert!(bob_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_create_shape_store_failure_suppresses_broadcast() {
        // テスト項目: 保存に失敗した場合はブロードキャストされない
        // given (前提条件):
        let fixture = Fixture::new();
        let mut store = MockShapeStore::new();
        store
            .expect_append()
            .times(1)
            .returning(|_| Err(StoreError::Backend("disk full".to_string())));
        let usecase = CreateShapeUseCase::new(
            fixture.registry.clone(),
            Arc::new(store),
            fixture.pusher.clone(),
        );
        let (alice, _alice_rx) = fixture.connect("alice", true).await;
        let (_bob, mut bob_rx) = fixture.connect("bob", true).await;
        let shape = parse_shape_message(MESSAGE).unwrap();

        // when (操作):
        let result = usecase
            .execute(&alice, &fixture.room, &shape, MESSAGE.to_string(), BROADCAST)
            .await;

        // then (期待する結果):
        assert_eq!(
            result,
            Err(CreateShapeError::Store(StoreError::Backend(
                "disk full".to_string()
            )))
        );
        assert!(bob_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_create_shape_sender_alone_in_room() {
        // テスト項目: 送信者しかいないルームでも保存は行われる
        // given (前提条件):
        let fixture = Fixture::new();
        let store = Arc::new(InMemoryShapeStore::new());
        let usecase = CreateShapeUseCase::new(
            fixture.registry.clone(),
            store.clone(),
            fixture.pusher.clone(),
        );
        let (alice, mut alice_rx) = fixture.connect("alice", true).await;
        let shape = parse_shape_message(MESSAGE).unwrap();

        // when (操作):
        let result = usecase
            .execute(&alice, &fixture.room, &shape, MESSAGE.to_string(), BROADCAST)
            .await;

        // then (期待する結果):
        assert_eq!(result, Ok(vec![]));
        assert_eq!(store.len().await, 1);
        assert!(alice_rx.try_recv().is_err());
    }

    // 呼び出し順を記録する MessagePusher
    struct RecordingPusher {
        log: Arc<StdMutex<Vec<&'static str>>>,
    }

    #[async_trait::async_trait]
    impl MessagePusher for RecordingPusher {
        async fn register_client(&self, _connection_id: ConnectionId, _sender: PusherChannel) {}

        async fn unregister_client(&self, _connection_id: &ConnectionId) {}

        async fn push_to(
            &self,
            _connection_id: &ConnectionId,
            _content: &str,
        ) -> Result<(), MessagePushError> {
            Ok(())
        }

        async fn broadcast(&self, targets: Vec<ConnectionId>, _content: &str) -> usize {
            self.log.lock().unwrap().push("broadcast");
            targets.len()
        }
    }

    #[tokio::test]
    async fn test_create_shape_appends_before_broadcast() {
        // テスト項目: 永続化が完了してからブロードキャストされる
        // given (前提条件):
        let fixture = Fixture::new();
        let log = Arc::new(StdMutex::new(Vec::new()));

        let mut store = MockShapeStore::new();
        let store_log = log.clone();
        store.expect_append().times(1).returning(move |event| {
            store_log.lock().unwrap().push("append");
            Ok(ShapeEvent::from_new(1, event))
        });
        let pusher = Arc::new(RecordingPusher { log: log.clone() });
        let usecase = CreateShapeUseCase::new(fixture.registry.clone(), Arc::new(store), pusher);
        let (alice, _alice_rx) = fixture.connect("alice", true).await;
        let (_bob, _bob_rx) = fixture.connect("bob", true).await;
        let shape = parse_shape_message(MESSAGE).unwrap();

        // when (操作):
        usecase
            .execute(&alice, &fixture.room, &shape, MESSAGE.to_string(), BROADCAST)
            .await
            .unwrap();

        // then (期待する結果):
        assert_eq!(*log.lock().unwrap(), vec!["append", "broadcast"]);
    }

    // append の途中で止められる ShapeStore
    #[derive(Default)]
    struct GatedStore {
        inner: InMemoryShapeStore,
        started: Notify,
        release: Notify,
    }

    #[async_trait::async_trait]
    impl ShapeStore for GatedStore {
        async fn append(&self, event: NewShapeEvent) -> Result<ShapeEvent, StoreError> {
            self.started.notify_one();
            self.release.notified().await;
            self.inner.append(event).await
        }

        async fn delete_by_shape_ids(&self, shape_ids: &[ShapeId]) -> Result<u64, StoreError> {
            self.inner.delete_by_shape_ids(shape_ids).await
        }

        async fn fetch_recent(
            &self,
            room_id: &RoomId,
            limit: usize,
        ) -> Result<Vec<ShapeEvent>, StoreError> {
            self.inner.fetch_recent(room_id, limit).await
        }
    }

    #[tokio::test]
    async fn test_create_shape_completes_when_sender_disconnects_mid_write() {
        // テスト項目: 書き込み中に送信者が切断しても、保存とブロードキャストは完了する
        // given (前提条件):
        let fixture = Fixture::new();
        let store = Arc::new(GatedStore::default());
        let usecase = Arc::new(CreateShapeUseCase::new(
            fixture.registry.clone(),
            store.clone(),
            fixture.pusher.clone(),
        ));
        let (alice, _alice_rx) = fixture.connect("alice", true).await;
        let (bob, mut bob_rx) = fixture.connect("bob", true).await;
        let shape = parse_shape_message(MESSAGE).unwrap();

        let task = {
            let usecase = usecase.clone();
            let room = fixture.room.clone();
            tokio::spawn(async move {
                usecase
                    .execute(&alice, &room, &shape, MESSAGE.to_string(), BROADCAST)
                    .await
            })
        };
        store.started.notified().await;

        // when (操作): append の途中で送信者の接続が消える
        fixture.registry.remove(&alice).await;
        fixture.pusher.unregister_client(&alice).await;
        store.release.notify_one();
        let result = task.await.unwrap();

        // then (期待する結果):
        assert_eq!(result, Ok(vec![bob]));
        assert_eq!(bob_rx.recv().await, Some(BROADCAST.to_string()));
        assert_eq!(store.inner.len().await, 1);
    }
}
