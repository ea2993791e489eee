//! SQLite Shape Store 実装
//!
//! `sqlx` の SQLite プールを使って図形イベントを永続化します。
//! テーブルとインデックスは接続時に作成されます。
//!
//! ```text
//! shape_events(id INTEGER PRIMARY KEY AUTOINCREMENT, room_id, user_id, shape_id, message)
//! ```

use std::str::FromStr;

use async_trait::async_trait;
use sqlx::{
    FromRow, QueryBuilder, Sqlite, SqlitePool,
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
};

use crate::domain::{
    NewShapeEvent, RoomId, ShapeEvent, ShapeId, ShapeStore, StoreError, UserId, ValueObjectError,
};

const CREATE_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS shape_events (
    id       INTEGER PRIMARY KEY AUTOINCREMENT,
    room_id  TEXT NOT NULL,
    user_id  TEXT NOT NULL,
    shape_id TEXT NOT NULL,
    message  TEXT NOT NULL
)
"#;

const CREATE_ROOM_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS idx_shape_events_room ON shape_events (room_id, id)";

const CREATE_SHAPE_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS idx_shape_events_shape ON shape_events (shape_id)";

/// DB の行
#[derive(Debug, FromRow)]
struct ShapeEventRow {
    id: i64,
    room_id: String,
    user_id: String,
    shape_id: String,
    message: String,
}

impl TryFrom<ShapeEventRow> for ShapeEvent {
    type Error = StoreError;

    fn try_from(row: ShapeEventRow) -> Result<Self, Self::Error> {
        let id = row.id;
        let corrupt =
            move |e: ValueObjectError| StoreError::Backend(format!("corrupt row {}: {}", id, e));
        Ok(Self {
            id: row.id,
            room_id: RoomId::new(row.room_id).map_err(corrupt)?,
            user_id: UserId::new(row.user_id).map_err(corrupt)?,
            shape_id: ShapeId::new(row.shape_id).map_err(corrupt)?,
            message: row.message,
        })
    }
}

fn backend(e: sqlx::Error) -> StoreError {
    StoreError::Backend(e.to_string())
}

/// SQLite Shape Store 実装
#[derive(Clone)]
pub struct SqliteShapeStore {
    pool: SqlitePool,
}

impl SqliteShapeStore {
    /// データベース URL（例: `sqlite://sketchroom.db`）に接続し、スキーマを準備する
    ///
    /// ファイルが存在しなければ作成する。
    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str(database_url)
            .map_err(backend)?
            .create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .connect_with(options)
            .await
            .map_err(backend)?;
        Self::from_pool(pool).await
    }

    /// 既存のプールからストアを作成し、スキーマを準備する
    pub async fn from_pool(pool: SqlitePool) -> Result<Self, StoreError> {
        for statement in [CREATE_TABLE, CREATE_ROOM_INDEX, CREATE_SHAPE_INDEX] {
            sqlx::query(statement)
                .execute(&pool)
                .await
                .map_err(backend)?;
        }
        tracing::debug!("shape_events schema is ready");
        Ok(Self { pool })
    }
}

#[async_trait]
impl ShapeStore for SqliteShapeStore {
    async fn append(&self, event: NewShapeEvent) -> Result<ShapeEvent, StoreError> {
        let result = sqlx::query(
            "INSERT INTO shape_events (room_id, user_id, shape_id, message) VALUES (?, ?, ?, ?)",
        )
        .bind(event.room_id.as_str())
        .bind(event.user_id.as_str())
        .bind(event.shape_id.as_str())
        .bind(event.message.as_str())
        .execute(&self.pool)
        .await
        .map_err(backend)?;

        Ok(ShapeEvent::from_new(result.last_insert_rowid(), event))
    }

    async fn delete_by_shape_ids(&self, shape_ids: &[ShapeId]) -> Result<u64, StoreError> {
        if shape_ids.is_empty() {
            return Ok(0);
        }

        let mut builder: QueryBuilder<Sqlite> =
            QueryBuilder::new("DELETE FROM shape_events WHERE shape_id IN (");
        let mut separated = builder.separated(", ");
        for shape_id in shape_ids {
            separated.push_bind(shape_id.as_str().to_string());
        }
        separated.push_unseparated(")");

        let result = builder
            .build()
            .execute(&self.pool)
            .await
            .map_err(backend)?;

        Ok(result.rows_affected())
    }

    async fn fetch_recent(
        &self,
        room_id: &RoomId,
        limit: usize,
    ) -> Result<Vec<ShapeEvent>, StoreError> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let rows: Vec<ShapeEventRow> = sqlx::query_as(
            "SELECT id, room_id, user_id, shape_id, message FROM shape_events \
             WHERE room_id = ? ORDER BY id DESC LIMIT ?",
        )
        .bind(room_id.as_str())
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(backend)?;

        rows.into_iter().map(ShapeEvent::try_from).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ========================================
    // テスト作業記録
    // ========================================
    // 【何をテストするか】
    // - SqliteShapeStore の追記・削除・直近履歴の取得
    //
    // 【なぜこのテストが必要か】
    // - 遅れて参加したクライアントはこの履歴からキャンバスを復元する
    // - 保存した message がそのまま返ることを保証する必要がある
    //
    // 【どのようなシナリオをテストするか】
    // 1. 追記した message がバイト単位で同じまま取得できる
    // 2. 削除の冪等性（2 回目は 0 件）
    // 3. ルームの絞り込みと件数上限
    // ========================================

    async fn create_test_store() -> SqliteShapeStore {
        // in-memory DB は接続ごとに別物になるため、接続は 1 本に固定する
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        SqliteShapeStore::from_pool(pool).await.unwrap()
    }

    fn new_event(room: &str, shape: &str) -> NewShapeEvent {
        NewShapeEvent {
            room_id: RoomId::new(room.to_string()).unwrap(),
            user_id: UserId::new("alice".to_string()).unwrap(),
            shape_id: ShapeId::new(shape.to_string()).unwrap(),
            message: format!(
                r##"{{"shape":{{"type":"rect","shapeId":"{}","strokeColor":"#ff0000"}}}}"##,
                shape
            ),
        }
    }

    #[tokio::test]
    async fn test_append_and_fetch_round_trip() {
        // テスト項目: 追記した message が変更されずに取得できる
        // given (前提条件):
        let store = create_test_store().await;
        let event = new_event("42", "s1");
        let original_message = event.message.clone();

        // when (操作):
        let stored = store.append(event).await.unwrap();
        let room = RoomId::new("42".to_string()).unwrap();
        let fetched = store.fetch_recent(&room, 50).await.unwrap();

        // then (期待する結果):
        assert_eq!(fetched.len(), 1);
        assert_eq!(fetched[0], stored);
        assert_eq!(fetched[0].message, original_message);
        assert_eq!(fetched[0].user_id.as_str(), "alice");
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        // テスト項目: 同じ ID での 2 回目の削除は 0 件を返す
        // given (前提条件):
        let store = create_test_store().await;
        store.append(new_event("42", "s1")).await.unwrap();
        store.append(new_event("43", "s1")).await.unwrap();
        store.append(new_event("42", "s2")).await.unwrap();
        let ids = vec![
            ShapeId::new("s1".to_string()).unwrap(),
            ShapeId::new("unknown".to_string()).unwrap(),
        ];

        // when (操作):
        let first = store.delete_by_shape_ids(&ids).await;
        let second = store.delete_by_shape_ids(&ids).await;

        // then (期待する結果): 全ルームから削除される
        assert_eq!(first, Ok(2));
        assert_eq!(second, Ok(0));
        let room = RoomId::new("42".to_string()).unwrap();
        let remaining = store.fetch_recent(&room, 50).await.unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].shape_id.as_str(), "s2");
    }

    #[tokio::test]
    async fn test_delete_with_empty_ids() {
        // テスト項目: 空の ID 集合での削除は何もしない
        // given (前提条件):
        let store = create_test_store().await;
        store.append(new_event("42", "s1")).await.unwrap();

        // when (操作):
        let result = store.delete_by_shape_ids(&[]).await;

        // then (期待する結果):
        assert_eq!(result, Ok(0));
    }

    #[tokio::test]
    async fn test_fetch_recent_newest_first_with_limit() {
        // テスト項目: 新しい順に上限件数まで、指定ルームのものだけが返される
        // given (前提条件):
        let store = create_test_store().await;
        for shape in ["s1", "s2", "s3"] {
            store.append(new_event("42", shape)).await.unwrap();
        }
        store.append(new_event("7", "elsewhere")).await.unwrap();

        // when (操作):
        let room = RoomId::new("42".to_string()).unwrap();
        let events = store.fetch_recent(&room, 2).await.unwrap();

        // then (期待する結果):
        let ids: Vec<&str> = events.iter().map(|e| e.shape_id.as_str()).collect();
        assert_eq!(ids, vec!["s3", "s2"]);
    }
}
