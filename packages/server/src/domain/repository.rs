//! Repository trait 定義
//!
//! ドメイン層が必要とするデータアクセスのインターフェースを定義します。
//! 具体的な実装は Infrastructure 層が提供します（依存性の逆転）。

use async_trait::async_trait;

use super::{
    entity::{NewShapeEvent, Session, ShapeEvent},
    error::{RegistryError, StoreError},
    value_object::{ConnectionId, RoomId, ShapeId, UserId},
};

/// 図形イベントの永続化ストア（ルームごとの追記専用ログ）
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ShapeStore: Send + Sync {
    /// イベントを追記する
    ///
    /// 冪等ではない：同じ図形 ID で 2 回呼ぶと 2 行になる。
    async fn append(&self, event: NewShapeEvent) -> Result<ShapeEvent, StoreError>;

    /// 図形 ID に一致するイベントを全ルームから削除し、削除した行数を返す
    ///
    /// 存在しない ID は無視される。
    async fn delete_by_shape_ids(&self, shape_ids: &[ShapeId]) -> Result<u64, StoreError>;

    /// ルームの新しいイベントを最大 `limit` 件、新しい順に返す
    async fn fetch_recent(
        &self,
        room_id: &RoomId,
        limit: usize,
    ) -> Result<Vec<ShapeEvent>, StoreError>;
}

/// 接続中のセッションとルーム参加状況のレジストリ
///
/// 接続のライフサイクル（接続・切断・join_room・leave_room）だけが変更する。
/// 永続化はしないため、サーバー再起動で全ての参加状況は失われる。
#[async_trait]
pub trait SessionRegistry: Send + Sync {
    /// セッションを登録
    async fn add(
        &self,
        connection_id: ConnectionId,
        user_id: UserId,
        connected_at: i64,
    ) -> Result<(), RegistryError>;

    /// セッションを削除し、削除したセッションを返す
    async fn remove(&self, connection_id: &ConnectionId) -> Option<Session>;

    /// ルームに参加（既に参加済みなら何もしない）
    async fn join_room(
        &self,
        connection_id: &ConnectionId,
        room_id: RoomId,
    ) -> Result<(), RegistryError>;

    /// ルームから退出（参加していなければ何もしない）
    async fn leave_room(
        &self,
        connection_id: &ConnectionId,
        room_id: &RoomId,
    ) -> Result<(), RegistryError>;

    /// 接続がルームに参加しているか
    ///
    /// ルームの内容に対する唯一の認可チェック。
    async fn is_member(&self, connection_id: &ConnectionId, room_id: &RoomId) -> bool;

    /// ルームに参加している全ての接続（送信者も含む）のスナップショット
    async fn members_of(&self, room_id: &RoomId) -> Vec<ConnectionId>;

    /// 接続のユーザー ID
    async fn user_of(&self, connection_id: &ConnectionId) -> Option<UserId>;

    /// 接続中のセッション数
    async fn count_sessions(&self) -> usize;
}
