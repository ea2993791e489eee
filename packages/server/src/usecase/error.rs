//! UseCase 層のエラー型

use thiserror::Error;

use crate::domain::{RegistryError, StoreError};

/// 接続処理のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConnectError {
    #[error(transparent)]
    Registry(#[from] RegistryError),
}

/// 切断処理のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DisconnectError {
    #[error("session '{0}' not found")]
    SessionNotFound(String),
}

/// ルーム参加・退出のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RoomMembershipError {
    #[error(transparent)]
    Registry(#[from] RegistryError),
}

/// 図形作成（chat）のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CreateShapeError {
    #[error("connection is not a member of room '{0}'")]
    NotAMember(String),

    #[error("session '{0}' not found")]
    SessionNotFound(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// 図形削除（deleted）のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeleteShapesError {
    #[error("connection is not a member of room '{0}'")]
    NotAMember(String),

    #[error("no shapes selected for deletion")]
    EmptySelection,

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// 履歴取得のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HistoryError {
    #[error(transparent)]
    Store(#[from] StoreError),
}
