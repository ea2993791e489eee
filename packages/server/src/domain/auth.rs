//! 接続時の認証インターフェース

use super::{error::AuthError, value_object::UserId};

/// ベアラートークンを検証してユーザー ID を返す
///
/// 検証は同期的に行われ、WebSocket へのアップグレード前に呼ばれる。
pub trait TokenVerifier: Send + Sync {
    fn verify(&self, token: &str) -> Result<UserId, AuthError>;
}
