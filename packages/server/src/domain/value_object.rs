//! Value Objects
//!
//! 識別子をプリミティブ型のまま扱わず、生成時にバリデーションを行う型として定義します。

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::ValueObjectError;

/// 接続ハンドル（1 本の WebSocket 接続を識別する）
///
/// 認証成功時にランダムな UUID v4 が割り当てられ、接続が閉じるまで変わらない。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConnectionId(Uuid);

impl ConnectionId {
    /// 新しい ConnectionId を生成
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident, $label:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// 空文字列（空白のみを含む）は拒否する
            pub fn new(value: String) -> Result<Self, ValueObjectError> {
                if value.trim().is_empty() {
                    return Err(ValueObjectError::Empty($label));
                }
                Ok(Self(value))
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }

            pub fn into_string(self) -> String {
                self.0
            }
        }

        impl TryFrom<String> for $name {
            type Error = ValueObjectError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

string_id!(
    /// 認証済みユーザーの ID（トークンの `userId` クレーム）
    UserId,
    "user id"
);

string_id!(
    /// ルーム ID
    ///
    /// ワイヤー上では文字列または整数で届くが、ドメインでは常に文字列で扱う。
    RoomId,
    "room id"
);

string_id!(
    /// 図形 ID（全ルームで一意、削除キーとして使われる）
    ShapeId,
    "shape id"
);

impl RoomId {
    /// 整数のルーム ID から生成
    pub fn from_number(value: i64) -> Self {
        Self(value.to_string())
    }
}
