//! Domain layer
//!
//! 値オブジェクト、図形モデル、エンティティと、
//! 外部（永続化・通知・認証）へのインターフェースを定義します。

pub mod auth;
pub mod entity;
pub mod error;
pub mod message_pusher;
pub mod repository;
pub mod shape;
pub mod value_object;

pub use auth::TokenVerifier;
pub use entity::{NewShapeEvent, Session, ShapeEvent, sort_for_replay};
pub use error::{AuthError, MessagePushError, RegistryError, StoreError, ValueObjectError};
pub use message_pusher::{MessagePusher, PusherChannel};
pub use repository::{SessionRegistry, ShapeStore};
pub use shape::{
    EraserStroke, PayloadError, Point, Shape, parse_deleted_shapes, parse_shape_message,
};
pub use value_object::{ConnectionId, RoomId, ShapeId, UserId};

#[cfg(test)]
pub use repository::MockShapeStore;
