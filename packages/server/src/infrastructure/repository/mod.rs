//! Repository 実装
//!
//! - `inmemory`: セッションレジストリと、DB なしで動く図形ストア
//! - `sqlite`: `sqlx` を使った図形ストア

pub mod inmemory;
pub mod sqlite;

pub use inmemory::{InMemorySessionRegistry, InMemoryShapeStore};
pub use sqlite::SqliteShapeStore;
