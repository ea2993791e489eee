//! SQLite 実装

mod shape_store;

pub use shape_store::SqliteShapeStore;
