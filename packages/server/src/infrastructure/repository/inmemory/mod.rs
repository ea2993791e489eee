//! インメモリ実装

mod session_registry;
mod shape_store;

pub use session_registry::InMemorySessionRegistry;
pub use shape_store::InMemoryShapeStore;
