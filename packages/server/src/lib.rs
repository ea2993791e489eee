//! Real-time room relay for a collaborative whiteboard.
//!
//! Clients connect over WebSocket, join rooms, and exchange cursor positions
//! and shape operations. Shape creations and deletions are persisted so that
//! late joiners can rebuild the canvas from `GET /chats/{room_id}`.

pub mod domain;
pub mod infrastructure;
pub mod ui;
pub mod usecase;
