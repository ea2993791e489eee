//! メッセージ送信（通知）の実装
//!
//! このモジュールは `MessagePusher` trait の具体的な実装を提供します。
//!
//! - `websocket`: WebSocket 接続ごとの送信チャンネルを使った実装

pub mod websocket;

pub use websocket::WebSocketMessagePusher;
