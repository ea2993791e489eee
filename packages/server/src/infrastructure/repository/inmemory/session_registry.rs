//! InMemory Session Registry 実装
//!
//! 接続 ID → セッション（ユーザー ID と参加中のルーム）のマップを
//! `tokio::sync::Mutex` で保護して保持します。
//!
//! ロックはマップの操作の間だけ保持し、ストアへの I/O やソケットへの書き込みを
//! またいで保持することはありません。

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{ConnectionId, RegistryError, RoomId, Session, SessionRegistry, UserId};

/// インメモリ Session Registry 実装
#[derive(Default)]
pub struct InMemorySessionRegistry {
    sessions: Mutex<HashMap<ConnectionId, Session>>,
}

impl InMemorySessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionRegistry for InMemorySessionRegistry {
    async fn add(
        &self,
        connection_id: ConnectionId,
        user_id: UserId,
        connected_at: i64,
    ) -> Result<(), RegistryError> {
        let mut sessions = self.sessions.lock().await;
        if sessions.contains_key(&connection_id) {
            return Err(RegistryError::DuplicateConnection(connection_id.to_string()));
        }
        sessions.insert(connection_id, Session::new(user_id, connected_at));
        Ok(())
    }

    async fn remove(&self, connection_id: &ConnectionId) -> Option<Session> {
        let mut sessions = self.sessions.lock().await;
        sessions.remove(connection_id)
    }

    async fn join_room(
        &self,
        connection_id: &ConnectionId,
        room_id: RoomId,
    ) -> Result<(), RegistryError> {
        let mut sessions = self.sessions.lock().await;
        let session = sessions
            .get_mut(connection_id)
            .ok_or_else(|| RegistryError::SessionNotFound(connection_id.to_string()))?;
        session.rooms.insert(room_id);
        Ok(())
    }

    async fn leave_room(
        &self,
        connection_id: &ConnectionId,
        room_id: &RoomId,
    ) -> Result<(), RegistryError> {
        let mut sessions = self.sessions.lock().await;
        let session = sessions
            .get_mut(connection_id)
            .ok_or_else(|| RegistryError::SessionNotFound(connection_id.to_string()))?;
        session.rooms.remove(room_id);
        Ok(())
    }

    async fn is_member(&self, connection_id: &ConnectionId, room_id: &RoomId) -> bool {
        let sessions = self.sessions.lock().await;
        sessions
            .get(connection_id)
            .is_some_and(|session| session.is_member(room_id))
    }

    async fn members_of(&self, room_id: &RoomId) -> Vec<ConnectionId> {
        let sessions = self.sessions.lock().await;
        sessions
            .iter()
            .filter(|(_, session)| session.is_member(room_id))
            .map(|(connection_id, _)| *connection_id)
            .collect()
    }

    async fn user_of(&self, connection_id: &ConnectionId) -> Option<UserId> {
        let sessions = self.sessions.lock().await;
        sessions
            .get(connection_id)
            .map(|session| session.user_id.clone())
    }

    async fn count_sessions(&self) -> usize {
        let sessions = self.sessions.lock().await;
        sessions.len()
    }
}
