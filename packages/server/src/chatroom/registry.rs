//! Room Registry: process-wide lookup of chatroom handles.
//!
//! Read-mostly after startup. Creation is guarded by the write lock so rooms
//! can also be added while the server is running. Rooms are never removed.

use std::{collections::HashMap, sync::Arc};

use chatroom_shared::time::Clock;
use tokio::sync::RwLock;

use crate::domain::{RoomError, RoomId, RoomTitle};

use super::{handle::ChatroomHandle, subscriber::SubscriberConfig};

/// Registry of running chatrooms
pub struct RoomRegistry {
    rooms: RwLock<HashMap<RoomId, ChatroomHandle>>,
    subscriber_config: SubscriberConfig,
    clock: Arc<dyn Clock>,
}

impl RoomRegistry {
    /// Create an empty registry.
    ///
    /// Every room created through it uses `subscriber_config` for its
    /// subscribers and `clock` to timestamp messages.
    pub fn new(subscriber_config: SubscriberConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            rooms: RwLock::new(HashMap::new()),
            subscriber_config,
            clock,
        }
    }

    /// Spawn a room and register it under `id`.
    pub async fn create_room(
        &self,
        id: RoomId,
        title: RoomTitle,
    ) -> Result<ChatroomHandle, RoomError> {
        let mut rooms = self.rooms.write().await;
        if rooms.contains_key(&id) {
            return Err(RoomError::AlreadyExists(id.to_string()));
        }

        let handle =
            ChatroomHandle::spawn(id.clone(), title, self.subscriber_config, self.clock.clone());
        rooms.insert(id, handle.clone());
        tracing::info!(
            "Room '{}' registered ({} room(s) total)",
            handle.id(),
            rooms.len()
        );
        Ok(handle)
    }

    /// Resolve a room by id.
    pub async fn lookup(&self, id: &RoomId) -> Result<ChatroomHandle, RoomError> {
        let rooms = self.rooms.read().await;
        rooms
            .get(id)
            .cloned()
            .ok_or_else(|| RoomError::NotFound(id.to_string()))
    }

    /// All rooms sorted by id.
    pub async fn list(&self) -> Vec<ChatroomHandle> {
        let rooms = self.rooms.read().await;
        let mut handles: Vec<ChatroomHandle> = rooms.values().cloned().collect();
        handles.sort_by(|a, b| a.id().cmp(b.id()));
        handles
    }

    pub async fn len(&self) -> usize {
        self.rooms.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.rooms.read().await.is_empty()
    }
}
