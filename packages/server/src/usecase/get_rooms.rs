//! UseCase: ルーム一覧・詳細の取得

use std::sync::Arc;

use crate::{
    chatroom::{RoomRegistry, RoomSnapshot},
    domain::{RoomError, RoomId},
};

/// Number of recent messages included in a room detail
pub const RECENT_MESSAGE_LIMIT: usize = 20;

/// ルーム一覧取得のユースケース
pub struct GetRoomsUseCase {
    registry: Arc<RoomRegistry>,
}

impl GetRoomsUseCase {
    pub fn new(registry: Arc<RoomRegistry>) -> Self {
        Self { registry }
    }

    /// Snapshots of every running room, sorted by id.
    ///
    /// Only counts are fetched; no message is copied out of the rooms.
    /// Rooms whose event loop has stopped are skipped.
    pub async fn execute(&self) -> Vec<RoomSnapshot> {
        let mut snapshots = Vec::new();
        for room in self.registry.list().await {
            match room.snapshot(0).await {
                Ok(snapshot) => snapshots.push(snapshot),
                Err(e) => tracing::warn!("Skipping room in listing: {}", e),
            }
        }
        snapshots
    }
}

/// ルーム詳細取得のユースケース
pub struct GetRoomDetailUseCase {
    registry: Arc<RoomRegistry>,
}

impl GetRoomDetailUseCase {
    pub fn new(registry: Arc<RoomRegistry>) -> Self {
        Self { registry }
    }

    /// Members, message count and the last [`RECENT_MESSAGE_LIMIT`] messages.
    pub async fn execute(&self, room_id: &RoomId) -> Result<RoomSnapshot, RoomError> {
        let room = self.registry.lookup(room_id).await?;
        room.snapshot(RECENT_MESSAGE_LIMIT).await
    }
}
