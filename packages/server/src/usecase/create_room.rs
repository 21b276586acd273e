//! UseCase: ルーム作成

use std::sync::Arc;

use crate::{
    chatroom::{ChatroomHandle, RoomRegistry},
    domain::{RoomError, RoomId, RoomTitle},
};

/// ルーム作成のユースケース
pub struct CreateRoomUseCase {
    registry: Arc<RoomRegistry>,
}

impl CreateRoomUseCase {
    pub fn new(registry: Arc<RoomRegistry>) -> Self {
        Self { registry }
    }

    /// ルームを作成して起動する
    ///
    /// # Returns
    ///
    /// * `Ok(ChatroomHandle)` - 作成成功
    /// * `Err(RoomError::AlreadyExists)` - 同じ ID のルームが既に存在する
    pub async fn execute(&self, id: RoomId, title: RoomTitle) -> Result<ChatroomHandle, RoomError> {
        self.registry.create_room(id, title).await
    }
}
