//! UseCase: ルーム退出処理

use std::sync::Arc;

use chatroom_shared::time::Clock;

use crate::{
    chatroom::{RoomRegistry, SubscriberId},
    domain::{Nickname, RoomError, RoomId, Timestamp, UserRepository},
};

/// ルーム退出のユースケース
pub struct LeaveRoomUseCase {
    registry: Arc<RoomRegistry>,
    users: Arc<dyn UserRepository>,
    clock: Arc<dyn Clock>,
}

impl LeaveRoomUseCase {
    pub fn new(
        registry: Arc<RoomRegistry>,
        users: Arc<dyn UserRepository>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            registry,
            users,
            clock,
        }
    }

    /// Remove `nickname` from the room regardless of which connection it is
    /// attached through. Leaving a room one is not in is not an error.
    pub async fn execute(&self, room_id: &RoomId, nickname: Nickname) -> Result<(), RoomError> {
        let room = self.registry.lookup(room_id).await?;
        room.leave(nickname.clone())?;
        self.users
            .leave_room(&nickname, room_id, self.now())
            .await;
        Ok(())
    }

    /// Detach one streaming connection.
    ///
    /// Called exactly once when a connection ends. If the nickname has
    /// meanwhile rejoined on another connection, nothing changes.
    ///
    /// # Returns
    ///
    /// * `Ok(true)` - 接続がメンバーから削除された
    /// * `Ok(false)` - 既に別の接続に置き換えられていた、または退出済み
    pub async fn detach(
        &self,
        room_id: &RoomId,
        nickname: Nickname,
        subscriber_id: SubscriberId,
    ) -> Result<bool, RoomError> {
        let room = self.registry.lookup(room_id).await?;
        let removed = room.leave_subscriber(nickname.clone(), subscriber_id).await?;
        if removed {
            self.users
                .leave_room(&nickname, room_id, self.now())
                .await;
        }
        Ok(removed)
    }

    fn now(&self) -> Timestamp {
        Timestamp::new(self.clock.now_millis())
    }
}
