//! UseCase: ルーム参加処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - JoinRoomUseCase::execute() メソッド
//! - ルームへの購読登録とユーザーの所属ルーム更新
//!
//! ### どのような状況を想定しているか
//! - 正常系：ルームへの参加
//! - 異常系：存在しないルームへの参加
//! - エッジケース：別のルームに参加中のユーザーが移動する

use std::sync::Arc;

use chatroom_shared::time::Clock;

use crate::{
    chatroom::{ChatroomHandle, RoomRegistry, SubscriberReceiver},
    domain::{Nickname, RoomError, RoomId, Timestamp, UserRepository},
};

/// An attached stream: the room, who joined, and the queue to drain
#[derive(Debug)]
pub struct Subscription {
    pub room: ChatroomHandle,
    pub nickname: Nickname,
    pub receiver: SubscriberReceiver,
}

/// ルーム参加のユースケース
pub struct JoinRoomUseCase {
    registry: Arc<RoomRegistry>,
    users: Arc<dyn UserRepository>,
    clock: Arc<dyn Clock>,
}

impl JoinRoomUseCase {
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

    /// ルーム参加を実行
    ///
    /// A user streams from at most one room: if they were attached to a
    /// different room, they are removed from it first.
    ///
    /// # Returns
    ///
    /// * `Ok(Subscription)` - 参加成功（呼び出し側が受信キューを読み出す）
    /// * `Err(RoomError::NotFound)` - ルームが存在しない
    pub async fn execute(
        &self,
        room_id: &RoomId,
        nickname: Nickname,
    ) -> Result<Subscription, RoomError> {
        let room = self.registry.lookup(room_id).await?;

        let now = Timestamp::new(self.clock.now_millis());
        let previous = self
            .users
            .enter_room(&nickname, room_id.clone(), now)
            .await;
        if let Some(previous) = previous.filter(|previous| previous != room_id) {
            match self.registry.lookup(&previous).await {
                Ok(previous_room) => {
                    tracing::info!(
                        "'{}' moves from room '{}' to '{}'",
                        nickname,
                        previous,
                        room_id
                    );
                    if let Err(e) = previous_room.leave(nickname.clone()) {
                        tracing::warn!("Failed to leave previous room '{}': {}", previous, e);
                    }
                }
                Err(e) => tracing::warn!("Previous room of '{}' is gone: {}", nickname, e),
            }
        }

        let receiver = room.join(nickname.clone())?;
        Ok(Subscription {
            room,
            nickname,
            receiver,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        infrastructure::repository::InMemoryUserRepository,
        usecase::test_support::{clock, create_test_registry, nickname, room_id},
    };

    #[tokio::test]
    async fn test_join_room_success() {
        // テスト項目: ルームに参加すると参加通知を受け取り、所属ルームが記録される
        // given (前提条件):
        let registry = create_test_registry().await;
        let users = Arc::new(InMemoryUserRepository::new());
        let usecase = JoinRoomUseCase::new(registry.clone(), users.clone(), clock());

        // when (操作):
        let mut subscription = usecase
            .execute(&room_id("general"), nickname("alice"))
            .await
            .unwrap();

        // then (期待する結果):
        assert_eq!(
            subscription.receiver.recv().await,
            Some("alice has joined\n".to_string())
        );
        let user = users.find(&nickname("alice")).await.unwrap();
        assert_eq!(user.current_room, Some(room_id("general")));
        assert_eq!(subscription.room.id(), &room_id("general"));
    }

    #[tokio::test]
    async fn test_join_unknown_room_returns_not_found() {
        // テスト項目: 存在しないルームへの参加は NotFound になり、ユーザーは作成されない
        // given (前提条件):
        let registry = create_test_registry().await;
        let users = Arc::new(InMemoryUserRepository::new());
        let usecase = JoinRoomUseCase::new(registry, users.clone(), clock());

        // when (操作):
        let result = usecase
            .execute(&room_id("unknown"), nickname("alice"))
            .await;

        // then (期待する結果):
        assert_eq!(
            result.map(|_| ()).unwrap_err(),
            RoomError::NotFound("unknown".to_string())
        );
        assert_eq!(users.count().await, 0);
    }

    #[tokio::test]
    async fn test_join_other_room_leaves_previous_room() {
        // テスト項目: 別のルームに参加すると、以前のルームから退出する
        // given (前提条件):
        let registry = create_test_registry().await;
        let users = Arc::new(InMemoryUserRepository::new());
        let usecase = JoinRoomUseCase::new(registry.clone(), users.clone(), clock());
        let mut first = usecase
            .execute(&room_id("general"), nickname("alice"))
            .await
            .unwrap();

        // when (操作):
        let _second = usecase
            .execute(&room_id("random"), nickname("alice"))
            .await
            .unwrap();

        // then (期待する結果): general のストリームは閉じ、所属は random になる
        let general = registry.lookup(&room_id("general")).await.unwrap();
        assert!(general.snapshot(0).await.unwrap().members.is_empty());
        assert_eq!(
            first.receiver.recv().await,
            Some("alice has joined\n".to_string())
        );
        assert_eq!(first.receiver.recv().await, None);
        let user = users.find(&nickname("alice")).await.unwrap();
        assert_eq!(user.current_room, Some(room_id("random")));
    }
}
