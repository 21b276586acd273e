//! UseCase: チャット一覧の表示

use std::sync::Arc;

use chatroom_shared::time::Clock;

use crate::{
    chatroom::RoomRegistry,
    domain::{Nickname, RoomId, RoomTitle, Timestamp, User, UserRepository},
};

/// What a user sees on the chat list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatList {
    pub user: User,
    /// Rooms sorted by id
    pub rooms: Vec<(RoomId, RoomTitle)>,
}

/// チャット一覧表示のユースケース
///
/// The first visit registers the nickname as a user.
pub struct VisitChatListUseCase {
    registry: Arc<RoomRegistry>,
    users: Arc<dyn UserRepository>,
    clock: Arc<dyn Clock>,
}

impl VisitChatListUseCase {
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

    pub async fn execute(&self, nickname: Nickname) -> ChatList {
        let user = self
            .users
            .get_or_create(&nickname, Timestamp::new(self.clock.now_millis()))
            .await;
        let rooms = self
            .registry
            .list()
            .await
            .into_iter()
            .map(|room| (room.id().clone(), room.title().clone()))
            .collect();
        ChatList { user, rooms }
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
    async fn test_first_visit_registers_user() {
        // テスト項目: 初回訪問でユーザーが登録され、ルーム一覧が返される
        // given (前提条件):
        let registry = create_test_registry().await;
        let users = Arc::new(InMemoryUserRepository::new());
        let usecase = VisitChatListUseCase::new(registry, users.clone(), clock());

        // when (操作):
        let list = usecase.execute(nickname("alice")).await;

        // then (期待する結果):
        assert_eq!(users.count().await, 1);
        assert_eq!(list.user.nickname, nickname("alice"));
        assert_eq!(list.user.current_room, None);
        let ids: Vec<&RoomId> = list.rooms.iter().map(|(id, _)| id).collect();
        assert_eq!(ids, vec![&room_id("general"), &room_id("random")]);
    }

    #[tokio::test]
    async fn test_repeated_visit_keeps_single_user() {
        // テスト項目: 再訪問してもユーザーは重複しない
        // given (前提条件):
        let registry = create_test_registry().await;
        let users = Arc::new(InMemoryUserRepository::new());
        let usecase = VisitChatListUseCase::new(registry, users.clone(), clock());

        // when (操作):
        usecase.execute(nickname("alice")).await;
        usecase.execute(nickname("alice")).await;

        // then (期待する結果):
        assert_eq!(users.count().await, 1);
    }
}
