//! InMemory User Repository 実装
//!
//! ドメイン層が定義する UserRepository trait の具体的な実装。
//! HashMap をインメモリ DB として使用します。ユーザーは削除されません。

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{Nickname, RoomId, Timestamp, User, UserRepository};

/// インメモリ User Repository 実装
#[derive(Default)]
pub struct InMemoryUserRepository {
    /// Key: nickname, Value: User
    users: Mutex<HashMap<Nickname, User>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn get_or_create(&self, nickname: &Nickname, now: Timestamp) -> User {
        let mut users = self.users.lock().await;
        let user = users.entry(nickname.clone()).or_insert_with(|| {
            tracing::info!("User '{}' registered", nickname);
            User::new(nickname.clone(), now)
        });
        user.touch(now);
        user.clone()
    }

    async fn find(&self, nickname: &Nickname) -> Option<User> {
        let users = self.users.lock().await;
        users.get(nickname).cloned()
    }

    async fn enter_room(
        &self,
        nickname: &Nickname,
        room_id: RoomId,
        now: Timestamp,
    ) -> Option<RoomId> {
        let mut users = self.users.lock().await;
        users
            .entry(nickname.clone())
            .or_insert_with(|| User::new(nickname.clone(), now))
            .enter_room(room_id, now)
    }

    async fn leave_room(&self, nickname: &Nickname, room_id: &RoomId, now: Timestamp) -> bool {
        let mut users = self.users.lock().await;
        users
            .get_mut(nickname)
            .is_some_and(|user| user.leave_room(room_id, now))
    }

    async fn touch(&self, nickname: &Nickname, now: Timestamp) {
        let mut users = self.users.lock().await;
        if let Some(user) = users.get_mut(nickname) {
            user.touch(now);
        }
    }

    async fn count(&self) -> usize {
        self.users.lock().await.len()
    }
}
