//! UseCase: メッセージ送信処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - SendMessageUseCase::execute() メソッド
//!
//! ### なぜこのテストが必要か
//! - 存在しないルームへの送信が即座に NotFound を返し、状態を変更しないことを保証
//! - 送信者の最終アクティビティ時刻が更新されることを確認
//!
//! ### どのような状況を想定しているか
//! - 正常系：メッセージ送信とブロードキャスト
//! - 異常系：存在しないルーム
//! - エッジケース：メンバーでないユーザーからの送信（受け付ける）

use std::sync::Arc;

use chatroom_shared::time::Clock;

use crate::{
    chatroom::RoomRegistry,
    domain::{MessageBody, Nickname, RoomError, RoomId, Timestamp, UserRepository},
};

/// メッセージ送信のユースケース
pub struct SendMessageUseCase {
    registry: Arc<RoomRegistry>,
    users: Arc<dyn UserRepository>,
    clock: Arc<dyn Clock>,
}

impl SendMessageUseCase {
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

    /// メッセージ送信を実行
    ///
    /// The sender does not have to be a member of the room.
    ///
    /// # Returns
    ///
    /// * `Ok(())` - ルームがメッセージを受け付けた
    /// * `Err(RoomError::NotFound)` - ルームが存在しない（状態は変更されない）
    pub async fn execute(
        &self,
        room_id: &RoomId,
        author: Nickname,
        body: MessageBody,
    ) -> Result<(), RoomError> {
        let room = self.registry.lookup(room_id).await?;
        room.say(author.clone(), body)?;
        self.users
            .touch(&author, Timestamp::new(self.clock.now_millis()))
            .await;
        Ok(())
    }
}
