//! Repository trait 定義
//!
//! ドメイン層が必要とするデータアクセスのインターフェースを定義します。
//! 具体的な実装は Infrastructure 層が提供します（依存性の逆転）。

use async_trait::async_trait;

use super::{Nickname, RoomId, Timestamp, User};

/// User Repository trait
///
/// Process-scoped store of users keyed by nickname. Users are never removed.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// ユーザーを取得し、存在しなければ作成する
    async fn get_or_create(&self, nickname: &Nickname, now: Timestamp) -> User;

    /// ユーザーを取得
    async fn find(&self, nickname: &Nickname) -> Option<User>;

    /// ユーザーを `room_id` に所属させ、直前のルームを返す
    async fn enter_room(&self, nickname: &Nickname, room_id: RoomId, now: Timestamp)
    -> Option<RoomId>;

    /// ユーザーの所属が `room_id` であれば解除する
    async fn leave_room(&self, nickname: &Nickname, room_id: &RoomId, now: Timestamp) -> bool;

    /// 最終アクティビティ時刻を更新（ユーザーが存在しなければ何もしない）
    async fn touch(&self, nickname: &Nickname, now: Timestamp);

    /// 登録済みユーザー数
    async fn count(&self) -> usize;
}
