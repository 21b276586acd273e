//! Server state shared by the HTTP handlers.

use std::{sync::Arc, time::Duration};

use chatroom_shared::time::Clock;
use tokio::sync::watch;

use crate::{
    chatroom::RoomRegistry,
    domain::UserRepository,
    usecase::{
        CreateRoomUseCase, GetRoomDetailUseCase, GetRoomsUseCase, JoinRoomUseCase,
        LeaveRoomUseCase, SendMessageUseCase, VisitChatListUseCase,
    },
};

/// Shared application state
pub struct AppState {
    /// JoinRoomUseCase（ルーム参加のユースケース）
    pub join_room_usecase: JoinRoomUseCase,
    /// LeaveRoomUseCase（ルーム退出のユースケース）
    pub leave_room_usecase: LeaveRoomUseCase,
    /// SendMessageUseCase（メッセージ送信のユースケース）
    pub send_message_usecase: SendMessageUseCase,
    /// VisitChatListUseCase（チャット一覧のユースケース）
    pub visit_chat_list_usecase: VisitChatListUseCase,
    /// GetRoomsUseCase（ルーム一覧取得のユースケース）
    pub get_rooms_usecase: GetRoomsUseCase,
    /// GetRoomDetailUseCase（ルーム詳細取得のユースケース）
    pub get_room_detail_usecase: GetRoomDetailUseCase,
    /// CreateRoomUseCase（ルーム作成のユースケース）
    pub create_room_usecase: CreateRoomUseCase,
    /// Streams with no frame for this long are closed
    pub idle_timeout: Option<Duration>,
    /// Flips to `true` when the server starts shutting down
    pub shutdown: watch::Receiver<bool>,
}

impl AppState {
    /// Wire every use case to the same registry, user repository and clock.
    pub fn new(
        registry: Arc<RoomRegistry>,
        users: Arc<dyn UserRepository>,
        clock: Arc<dyn Clock>,
        idle_timeout: Option<Duration>,
        shutdown: watch::Receiver<bool>,
    ) -> Self {
        Self {
            join_room_usecase: JoinRoomUseCase::new(
                registry.clone(),
                users.clone(),
                clock.clone(),
            ),
            leave_room_usecase: LeaveRoomUseCase::new(
                registry.clone(),
                users.clone(),
                clock.clone(),
            ),
            send_message_usecase: SendMessageUseCase::new(
                registry.clone(),
                users.clone(),
                clock.clone(),
            ),
            visit_chat_list_usecase: VisitChatListUseCase::new(registry.clone(), users, clock),
            get_rooms_usecase: GetRoomsUseCase::new(registry.clone()),
            get_room_detail_usecase: GetRoomDetailUseCase::new(registry.clone()),
            create_room_usecase: CreateRoomUseCase::new(registry),
            idle_timeout,
            shutdown,
        }
    }
}
