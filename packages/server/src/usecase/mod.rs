//! UseCase layer.
//!
//! Each use case combines the room registry, the user repository and the
//! clock to implement one operation of the chat boundary.

mod create_room;
mod get_rooms;
mod join_room;
mod leave_room;
mod send_message;
mod visit_chat_list;

pub use create_room::CreateRoomUseCase;
pub use get_rooms::{GetRoomDetailUseCase, GetRoomsUseCase, RECENT_MESSAGE_LIMIT};
pub use join_room::{JoinRoomUseCase, Subscription};
pub use leave_room::LeaveRoomUseCase;
pub use send_message::SendMessageUseCase;
pub use visit_chat_list::{ChatList, VisitChatListUseCase};
