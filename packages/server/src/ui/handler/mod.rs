//! HTTP handlers.

mod error;
mod http;
mod stream;

pub use http::{
    chat_list, create_room, get_room_detail, get_rooms, health_check, leave, say,
};
pub use stream::chat_stream;
