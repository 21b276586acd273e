//! Broadcast notifications and their wire rendering.
//!
//! Every notification renders to exactly one newline-terminated UTF-8 line.

use chatroom_shared::time::timestamp_to_rfc3339;

use super::{entity::Message, value_object::Nickname};

/// An event a room broadcasts to its members
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    /// A member attached a stream
    Joined(Nickname),
    /// A member detached
    Left(Nickname),
    /// A message was accepted
    Said(Message),
}

impl Notification {
    /// Render the notification as a single stream frame.
    pub fn to_frame(&self) -> String {
        match self {
            Notification::Joined(nickname) => format!("{} has joined\n", nickname),
            Notification::Left(nickname) => format!("{} has left\n", nickname),
            Notification::Said(message) => format!(
                "message : {} : {} , Sent at {}\n",
                message.author,
                single_line(message.body.as_str()),
                timestamp_to_rfc3339(message.created_at.value())
            ),
        }
    }
}

/// Replace line breaks so user text cannot split a frame.
fn single_line(text: &str) -> String {
    text.replace("\r\n", " ").replace(['\r', '\n'], " ")
}
