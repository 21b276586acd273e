//! Domain entities.

use serde::Serialize;

use super::value_object::{MessageBody, Nickname, RoomId, Timestamp};

/// A chat message accepted by a room
///
/// Messages are immutable once the room has appended them to its history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Message {
    /// Author nickname
    pub author: Nickname,
    /// Room the message was posted to
    pub room_id: RoomId,
    /// Body text
    pub body: MessageBody,
    /// When the room accepted the message
    pub created_at: Timestamp,
}

impl Message {
    pub fn new(author: Nickname, room_id: RoomId, body: MessageBody, created_at: Timestamp) -> Self {
        Self {
            author,
            room_id,
            body,
            created_at,
        }
    }
}

/// A chat user
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct User {
    /// Globally unique nickname
    pub nickname: Nickname,
    /// Room the user is currently streaming from, if any
    pub current_room: Option<RoomId>,
    /// Last time the user visited, joined, left or posted
    pub last_activity: Timestamp,
}

impl User {
    pub fn new(nickname: Nickname, now: Timestamp) -> Self {
        Self {
            nickname,
            current_room: None,
            last_activity: now,
        }
    }

    /// Record activity without changing room membership.
    pub fn touch(&mut self, now: Timestamp) {
        self.last_activity = self.last_activity.max(now);
    }

    /// Move the user into `room_id`, returning the room they were in before.
    pub fn enter_room(&mut self, room_id: RoomId, now: Timestamp) -> Option<RoomId> {
        self.touch(now);
        self.current_room.replace(room_id)
    }

    /// Clear the current room if it is `room_id`.
    ///
    /// Returns `false` when the user has already moved elsewhere.
    pub fn leave_room(&mut self, room_id: &RoomId, now: Timestamp) -> bool {
        self.touch(now);
        if self.current_room.as_ref() == Some(room_id) {
            self.current_room = None;
            true
        } else {
            false
        }
    }
}
