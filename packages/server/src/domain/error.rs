//! Domain errors.

use thiserror::Error;

/// Validation errors raised when constructing value objects
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueObjectError {
    /// Nickname is empty after trimming
    #[error("nickname must not be empty")]
    NicknameEmpty,

    /// Nickname exceeds the maximum length
    #[error("nickname must be at most {max} characters (got {actual})")]
    NicknameTooLong { max: usize, actual: usize },

    /// Room ID is empty after trimming
    #[error("room id must not be empty")]
    RoomIdEmpty,

    /// Room ID exceeds the maximum length
    #[error("room id must be at most {max} characters (got {actual})")]
    RoomIdTooLong { max: usize, actual: usize },

    /// Room title is empty after trimming
    #[error("room title must not be empty")]
    RoomTitleEmpty,

    /// Room title exceeds the maximum length
    #[error("room title must be at most {max} characters (got {actual})")]
    RoomTitleTooLong { max: usize, actual: usize },

    /// Message body is empty after trimming
    #[error("message must not be empty")]
    MessageEmpty,

    /// Message body exceeds the maximum length
    #[error("message must be at most {max} characters (got {actual})")]
    MessageTooLong { max: usize, actual: usize },

    /// Identifier contains whitespace or control characters, or a title
    /// contains control characters
    #[error("{field} contains an invalid character: {character:?}")]
    InvalidCharacter {
        field: &'static str,
        character: char,
    },
}

/// Errors reported when addressing a chatroom
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RoomError {
    /// No room is registered under the given id
    #[error("room '{0}' not found")]
    NotFound(String),

    /// The room's event loop is no longer running
    #[error("room '{0}' is closed")]
    Closed(String),

    /// A room with the given id is already registered
    #[error("room '{0}' already exists")]
    AlreadyExists(String),
}
