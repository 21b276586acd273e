//! Domain layer: value objects, entities, notifications and repository traits.
//!
//! The domain layer has no dependency on the HTTP layer or on concrete storage.

pub mod entity;
pub mod error;
pub mod notification;
pub mod repository;
pub mod value_object;

pub use entity::{Message, User};
pub use error::{RoomError, ValueObjectError};
pub use notification::Notification;
pub use repository::UserRepository;
pub use value_object::{MessageBody, Nickname, RoomId, RoomTitle, Timestamp};
