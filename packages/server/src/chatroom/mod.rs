//! Chatroom broadcast core.
//!
//! - [`subscriber`]: bounded per-connection frame queues
//! - [`actor`]: the single-writer event loop owning a room's state
//! - [`handle`]: the cloneable API used to talk to a running room
//! - [`registry`]: lookup of room handles by id

pub mod actor;
pub mod handle;
pub mod registry;
pub mod subscriber;

pub use actor::{MemberInfo, RoomSnapshot};
pub use handle::ChatroomHandle;
pub use registry::RoomRegistry;
pub use subscriber::{
    DEFAULT_SUBSCRIBER_CAPACITY, OverflowPolicy, Subscriber, SubscriberConfig, SubscriberId,
    SubscriberReceiver,
};
