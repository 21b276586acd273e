//! Utilities shared by the chatroom server and client binaries.

pub mod logger;
pub mod time;
