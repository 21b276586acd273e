//! Streaming HTTP chatroom server library.
//!
//! Rooms are actors reached through [`chatroom::ChatroomHandle`]; the HTTP
//! layer in [`ui`] attaches one subscriber per streaming connection.

// layers
pub mod domain;
pub mod infrastructure;
pub mod ui;
pub mod usecase;

// broadcast core
pub mod chatroom;

pub mod config;
