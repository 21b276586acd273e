//! CLI client for the chatroom server.
//!
//! Tails a room's streaming endpoint to stdout and posts every line typed on
//! stdin to the room.

pub mod error;
pub mod formatter;
pub mod runner;
pub mod session;
pub mod ui;

pub use runner::run_client;
