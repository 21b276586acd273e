//! Startup configuration of the chat server.
//!
//! The binary parses its command line with `clap` and hands the raw values to
//! [`ServerConfig::new`], which validates them before anything is spawned.

use std::{num::NonZeroUsize, str::FromStr, time::Duration};

use thiserror::Error;

use crate::{
    chatroom::{OverflowPolicy, SubscriberConfig},
    domain::{RoomId, RoomTitle, ValueObjectError},
};

/// Room created when no `--room` is given
pub const DEFAULT_ROOM_ID: &str = "general";
/// Title of [`DEFAULT_ROOM_ID`]
pub const DEFAULT_ROOM_TITLE: &str = "General";

/// Invalid startup configuration
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("subscriber capacity must be at least 1")]
    ZeroCapacity,

    #[error("idle timeout must be at least 1 second")]
    ZeroIdleTimeout,

    #[error("invalid room '{spec}': {source}")]
    InvalidRoom {
        spec: String,
        #[source]
        source: ValueObjectError,
    },

    #[error("room '{0}' is configured more than once")]
    DuplicateRoom(String),
}

/// A room to create at startup, written `id=title` or just `id`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomSpec {
    pub id: RoomId,
    pub title: RoomTitle,
}

impl FromStr for RoomSpec {
    type Err = ConfigError;

    fn from_str(spec: &str) -> Result<Self, Self::Err> {
        let invalid = |source| ConfigError::InvalidRoom {
            spec: spec.to_string(),
            source,
        };

        let (id, title) = match spec.split_once('=') {
            Some((id, title)) => (id, title),
            // タイトル省略時は ID をそのまま使う
            None => (spec, spec),
        };

        Ok(Self {
            id: RoomId::new(id.to_string()).map_err(invalid)?,
            title: RoomTitle::new(title.to_string()).map_err(invalid)?,
        })
    }
}

/// Validated server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub subscriber: SubscriberConfig,
    pub idle_timeout: Option<Duration>,
    pub rooms: Vec<RoomSpec>,
}

impl ServerConfig {
    pub fn new(
        host: String,
        port: u16,
        subscriber_capacity: usize,
        overflow: OverflowPolicy,
        idle_timeout_secs: Option<u64>,
        rooms: Vec<RoomSpec>,
    ) -> Result<Self, ConfigError> {
        let capacity = NonZeroUsize::new(subscriber_capacity).ok_or(ConfigError::ZeroCapacity)?;

        let idle_timeout = match idle_timeout_secs {
            Some(0) => return Err(ConfigError::ZeroIdleTimeout),
            Some(secs) => Some(Duration::from_secs(secs)),
            None => None,
        };

        let rooms = if rooms.is_empty() {
            vec![format!("{}={}", DEFAULT_ROOM_ID, DEFAULT_ROOM_TITLE).parse()?]
        } else {
            rooms
        };
        for (index, room) in rooms.iter().enumerate() {
            if rooms[..index].iter().any(|other| other.id == room.id) {
                return Err(ConfigError::DuplicateRoom(room.id.to_string()));
            }
        }

        Ok(Self {
            host,
            port,
            subscriber: SubscriberConfig::new(capacity, overflow),
            idle_timeout,
            rooms,
        })
    }
}
