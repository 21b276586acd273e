//! Streaming HTTP chatroom server.
//!
//! Clients open `GET /chat?roomID=<room>&nickname=<nick>` and receive every
//! join, leave and message of that room as newline-terminated text lines.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin chatroom-server
//! cargo run --bin chatroom-server -- --port 3000 --room general=General --room random=Random
//! ```

use std::sync::Arc;

use chatroom_server::{
    chatroom::{DEFAULT_SUBSCRIBER_CAPACITY, OverflowPolicy, RoomRegistry},
    config::{RoomSpec, ServerConfig},
    infrastructure::repository::InMemoryUserRepository,
    ui::Server,
};
use chatroom_shared::{logger::setup_logger, time::SystemClock};
use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "chatroom-server")]
#[command(about = "Chatroom server broadcasting over streaming HTTP", long_about = None)]
struct Args {
    /// Host address to bind the server to
    #[arg(short = 'H', long, default_value = "127.0.0.1")]
    host: String,

    /// Port number to bind the server to
    #[arg(short = 'p', long, default_value = "7072")]
    port: u16,

    /// Frames a single connection may have queued before the overflow policy applies
    #[arg(long, default_value_t = DEFAULT_SUBSCRIBER_CAPACITY)]
    subscriber_capacity: usize,

    /// Which frame to drop when a connection's queue is full
    #[arg(long, value_enum, default_value_t = OverflowPolicy::DropNewest)]
    overflow_policy: OverflowPolicy,

    /// Close streams that receive nothing for this many seconds (off by default)
    #[arg(long)]
    idle_timeout_secs: Option<u64>,

    /// Room to create at startup, as `id=title` (repeatable, default `general=General`)
    #[arg(long = "room")]
    rooms: Vec<RoomSpec>,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    setup_logger("chatroom_server", env!("CARGO_BIN_NAME"), "debug");

    let args = Args::parse();
    let config = match ServerConfig::new(
        args.host,
        args.port,
        args.subscriber_capacity,
        args.overflow_policy,
        args.idle_timeout_secs,
        args.rooms,
    ) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Invalid configuration: {}", e);
            std::process::exit(1);
        }
    };

    // Initialize dependencies in order:
    // 1. Clock
    // 2. Room registry and startup rooms
    // 3. User repository
    // 4. Server

    // 1. Create Clock
    let clock = Arc::new(SystemClock);

    // 2. Create RoomRegistry
    tracing::info!(
        "Subscribers hold up to {} frame(s), overflow policy: {}",
        config.subscriber.capacity(),
        config.subscriber.overflow()
    );
    let registry = Arc::new(RoomRegistry::new(config.subscriber, clock.clone()));
    for room in config.rooms {
        if let Err(e) = registry.create_room(room.id, room.title).await {
            tracing::error!("Failed to create room: {}", e);
            std::process::exit(1);
        }
    }

    // 3. Create UserRepository (in-memory)
    let users = Arc::new(InMemoryUserRepository::new());

    // 4. Create and run the server
    let server = Server::new(registry, users, clock, config.idle_timeout);
    if let Err(e) = server.run(config.host, config.port).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
