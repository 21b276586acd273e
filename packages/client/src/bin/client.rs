//! Chat client that tails a room and posts stdin lines to it.
//!
//! Prints every join, leave and message of the room, and sends each line typed
//! at the `nickname>` prompt. Reconnects automatically when the stream is lost
//! (max 5 attempts with 5 second interval). Exits at once if the room does not
//! exist.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin chatroom-client -- --nickname alice
//! cargo run --bin chatroom-client -- -n bob -r random -u http://127.0.0.1:7072
//! ```

use chatroom_shared::logger::setup_logger;
use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "chatroom-client")]
#[command(about = "Chat client for the streaming chatroom server", long_about = None)]
struct Args {
    /// Nickname shown to the other members
    #[arg(short = 'n', long)]
    nickname: String,

    /// Room to join
    #[arg(short = 'r', long, default_value = "general")]
    room: String,

    /// Server base URL
    #[arg(short = 'u', long, default_value = "http://127.0.0.1:7072")]
    url: String,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    setup_logger("chatroom_client", env!("CARGO_BIN_NAME"), "info");

    let args = Args::parse();

    // Run the client
    if let Err(e) = chatroom_client::run_client(args.url, args.room, args.nickname).await {
        tracing::error!("Client error: {}", e);
        std::process::exit(1);
    }
}
