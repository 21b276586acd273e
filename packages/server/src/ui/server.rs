//! Server execution logic.

use std::{future::Future, sync::Arc, time::Duration};

use axum::{
    Router,
    routing::{get, post},
};
use chatroom_shared::time::Clock;
use tokio::{net::TcpListener, sync::watch};
use tower_http::trace::TraceLayer;

use crate::{chatroom::RoomRegistry, domain::UserRepository};

use super::{
    handler::{
        chat_list, chat_stream, create_room, get_room_detail, get_rooms, health_check, leave,
        say,
    },
    signal::shutdown_signal,
    state::AppState,
};

/// Streaming chat server
///
/// Owns the shared [`AppState`] and the sender half of the shutdown flag that
/// every open stream watches.
///
/// # Example
///
/// ```ignore
/// let server = Server::new(registry, users, clock, None);
/// server.run("127.0.0.1".to_string(), 7072).await?;
/// ```
pub struct Server {
    state: Arc<AppState>,
    shutdown_tx: watch::Sender<bool>,
}

impl Server {
    /// Create a new Server instance
    ///
    /// # Arguments
    ///
    /// * `registry` - Rooms served by this process
    /// * `users` - Repository of known nicknames
    /// * `clock` - Source of message and activity timestamps
    /// * `idle_timeout` - Close streams that receive nothing for this long
    pub fn new(
        registry: Arc<RoomRegistry>,
        users: Arc<dyn UserRepository>,
        clock: Arc<dyn Clock>,
        idle_timeout: Option<Duration>,
    ) -> Self {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let state = Arc::new(AppState::new(
            registry,
            users,
            clock,
            idle_timeout,
            shutdown_rx,
        ));

        Self { state, shutdown_tx }
    }

    /// Build the router with every endpoint attached.
    pub fn router(&self) -> Router {
        Router::new()
            // ストリーミングエンドポイント
            .route("/chat", get(chat_stream))
            .route("/chat/say", get(say).post(say))
            .route("/chat/leave", post(leave))
            .route("/chatlist", get(chat_list))
            // HTTP API エンドポイント
            .route("/api/health", get(health_check))
            .route("/api/rooms", get(get_rooms).post(create_room))
            .route("/api/rooms/{room_id}", get(get_room_detail))
            .layer(TraceLayer::new_for_http())
            .with_state(self.state.clone())
    }

    /// Run the chat server until Ctrl+C or SIGTERM
    ///
    /// # Errors
    ///
    /// Returns an error if the server fails to bind to the specified address or
    /// if there's an error during server execution.
    pub async fn run(self, host: String, port: u16) -> Result<(), Box<dyn std::error::Error>> {
        let bind_addr = format!("{}:{}", host, port);
        let listener = TcpListener::bind(&bind_addr).await?;

        tracing::info!("Chat server listening on {}", listener.local_addr()?);
        tracing::info!(
            "Stream a room with: curl -N 'http://{}/chat?roomID=general&nickname=alice'",
            bind_addr
        );
        tracing::info!("Press Ctrl+C to shutdown gracefully");

        self.serve(listener, shutdown_signal()).await?;

        tracing::info!("Server shutdown complete");
        Ok(())
    }

    /// Serve on an already bound listener until `signal` resolves.
    ///
    /// Open streams are told to finish once `signal` fires, so the graceful
    /// shutdown does not wait on them forever.
    pub async fn serve<F>(self, listener: TcpListener, signal: F) -> std::io::Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let app = self.router();
        let shutdown_tx = self.shutdown_tx;

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                signal.await;
                tracing::info!("Closing open streams");
                shutdown_tx.send_replace(true);
            })
            .await
    }
}
