//! Client execution logic with reconnection support.

use std::time::Duration;

use super::{error::ClientError, session::run_client_session};

const MAX_RECONNECT_ATTEMPTS: u32 = 5;
const RECONNECT_INTERVAL_SECS: u64 = 5;

/// Run the chat client with reconnection logic
///
/// Reconnects after a lost stream up to [`MAX_RECONNECT_ATTEMPTS`] times.
/// Errors that reconnecting cannot fix, such as an unknown room, are returned
/// immediately.
pub async fn run_client(url: String, room_id: String, nickname: String) -> Result<(), ClientError> {
    let mut reconnect_count = 0;

    loop {
        tracing::info!(
            "Attempting to connect to {} as '{}' in room '{}' (attempt {}/{})",
            url,
            nickname,
            room_id,
            reconnect_count + 1,
            MAX_RECONNECT_ATTEMPTS
        );

        match run_client_session(&url, &room_id, &nickname).await {
            Ok(()) => {
                tracing::info!("Client session ended normally");
                return Ok(());
            }
            Err(e) if !e.is_retryable() => return Err(e),
            Err(e) => {
                tracing::warn!("Connection lost: {}", e);
                reconnect_count += 1;

                if reconnect_count >= MAX_RECONNECT_ATTEMPTS {
                    tracing::error!(
                        "Failed to reconnect after {} attempts. Exiting.",
                        MAX_RECONNECT_ATTEMPTS
                    );
                    return Err(e);
                }

                tracing::info!(
                    "Reconnecting in {} seconds... (attempt {}/{})",
                    RECONNECT_INTERVAL_SECS,
                    reconnect_count + 1,
                    MAX_RECONNECT_ATTEMPTS
                );

                tokio::time::sleep(Duration::from_secs(RECONNECT_INTERVAL_SECS)).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chatroom_server::{
        chatroom::{RoomRegistry, SubscriberConfig},
        domain::{RoomId, RoomTitle},
        infrastructure::repository::InMemoryUserRepository,
        ui::Server,
    };
    use chatroom_shared::time::SystemClock;

    use super::*;

    async fn start_server() -> String {
        let clock = Arc::new(SystemClock);
        let registry = Arc::new(RoomRegistry::new(SubscriberConfig::default(), clock.clone()));
        registry
            .create_room(
                RoomId::new("general".to_string()).unwrap(),
                RoomTitle::new("General".to_string()).unwrap(),
            )
            .await
            .unwrap();
        let server = Server::new(
            registry,
            Arc::new(InMemoryUserRepository::new()),
            clock,
            None,
        );

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}", listener.local_addr().unwrap());
        tokio::spawn(server.serve(listener, std::future::pending()));
        url
    }

    #[tokio::test]
    async fn test_unknown_room_is_not_retried() {
        // テスト項目: 存在しないルームでは再接続せず即座にエラーを返す
        // given (前提条件):
        let url = start_server().await;

        // when (操作):
        let result = tokio::time::timeout(
            Duration::from_secs(RECONNECT_INTERVAL_SECS - 1),
            run_client(url, "nowhere".to_string(), "alice".to_string()),
        )
        .await
        .expect("client retried instead of giving up");

        // then (期待する結果):
        assert!(matches!(result, Err(ClientError::RoomNotFound(room)) if room == "nowhere"));
    }

    #[test]
    fn test_only_connection_errors_are_retryable() {
        // テスト項目: 接続エラーのみが再接続の対象になる
        // given (前提条件):
        let lost = ClientError::ConnectionError("Connection lost".to_string());
        let not_found = ClientError::RoomNotFound("nowhere".to_string());
        let rejected = ClientError::Rejected {
            status: 400,
            message: "invalid request".to_string(),
        };

        // when (操作):

        // then (期待する結果):
        assert!(lost.is_retryable());
        assert!(!not_found.is_retryable());
        assert!(!rejected.is_retryable());
    }
}
