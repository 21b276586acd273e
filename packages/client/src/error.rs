//! Error types for the chat client.

use thiserror::Error;

/// Client-specific errors
#[derive(Debug, Error)]
pub enum ClientError {
    /// The room does not exist on the server
    #[error("Room '{0}' not found")]
    RoomNotFound(String),

    /// The server refused the request
    #[error("Request rejected ({status}): {message}")]
    Rejected { status: u16, message: String },

    /// Connection error
    #[error("Connection error: {0}")]
    ConnectionError(String),
}

impl From<reqwest::Error> for ClientError {
    fn from(e: reqwest::Error) -> Self {
        ClientError::ConnectionError(e.to_string())
    }
}

impl ClientError {
    /// Whether reconnecting could help
    pub fn is_retryable(&self) -> bool {
        matches!(self, ClientError::ConnectionError(_))
    }
}
