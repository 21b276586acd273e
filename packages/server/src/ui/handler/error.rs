//! Mapping of domain errors onto HTTP responses.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::domain::{RoomError, ValueObjectError};

/// Error returned by the HTTP handlers
#[derive(Debug, Error)]
pub enum HandlerError {
    /// Query or body failed validation
    #[error("invalid request: {0}")]
    InvalidInput(#[from] ValueObjectError),

    /// JSON body was missing, malformed or had the wrong fields
    #[error("invalid request body: {0}")]
    InvalidBody(#[from] JsonRejection),

    /// Room lookup or delivery failed
    #[error(transparent)]
    Room(#[from] RoomError),
}

impl HandlerError {
    fn status(&self) -> StatusCode {
        match self {
            HandlerError::InvalidInput(_) | HandlerError::InvalidBody(_) => {
                StatusCode::BAD_REQUEST
            }
            HandlerError::Room(RoomError::NotFound(_)) => StatusCode::NOT_FOUND,
            HandlerError::Room(RoomError::AlreadyExists(_)) => StatusCode::CONFLICT,
            HandlerError::Room(RoomError::Closed(_)) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

impl IntoResponse for HandlerError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("Request failed: {}", self);
        } else {
            tracing::warn!("Request rejected: {}", self);
        }
        (status, format!("{}\n", self)).into_response()
    }
}
