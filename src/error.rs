use axum::{Json, extract::rejection::JsonRejection, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use thiserror::Error;

use crate::dao::storage::StorageError;

/// Errors that can occur in service layer operations.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Invalid input provided by the client.
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// Requested resource was not found.
    #[error("not found: {0}")]
    NotFound(String),
    /// The storage backend failed; `message` is safe to show to clients.
    #[error("{message}")]
    Storage {
        message: String,
        #[source]
        source: StorageError,
    },
}

impl ServiceError {
    /// Wrap a storage failure with the message reported to clients.
    pub fn storage(message: impl Into<String>, source: StorageError) -> Self {
        ServiceError::Storage {
            message: message.into(),
            source,
        }
    }
}

/// Application-level errors that are converted to HTTP responses.
#[derive(Debug, Error)]
pub enum AppError {
    /// Bad request with invalid input.
    #[error("bad request: {0}")]
    BadRequest(String),
    /// Requested resource not found.
    #[error("not found: {0}")]
    NotFound(String),
    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn into_message(self) -> String {
        match self {
            AppError::BadRequest(message)
            | AppError::NotFound(message)
            | AppError::Internal(message) => message,
        }
    }
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::InvalidInput(message) => AppError::BadRequest(message),
            ServiceError::NotFound(message) => AppError::NotFound(message),
            ServiceError::Storage { message, .. } => AppError::Internal(message),
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status();
        let payload = Json(ErrorBody {
            error: self.into_message(),
        });

        (status, payload).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn storage_failures_map_to_internal_with_client_message() {
        let source = StorageError::new("mongodb", std::io::Error::other("connection reset"));
        let err: AppError = ServiceError::storage("Failed to fetch games", source).into();

        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.into_message(), "Failed to fetch games");
    }

    #[test]
    fn invalid_input_maps_to_bad_request() {
        let err: AppError = ServiceError::InvalidInput("Game name is required".into()).into();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }
}
