//! Error types for the HTTP surface.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use sanctuary_core::WorkspaceError;
use serde::Serialize;

/// Application-level errors.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("Preview unavailable on {addr}: {reason}")]
    PreviewUnavailable { addr: String, reason: String },

    #[error(transparent)]
    Workspace(#[from] WorkspaceError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ServerError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            ServerError::PreviewUnavailable { .. } => {
                (StatusCode::SERVICE_UNAVAILABLE, "PREVIEW_UNAVAILABLE")
            }
            ServerError::Workspace(err) => match err {
                WorkspaceError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
                WorkspaceError::AlreadyExists(_) => (StatusCode::CONFLICT, "ALREADY_EXISTS"),
                WorkspaceError::PermissionDenied(_) => {
                    (StatusCode::FORBIDDEN, "PERMISSION_DENIED")
                }
                WorkspaceError::NotADirectory(_) => (StatusCode::BAD_REQUEST, "NOT_A_DIRECTORY"),
                WorkspaceError::InvalidPath(_) => (StatusCode::BAD_REQUEST, "INVALID_PATH"),
                WorkspaceError::Io { .. } => (StatusCode::INTERNAL_SERVER_ERROR, "IO_ERROR"),
            },
            ServerError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        #[derive(Serialize)]
        struct ErrorBody {
            error: String,
            code: &'static str,
        }

        let (status, code) = self.status_and_code();
        let body = ErrorBody {
            error: self.to_string(),
            code,
        };

        (status, axum::Json(body)).into_response()
    }
}

pub type Result<T> = std::result::Result<T, ServerError>;
