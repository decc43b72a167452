/// Server error types
use crate::services::storage::SourceError;
use crate::streaming::RangeError;
use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ServerError>;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Access denied: {0}")]
    Forbidden(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Track not found: {0}")]
    TrackNotFound(String),

    /// `size` is known once the blob has been opened
    #[error("Range not satisfiable: {source}")]
    RangeNotSatisfiable {
        size: Option<u64>,
        #[source]
        source: RangeError,
    },

    #[error("Storage error: {0}")]
    Source(#[from] SourceError),

    #[error("Catalog error: {0}")]
    Database(#[from] cratedrop_core::CrateError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("JWT error: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),
}

impl ServerError {
    pub fn range(source: RangeError, size: Option<u64>) -> Self {
        Self::RangeNotSatisfiable { size, source }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ServerError::Auth(_) | ServerError::Jwt(_) => StatusCode::UNAUTHORIZED,
            ServerError::Forbidden(_) => StatusCode::FORBIDDEN,
            ServerError::NotFound(_) | ServerError::TrackNotFound(_) => StatusCode::NOT_FOUND,
            ServerError::RangeNotSatisfiable { .. } => StatusCode::RANGE_NOT_SATISFIABLE,
            ServerError::Source(_)
            | ServerError::Database(_)
            | ServerError::Config(_)
            | ServerError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status();
        let (code, message) = match self {
            ServerError::Auth(msg) => ("unauthorized", msg),
            ServerError::Forbidden(msg) => ("access_denied", msg),
            ServerError::NotFound(msg) => ("not_found", msg),
            ServerError::TrackNotFound(_) => ("track_not_found", "Track not found".to_string()),
            ServerError::RangeNotSatisfiable { size, source } => {
                tracing::debug!(?size, "Rejected range: {}", source);
                let body = Json(json!({
                    "error": { "code": "range_not_satisfiable", "message": source.to_string() },
                }));
                let mut response = (status, body).into_response();
                if let Some(size) = size {
                    if let Ok(value) = HeaderValue::from_str(&format!("bytes */{size}")) {
                        response.headers_mut().insert(header::CONTENT_RANGE, value);
                    }
                }
                return response;
            }
            ServerError::Source(ref e) => {
                tracing::error!("Storage error: {}", e);
                ("server_error", "Failed to read audio".to_string())
            }
            ServerError::Database(ref e) => {
                tracing::error!("Catalog error: {:?}", e);
                ("server_error", "Database error".to_string())
            }
            ServerError::Config(ref msg) => {
                tracing::error!("Config error: {}", msg);
                ("server_error", "Configuration error".to_string())
            }
            ServerError::Internal(ref msg) => {
                tracing::error!("Internal error: {}", msg);
                ("server_error", "Internal server error".to_string())
            }
            ServerError::Jwt(ref e) => {
                tracing::warn!("JWT error: {:?}", e);
                ("invalid_token", "Invalid access token".to_string())
            }
        };

        let body = Json(json!({
            "error": { "code": code, "message": message },
        }));

        (status, body).into_response()
    }
}
