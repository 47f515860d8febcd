use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Result type alias using AppError
pub type Result<T> = std::result::Result<T, AppError>;

/// Unique error codes for client identification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    // Store errors (1xxx)
    StoreError = 1001,

    // Validation errors (2xxx)
    ValidationFailed = 2001,
    InvalidFormat = 2003,
    MissingField = 2004,

    // Event bus errors (5xxx)
    EventBusError = 5001,

    // Resource errors (6xxx)
    NotFound = 6001,
    AlreadyExists = 6002,

    // Internal errors (9xxx)
    InternalError = 9001,
    ConfigurationError = 9002,
}

impl ErrorCode {
    pub fn as_u16(&self) -> u16 {
        *self as u16
    }
}

/// Application error taxonomy.
///
/// Validation errors are produced before any I/O; store errors are normalized
/// at the handler boundary unless they are a recognized not-found/duplicate;
/// event bus errors never propagate past the publisher itself.
#[derive(Error, Debug)]
pub enum AppError {
    // Validation errors
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    #[error("Missing required field: {0}")]
    MissingField(String),

    // Resource errors
    #[error("Resource not found: {resource_type} with id {resource_id}")]
    NotFound {
        resource_type: String,
        resource_id: String,
    },

    #[error("Resource already exists: {0}")]
    AlreadyExists(String),

    // Store errors
    #[error("Store error: {0}")]
    Store(String),

    // Event bus errors
    #[error("Event bus error: {0}")]
    EventBus(String),

    // Internal errors
    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),
}

impl AppError {
    /// NotFound error for an article id
    pub fn article_not_found(id: impl ToString) -> Self {
        Self::NotFound {
            resource_type: "article".to_string(),
            resource_id: id.to_string(),
        }
    }

    /// Get the error code for this error type
    pub fn error_code(&self) -> ErrorCode {
        match self {
            Self::Validation(_) => ErrorCode::ValidationFailed,
            Self::InvalidFormat(_) => ErrorCode::InvalidFormat,
            Self::MissingField(_) => ErrorCode::MissingField,
            Self::NotFound { .. } => ErrorCode::NotFound,
            Self::AlreadyExists(_) => ErrorCode::AlreadyExists,
            Self::Store(_) => ErrorCode::StoreError,
            Self::EventBus(_) => ErrorCode::EventBusError,
            Self::Internal(_) => ErrorCode::InternalError,
            Self::Config(_) => ErrorCode::ConfigurationError,
        }
    }

    /// Get HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) | Self::InvalidFormat(_) | Self::MissingField(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::AlreadyExists(_) => StatusCode::CONFLICT,
            Self::Store(_) | Self::EventBus(_) | Self::Internal(_) | Self::Config(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    pub fn is_server_error(&self) -> bool {
        self.status_code().is_server_error()
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let error_code = self.error_code();

        // Server-side failures are logged in full and the wire message is
        // replaced with a generic one; client errors keep their message.
        let message = if self.is_server_error() {
            tracing::error!(
                error_code = error_code.as_u16(),
                error = ?self,
                "Server error"
            );
            "Internal server error".to_string()
        } else {
            let message = self.to_string();
            tracing::debug!(error_code = error_code.as_u16(), %message, "Client error");
            message
        };

        let body = Json(json!({
            "error": {
                "code": error_code.as_u16(),
                "status": status.as_u16(),
                "message": message,
            }
        }));

        (status, body).into_response()
    }
}
