//! Error types for Precis services
//!
//! Provides a comprehensive error handling system with:
//! - Distinct error types for different failure modes
//! - HTTP status code mapping
//! - Structured error responses
//! - Error codes for client handling

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias using AppError
pub type Result<T> = std::result::Result<T, AppError>;

/// Error codes for machine-readable error identification
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // Validation errors (1xxx)
    ValidationError,
    InvalidFormat,
    PayloadTooLarge,

    // Authentication errors (2xxx)
    Unauthorized,
    InvalidToken,
    ExpiredToken,
    InvalidCredentials,

    // Resource errors (4xxx)
    ContentNotFound,
    UserNotFound,

    // Conflict errors (5xxx)
    DuplicateUsername,

    // Rate limiting (6xxx)
    RateLimited,

    // Database errors (7xxx)
    DatabaseError,
    ConnectionError,

    // Document and external service errors (8xxx)
    ExtractionFailed,
    ExportFailed,
    ModelError,
    StorageError,

    // Internal errors (9xxx)
    InternalError,
    ConfigurationError,
}

impl ErrorCode {
    /// Get the numeric code for this error
    pub fn as_code(&self) -> u16 {
        match self {
            // Validation (1xxx)
            ErrorCode::ValidationError => 1001,
            ErrorCode::InvalidFormat => 1002,
            ErrorCode::PayloadTooLarge => 1003,

            // Auth (2xxx)
            ErrorCode::Unauthorized => 2001,
            ErrorCode::InvalidToken => 2002,
            ErrorCode::ExpiredToken => 2003,
            ErrorCode::InvalidCredentials => 2004,

            // Resources (4xxx)
            ErrorCode::ContentNotFound => 4001,
            ErrorCode::UserNotFound => 4002,

            // Conflicts (5xxx)
            ErrorCode::DuplicateUsername => 5001,

            // Rate limits (6xxx)
            ErrorCode::RateLimited => 6001,

            // Database (7xxx)
            ErrorCode::DatabaseError => 7001,
            ErrorCode::ConnectionError => 7002,

            // Documents & external (8xxx)
            ErrorCode::ExtractionFailed => 8001,
            ErrorCode::ExportFailed => 8002,
            ErrorCode::ModelError => 8003,
            ErrorCode::StorageError => 8004,

            // Internal (9xxx)
            ErrorCode::InternalError => 9001,
            ErrorCode::ConfigurationError => 9002,
        }
    }
}

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    // Validation errors
    #[error("{message}")]
    Validation {
        message: String,
        field: Option<String>
    },

    #[error("Invalid format: {message}")]
    InvalidFormat { message: String },

    #[error("Payload too large: request body exceeds limit of {limit} bytes")]
    PayloadTooLarge { limit: usize },

    // Authentication errors
    #[error("Unauthorized: {message}")]
    Unauthorized { message: String },

    #[error("Invalid token")]
    InvalidToken,

    #[error("Token expired")]
    ExpiredToken,

    #[error("No active account found with the given credentials")]
    InvalidCredentials,

    // Resource errors
    #[error("Content not found: {id}")]
    ContentNotFound { id: i32 },

    #[error("User not found: {id}")]
    UserNotFound { id: i32 },

    // Conflict errors
    #[error("A user with that username already exists: {username}")]
    DuplicateUsername { username: String },

    // Rate limiting
    #[error("Rate limit exceeded: {limit} requests per second")]
    RateLimited { limit: u32 },

    // Database errors
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    #[error("Database connection error: {message}")]
    DatabaseConnection { message: String },

    // Document errors
    #[error("Text extraction failed: {message}")]
    ExtractionFailed { message: String },

    #[error("Export failed: {message}")]
    ExportFailed { message: String },

    // External service errors
    #[error("Generative model error: {message}")]
    ModelError { message: String },

    #[error("Storage error: {message}")]
    Storage { message: String },

    // Internal errors
    #[error("Internal server error: {message}")]
    Internal { message: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },
}

impl AppError {
    /// Shorthand for a request validation failure
    pub fn validation(message: impl Into<String>) -> Self {
        AppError::Validation {
            message: message.into(),
            field: None,
        }
    }

    /// Get the error code for this error
    pub fn code(&self) -> ErrorCode {
        match self {
            AppError::Validation { .. } => ErrorCode::ValidationError,
            AppError::InvalidFormat { .. } => ErrorCode::InvalidFormat,
            AppError::PayloadTooLarge { .. } => ErrorCode::PayloadTooLarge,
            AppError::Unauthorized { .. } => ErrorCode::Unauthorized,
            AppError::InvalidToken => ErrorCode::InvalidToken,
            AppError::ExpiredToken => ErrorCode::ExpiredToken,
            AppError::InvalidCredentials => ErrorCode::InvalidCredentials,
            AppError::ContentNotFound { .. } => ErrorCode::ContentNotFound,
            AppError::UserNotFound { .. } => ErrorCode::UserNotFound,
            AppError::DuplicateUsername { .. } => ErrorCode::DuplicateUsername,
            AppError::RateLimited { .. } => ErrorCode::RateLimited,
            AppError::Database(_) => ErrorCode::DatabaseError,
            AppError::DatabaseConnection { .. } => ErrorCode::ConnectionError,
            AppError::ExtractionFailed { .. } => ErrorCode::ExtractionFailed,
            AppError::ExportFailed { .. } => ErrorCode::ExportFailed,
            AppError::ModelError { .. } => ErrorCode::ModelError,
            AppError::Storage { .. } => ErrorCode::StorageError,
            AppError::Internal { .. } => ErrorCode::InternalError,
            AppError::Configuration { .. } => ErrorCode::ConfigurationError,
        }
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            // 400 Bad Request
            AppError::Validation { .. } |
            AppError::InvalidFormat { .. } => StatusCode::BAD_REQUEST,

            // 401 Unauthorized
            AppError::Unauthorized { .. } |
            AppError::InvalidToken |
            AppError::ExpiredToken |
            AppError::InvalidCredentials => StatusCode::UNAUTHORIZED,

            // 404 Not Found
            AppError::ContentNotFound { .. } |
            AppError::UserNotFound { .. } => StatusCode::NOT_FOUND,

            // 409 Conflict
            AppError::DuplicateUsername { .. } => StatusCode::CONFLICT,

            // 413 Payload Too Large
            AppError::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,

            // 422 Unprocessable Entity
            AppError::ExtractionFailed { .. } => StatusCode::UNPROCESSABLE_ENTITY,

            // 429 Too Many Requests
            AppError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,

            // 500 Internal Server Error
            AppError::Database(_) |
            AppError::DatabaseConnection { .. } |
            AppError::ExportFailed { .. } |
            AppError::Storage { .. } |
            AppError::Internal { .. } |
            AppError::Configuration { .. } => StatusCode::INTERNAL_SERVER_ERROR,

            // 502 Bad Gateway
            AppError::ModelError { .. } => StatusCode::BAD_GATEWAY,
        }
    }

    /// Check if this error should be logged at error level
    pub fn is_server_error(&self) -> bool {
        self.status_code().is_server_error()
    }

    /// Check if this error is a client error
    pub fn is_client_error(&self) -> bool {
        self.status_code().is_client_error()
    }
}

/// Structured error response for API
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorDetails,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorDetails {
    pub code: ErrorCode,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let code = self.code();
        let message = self.to_string();

        // Log based on severity
        if self.is_server_error() {
            tracing::error!(
                error = %message,
                code = ?code,
                status = status.as_u16(),
                "Server error"
            );
        } else if self.is_client_error() {
            tracing::warn!(
                error = %message,
                code = ?code,
                status = status.as_u16(),
                "Client error"
            );
        }

        let details = match &self {
            AppError::Validation { field: Some(field), .. } => {
                Some(serde_json::json!({ "field": field }))
            }
            _ => None,
        };

        let body = ErrorResponse {
            error: ErrorDetails {
                code,
                message,
                details,
                request_id: None,
            },
        };

        (status, Json(body)).into_response()
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::InvalidFormat {
            message: rejection.body_text(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_mapping() {
        let err = AppError::ContentNotFound { id: 7 };
        assert_eq!(err.code(), ErrorCode::ContentNotFound);
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_validation_error() {
        let err = AppError::validation("Either file or text must be provided.");
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.to_string(), "Either file or text must be provided.");
        assert!(!err.is_server_error());
        assert!(err.is_client_error());
    }

    #[test]
    fn test_extraction_is_unprocessable() {
        let err = AppError::ExtractionFailed { message: "bad xref".into() };
        assert_eq!(err.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(err.code().as_code(), 8001);
    }

    #[test]
    fn test_domain_status_mapping() {
        let cases = [
            (AppError::DuplicateUsername { username: "a".into() }, StatusCode::CONFLICT),
            (AppError::PayloadTooLarge { limit: 10 }, StatusCode::PAYLOAD_TOO_LARGE),
            (AppError::RateLimited { limit: 5 }, StatusCode::TOO_MANY_REQUESTS),
            (AppError::ModelError { message: "quota".into() }, StatusCode::BAD_GATEWAY),
            (AppError::Storage { message: "disk".into() }, StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, status) in cases {
            assert_eq!(err.status_code(), status, "{}", err);
        }
    }

    #[test]
    fn test_server_error() {
        let err = AppError::Internal {
            message: "Something went wrong".into()
        };
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(err.is_server_error());
    }
}
