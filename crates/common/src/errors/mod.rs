//! Error types for Pagewise
//!
//! Provides a comprehensive error handling system with:
//! - Distinct error types for different failure modes
//! - HTTP status code mapping
//! - Structured error responses
//! - Error codes for client handling
//!
//! Blank questions, unknown intent labels and insufficient context are
//! answer states, not errors. Only upstream capability failures and
//! malformed requests end up here.

use axum::{
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
    EmptyDocument,

    // Resource errors (4xxx)
    DocumentNotLoaded,

    // External service errors (8xxx)
    GenerationError,
    RetrievalError,
    EmbeddingError,
    UpstreamTimeout,

    // Internal errors (9xxx)
    InternalError,
    ConfigurationError,
    SerializationError,
}

impl ErrorCode {
    /// Get the numeric code for this error
    pub fn as_code(&self) -> u16 {
        match self {
            // Validation (1xxx)
            ErrorCode::ValidationError => 1001,
            ErrorCode::InvalidFormat => 1003,
            ErrorCode::EmptyDocument => 1004,

            // Resources (4xxx)
            ErrorCode::DocumentNotLoaded => 4002,

            // External (8xxx)
            ErrorCode::GenerationError => 8002,
            ErrorCode::RetrievalError => 8003,
            ErrorCode::EmbeddingError => 8004,
            ErrorCode::UpstreamTimeout => 8005,

            // Internal (9xxx)
            ErrorCode::InternalError => 9001,
            ErrorCode::ConfigurationError => 9002,
            ErrorCode::SerializationError => 9003,
        }
    }
}

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    // Validation errors
    #[error("Validation failed: {message}")]
    Validation {
        message: String,
        field: Option<String>,
    },

    #[error("Invalid format: {message}")]
    InvalidFormat { message: String },

    #[error("Document contains no readable text: {source_name}")]
    EmptyDocument { source_name: String },

    // Resource errors
    #[error("No document has been ingested")]
    DocumentNotLoaded,

    // External capability errors
    #[error("Generation service error: {message}")]
    GenerationError { message: String },

    #[error("Retrieval service error: {message}")]
    RetrievalError { message: String },

    #[error("Embedding service error: {message}")]
    EmbeddingError { message: String },

    #[error("{operation} timed out after {timeout_ms}ms")]
    UpstreamTimeout { operation: String, timeout_ms: u64 },

    // Internal errors
    #[error("Internal server error: {message}")]
    Internal { message: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl AppError {
    /// Get the error code for this error
    pub fn code(&self) -> ErrorCode {
        match self {
            AppError::Validation { .. } => ErrorCode::ValidationError,
            AppError::InvalidFormat { .. } => ErrorCode::InvalidFormat,
            AppError::EmptyDocument { .. } => ErrorCode::EmptyDocument,
            AppError::DocumentNotLoaded => ErrorCode::DocumentNotLoaded,
            AppError::GenerationError { .. } => ErrorCode::GenerationError,
            AppError::RetrievalError { .. } => ErrorCode::RetrievalError,
            AppError::EmbeddingError { .. } => ErrorCode::EmbeddingError,
            AppError::UpstreamTimeout { .. } => ErrorCode::UpstreamTimeout,
            AppError::Internal { .. } => ErrorCode::InternalError,
            AppError::Configuration { .. } => ErrorCode::ConfigurationError,
            AppError::Serialization(_) => ErrorCode::SerializationError,
        }
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            // 400 Bad Request
            AppError::Validation { .. } | AppError::InvalidFormat { .. } => StatusCode::BAD_REQUEST,

            // 404 Not Found
            AppError::DocumentNotLoaded => StatusCode::NOT_FOUND,

            // 422 Unprocessable Entity
            AppError::EmptyDocument { .. } => StatusCode::UNPROCESSABLE_ENTITY,

            // 500 Internal Server Error
            AppError::Internal { .. }
            | AppError::Configuration { .. }
            | AppError::Serialization(_) => StatusCode::INTERNAL_SERVER_ERROR,

            // 502 Bad Gateway
            AppError::GenerationError { .. }
            | AppError::RetrievalError { .. }
            | AppError::EmbeddingError { .. } => StatusCode::BAD_GATEWAY,

            // 504 Gateway Timeout
            AppError::UpstreamTimeout { .. } => StatusCode::GATEWAY_TIMEOUT,
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

    /// Whether the failure originated in an external capability
    pub fn is_upstream(&self) -> bool {
        self.code().as_code() / 1000 == 8
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
            },
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_mapping() {
        let err = AppError::DocumentNotLoaded;
        assert_eq!(err.code(), ErrorCode::DocumentNotLoaded);
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_validation_error() {
        let err = AppError::Validation {
            message: "Question too long".into(),
            field: Some("question".into()),
        };
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert!(!err.is_server_error());
        assert!(err.is_client_error());
    }

    #[test]
    fn test_upstream_errors_are_server_errors() {
        let generation = AppError::GenerationError {
            message: "connection refused".into(),
        };
        assert_eq!(generation.status_code(), StatusCode::BAD_GATEWAY);
        assert!(generation.is_server_error());
        assert!(generation.is_upstream());

        let timeout = AppError::UpstreamTimeout {
            operation: "question".into(),
            timeout_ms: 60_000,
        };
        assert_eq!(timeout.status_code(), StatusCode::GATEWAY_TIMEOUT);
        assert!(timeout.is_upstream());
    }

    #[test]
    fn test_codes_stay_in_their_family() {
        let retrieval = AppError::RetrievalError {
            message: "index offline".into(),
        };
        assert_eq!(retrieval.code().as_code(), 8003);
        assert_eq!(AppError::DocumentNotLoaded.code().as_code(), 4002);
        let empty = AppError::EmptyDocument {
            source_name: "scan.pdf".into(),
        };
        assert_eq!(empty.code().as_code() / 1000, 1);
        assert_eq!(empty.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn test_internal_error_is_not_upstream() {
        let err = AppError::Internal {
            message: "Something went wrong".into(),
        };
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!err.is_upstream());
    }
}
