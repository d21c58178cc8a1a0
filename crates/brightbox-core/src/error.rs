//! Error types for Brightbox API operations.
//!
//! This module provides the error hierarchy shared by every Brightbox service
//! crate, including the classification of failed API responses.

use reqwest::StatusCode;
use thiserror::Error;

/// Main error type for Brightbox API operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// Credentials were rejected during token exchange or request handling
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    /// A provider payload did not match the documented schema
    #[error("Schema violation in {entity}: {detail}")]
    SchemaViolation {
        /// Entity being normalized when the violation was detected
        entity: &'static str,
        /// Description of the missing or mistyped field
        detail: String,
    },

    /// The API reported a failure for an otherwise well-formed request
    #[error("Operation failed: {status}: {body}")]
    OperationFailed {
        /// HTTP status returned by the API
        status: StatusCode,
        /// Raw response body, preserved for diagnostics
        body: String,
    },

    /// Operation is not supported by this provider
    #[error("Unsupported operation: {0}")]
    Unsupported(&'static str),

    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Http(String),

    /// Operation timed out
    #[error("Timeout waiting for response: {0}")]
    Timeout(String),

    /// Failed to decode an API response body
    #[error("Failed to decode API response: {0}")]
    Decode(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid endpoint
    #[error("Invalid endpoint: {0}")]
    InvalidEndpoint(String),

    /// Invalid resource identifier
    #[error("Invalid resource identifier: {0}")]
    InvalidId(String),
}

/// Specialized result type for Brightbox API operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Returns the error code for this error type.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::AuthenticationFailed(_) => "AUTHENTICATION_FAILED",
            Self::SchemaViolation { .. } => "SCHEMA_VIOLATION",
            Self::OperationFailed { .. } => "OPERATION_FAILED",
            Self::Unsupported(_) => "UNSUPPORTED_OPERATION",
            Self::Http(_) => "HTTP_ERROR",
            Self::Timeout(_) => "TIMEOUT",
            Self::Decode(_) => "DECODE_ERROR",
            Self::Config(_) => "CONFIG_ERROR",
            Self::InvalidEndpoint(_) => "INVALID_ENDPOINT",
            Self::InvalidId(_) => "INVALID_ID",
        }
    }

    /// Returns true if this error indicates rejected credentials.
    #[must_use]
    pub const fn is_authentication(&self) -> bool {
        matches!(self, Self::AuthenticationFailed(_))
    }

    /// Builds a schema violation for the named entity.
    #[must_use]
    pub fn schema(entity: &'static str, detail: impl Into<String>) -> Self {
        Self::SchemaViolation {
            entity,
            detail: detail.into(),
        }
    }
}

// Conversions from external error types
impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout(err.to_string())
        } else {
            Self::Http(err.to_string())
        }
    }
}

impl From<url::ParseError> for Error {
    fn from(err: url::ParseError) -> Self {
        Self::InvalidEndpoint(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(err.to_string())
    }
}

impl From<validator::ValidationErrors> for Error {
    fn from(err: validator::ValidationErrors) -> Self {
        Self::Config(err.to_string())
    }
}
