//! Error types and HTTP response conversion

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::fmt;
use thiserror::Error;

use crate::responses::Message;

/// Body returned for rejected goal text
pub const INVALID_GOAL_TEXT: &str = "Invalid goal text.";

// ============================================================================
// Structured Store Errors
// ============================================================================

/// Store operation being performed when the error occurred
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreOperation {
    /// Establishing the store connection
    Connect,
    /// Inserting a goal
    Insert,
    /// Listing every goal
    List,
    /// Deleting a goal by id
    Delete,
}

impl StoreOperation {
    /// Fixed, caller-facing failure message for this operation
    pub fn failure_message(&self) -> &'static str {
        match self {
            Self::Connect => "Store unavailable.",
            Self::Insert => "Failed to save goal.",
            Self::List => "Failed to load goals.",
            Self::Delete => "Failed to delete goal.",
        }
    }
}

impl fmt::Display for StoreOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Connect => write!(f, "connect"),
            Self::Insert => write!(f, "insert"),
            Self::List => write!(f, "list"),
            Self::Delete => write!(f, "delete"),
        }
    }
}

/// Category of store error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreErrorKind {
    /// No connection string, or the connection attempt has not succeeded
    NotConnected,
    /// Failed to establish or keep the connection
    ConnectionFailed,
    /// Operation timed out in the driver
    Timeout,
    /// Authentication or permission failure
    PermissionDenied,
    /// Query was rejected or failed
    QueryFailed,
    /// Stored data did not match the expected shape
    Serialization,
    /// Other/unknown error
    Other,
}

impl fmt::Display for StoreErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotConnected => write!(f, "not_connected"),
            Self::ConnectionFailed => write!(f, "connection_failed"),
            Self::Timeout => write!(f, "timeout"),
            Self::PermissionDenied => write!(f, "permission_denied"),
            Self::QueryFailed => write!(f, "query_failed"),
            Self::Serialization => write!(f, "serialization"),
            Self::Other => write!(f, "other"),
        }
    }
}

/// Structured store error with operation context
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreError {
    /// The operation being performed when the error occurred
    pub operation: StoreOperation,
    /// The category of error
    pub kind: StoreErrorKind,
    /// Underlying cause, for server-side logs only
    pub message: String,
}

impl StoreError {
    /// Create a new store error
    pub fn new(operation: StoreOperation, kind: StoreErrorKind, message: impl Into<String>) -> Self {
        Self {
            operation,
            kind,
            message: message.into(),
        }
    }

    /// The store handle holds no client
    pub fn not_connected(operation: StoreOperation) -> Self {
        Self::new(
            operation,
            StoreErrorKind::NotConnected,
            "no store connection is available",
        )
    }

    /// Create a connection failed error
    pub fn connection_failed(message: impl Into<String>) -> Self {
        Self::new(
            StoreOperation::Connect,
            StoreErrorKind::ConnectionFailed,
            message,
        )
    }

    /// Classify a driver error raised during `operation`
    pub fn from_surreal(operation: StoreOperation, err: &surrealdb::Error) -> Self {
        let msg = err.to_string();
        let lower = msg.to_lowercase();

        let kind = if lower.contains("timeout") || lower.contains("timed out") {
            StoreErrorKind::Timeout
        } else if lower.contains("permission")
            || lower.contains("not allowed")
            || lower.contains("denied")
            || lower.contains("signin")
            || lower.contains("credentials")
        {
            StoreErrorKind::PermissionDenied
        } else if lower.contains("connect")
            || lower.contains("connection")
            || lower.contains("refused")
            || lower.contains("network")
        {
            StoreErrorKind::ConnectionFailed
        } else if lower.contains("deserializ") || lower.contains("serializ") {
            StoreErrorKind::Serialization
        } else if lower.contains("parse") || lower.contains("syntax") || lower.contains("query") {
            StoreErrorKind::QueryFailed
        } else {
            StoreErrorKind::Other
        };

        Self::new(operation, kind, msg)
    }
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Store {} error during {}: {}",
            self.kind, self.operation, self.message
        )
    }
}

impl std::error::Error for StoreError {}

/// Result type for store operations
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Result type alias using the service error
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the service
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(Box<figment::Error>),

    /// I/O error (binding the listener, opening the access log)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Caller-supplied goal text is missing or blank
    #[error("Invalid goal text")]
    InvalidInput,

    /// The store could not complete the operation
    #[error("{0}")]
    StoreUnavailable(#[from] StoreError),

    /// Internal server error
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl Error {
    /// HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::InvalidInput => StatusCode::UNPROCESSABLE_ENTITY,
            Error::StoreUnavailable(_)
            | Error::Config(_)
            | Error::Io(_)
            | Error::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let message = match self {
            Error::InvalidInput => {
                tracing::info!("Rejected goal: missing or blank text");
                INVALID_GOAL_TEXT
            }

            Error::StoreUnavailable(ref e) => {
                tracing::error!(
                    operation = %e.operation,
                    kind = %e.kind,
                    "Store error: {}", e.message
                );
                e.operation.failure_message()
            }

            Error::Config(e) => {
                tracing::error!("Configuration error: {}", e);
                "Internal server error."
            }

            Error::Io(e) => {
                tracing::error!("I/O error: {}", e);
                "Internal server error."
            }

            Error::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                "Internal server error."
            }
        };

        (status, Message::new(message)).into_response()
    }
}

// Manual From implementations for boxed errors
impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Error::Config(Box::new(err))
    }
}
