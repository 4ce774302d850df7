//! Error types for the GBIF explorer.
//!
//! Uses `thiserror` for structured error handling with automatic `From` implementations.

use std::time::Duration;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// Failure of a single request attempt.
///
/// These never reach the caller directly: the client retries them and
/// converts the last one into a [`FetchError`].
#[derive(thiserror::Error, Debug)]
pub enum ClientError {
    /// HTTP transport error (connection, DNS, TLS, etc.)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Request timeout
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    /// Non-success HTTP status
    #[error("Unexpected status {status}: {message}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Response body or message
        message: String,
    },

    /// JSON parsing error
    #[error("Failed to parse response: {0}")]
    Parse(#[from] serde_json::Error),
}

impl ClientError {
    /// Create a status error.
    #[must_use]
    pub fn status(status: u16, message: impl Into<String>) -> Self {
        Self::Status { status, message: message.into() }
    }

    /// Returns true if the attempt failed because it ran out of time.
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        match self {
            Self::Timeout(_) => true,
            Self::Http(e) => e.is_timeout(),
            _ => false,
        }
    }
}

/// Terminal failure of a fetch.
#[derive(thiserror::Error, Debug)]
pub enum FetchError {
    /// The query was empty; no request was made.
    #[error("Query must not be empty")]
    QueryInvalid,

    /// The last attempt timed out.
    #[error("Request timed out after {attempts} attempts")]
    RequestTimeout {
        /// Attempts made before giving up
        attempts: u32,
    },

    /// The last attempt failed for any other reason.
    #[error("Request failed after {attempts} attempts: {source}")]
    TransportFailure {
        /// Attempts made before giving up
        attempts: u32,
        /// Cause of the last failed attempt
        source: ClientError,
    },
}

impl FetchError {
    /// Convert the final attempt's error into a terminal failure.
    #[must_use]
    pub fn exhausted(attempts: u32, last: ClientError) -> Self {
        if last.is_timeout() {
            Self::RequestTimeout { attempts }
        } else {
            Self::TransportFailure { attempts, source: last }
        }
    }

    /// Number of attempts made, if any request was sent.
    #[must_use]
    pub const fn attempts(&self) -> Option<u32> {
        match self {
            Self::QueryInvalid => None,
            Self::RequestTimeout { attempts } | Self::TransportFailure { attempts, .. } => {
                Some(*attempts)
            }
        }
    }
}

/// Errors from the SQLite store.
#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    /// Could not open the database
    #[error("Database connection failed: {0}")]
    Connection(String),

    /// Schema setup failed
    #[error("Database migration failed: {0}")]
    Migration(String),

    /// A query failed
    #[error("Database query failed: {0}")]
    Query(#[from] sqlx::Error),
}

/// Errors surfaced by the web layer.
#[derive(thiserror::Error, Debug)]
pub enum AppError {
    /// Error from the fetch client
    #[error("GBIF error: {0}")]
    Fetch(#[from] FetchError),

    /// Error from the store
    #[error("Storage error: {0}")]
    Store(#[from] StoreError),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),
}

impl AppError {
    /// Create a not found error.
    #[must_use]
    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::NotFound(resource.into())
    }

    /// HTTP status for this error.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::Fetch(FetchError::QueryInvalid) => StatusCode::BAD_REQUEST,
            Self::Fetch(_) => StatusCode::BAD_GATEWAY,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Convert to a user-friendly message.
    #[must_use]
    pub fn to_user_message(&self) -> String {
        match self {
            Self::Fetch(FetchError::QueryInvalid) => "Please enter a person name".to_string(),
            Self::Fetch(e) => format!("Error downloading data: {e}"),
            Self::NotFound(resource) => format!("Not found: {resource}"),
            Self::Store(_) => "A database error occurred".to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        }
        let body = crate::formatters::html::error_page(status, &self.to_user_message());
        (status, axum::response::Html(body)).into_response()
    }
}

/// Result type alias for single-attempt client operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Result type alias for fetch operations.
pub type FetchResult<T> = Result<T, FetchError>;

/// Result type alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Result type alias for web handlers.
pub type AppResult<T> = Result<T, AppError>;
