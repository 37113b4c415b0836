//! SDK error types and handling
//!
//! Transport failures, HTTP status mapping and local packing errors. Every
//! error reaching the [`RunStore`](eval_tracker_core::RunStore) boundary is
//! turned into [`CoreError::Remote`].

use eval_tracker_core::CoreError;
use std::path::PathBuf;
use thiserror::Error;

/// The main error type for the SDK
#[derive(Error, Debug)]
pub enum SdkError {
    /// Any other non-success response
    #[error("API error {status}: {message}{}", request_hint(.request_id))]
    ApiError {
        /// HTTP status code
        status: u16,
        /// Message from the response body, or the raw body
        message: String,
        /// Request id echoed by the server
        request_id: Option<String>,
    },

    /// Network or connection error
    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    /// Request timed out
    #[error("Request timed out after {0} seconds")]
    Timeout(u64),

    /// 429. Requests are never retried; the caller decides.
    #[error("Rate limit exceeded{}", retry_hint(.retry_after))]
    RateLimited {
        /// Value of the `Retry-After` header
        retry_after: Option<u64>,
    },

    /// 401
    #[error("Authentication failed: {0}")]
    AuthenticationError(String),

    /// 403
    #[error("Access denied: {0}")]
    AuthorizationError(String),

    /// 404; holds the server message or the request path
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// 5xx with a structured body
    #[error("Server error: {0}")]
    ServerError(String),

    /// Bad client settings, caught before any request
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// URL parsing error
    #[error("Invalid URL: {0}")]
    UrlError(#[from] url::ParseError),

    /// A directory could not be packed for upload
    #[error("Cannot pack {}: {reason}", .dir.display())]
    Archive {
        /// Directory being packed
        dir: PathBuf,
        /// What went wrong
        reason: String,
    },

    /// Reading a local file failed
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

fn retry_hint(retry_after: &Option<u64>) -> String {
    match retry_after {
        Some(seconds) => format!(", retry after {} seconds", seconds),
        None => String::new(),
    }
}

fn request_hint(request_id: &Option<String>) -> String {
    match request_id {
        Some(id) => format!(" (request {})", id),
        None => String::new(),
    }
}

/// Result type alias for SDK operations
pub type SdkResult<T> = Result<T, SdkError>;

/// Error body the tracker sends with most failures
#[derive(Debug, serde::Deserialize)]
struct ErrorBody {
    message: String,
    #[serde(default)]
    request_id: Option<String>,
}

impl SdkError {
    /// Map a non-success status and its body. The body's `message` is used
    /// when it parses; otherwise the raw body is kept.
    pub fn from_response(status: u16, body: &str, request_id: Option<String>) -> Self {
        let Ok(parsed) = serde_json::from_str::<ErrorBody>(body) else {
            return SdkError::ApiError {
                status,
                message: body.to_string(),
                request_id,
            };
        };

        match status {
            401 => SdkError::AuthenticationError(parsed.message),
            403 => SdkError::AuthorizationError(parsed.message),
            404 => SdkError::NotFound(parsed.message),
            500..=599 => SdkError::ServerError(parsed.message),
            _ => SdkError::ApiError {
                status,
                message: parsed.message,
                request_id: request_id.or(parsed.request_id),
            },
        }
    }

    /// HTTP status behind this error, if it came from a response
    pub fn status_code(&self) -> Option<u16> {
        match self {
            SdkError::ApiError { status, .. } => Some(*status),
            SdkError::RateLimited { .. } => Some(429),
            SdkError::AuthenticationError(_) => Some(401),
            SdkError::AuthorizationError(_) => Some(403),
            SdkError::NotFound(_) => Some(404),
            SdkError::ServerError(_) => Some(500),
            _ => None,
        }
    }
}

impl From<walkdir::Error> for SdkError {
    fn from(err: walkdir::Error) -> Self {
        SdkError::IoError(err.into())
    }
}

impl From<SdkError> for CoreError {
    fn from(err: SdkError) -> Self {
        CoreError::Remote(err.to_string())
    }
}
