//! Fetch error types.

use thiserror::Error;

// ============================================================================
// Search Error
// ============================================================================

/// Error type for grounded search requests.
#[derive(Debug, Error)]
pub enum SearchError {
    /// HTTP request failed before a response arrived.
    #[error("HTTP error: {0}")]
    Http(#[source] reqwest::Error),

    /// Request timed out.
    #[error("Request timed out")]
    Timeout,

    /// Rate limited by the service.
    #[error("Rate limited, retry after {retry_after:?} seconds")]
    RateLimited {
        /// Seconds to wait before retrying, if the service said.
        retry_after: Option<u64>,
    },

    /// The service returned a 5xx status.
    #[error("Server error (HTTP {status}): {message}")]
    Server {
        /// HTTP status code.
        status: u16,
        /// Error message from the response body.
        message: String,
    },

    /// The API key was rejected.
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// The service rejected the request as malformed.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// The prompt or the response was blocked by the service.
    #[error("Blocked by the service: {0}")]
    Blocked(String),

    /// The response could not be interpreted.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// The response carried no candidate text.
    #[error("Empty response from the service")]
    EmptyResponse,

    /// A structured response arrived without grounding citations.
    #[error("Response was not grounded in any search result")]
    NoCitations,

    /// JSON parsing error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The prompt was blank.
    #[error("Query cannot be empty")]
    EmptyPrompt,
}

impl SearchError {
    /// Returns true if the same request may succeed when repeated.
    ///
    /// Network failures, timeouts, rate limits, server errors and
    /// unusable responses are transient. Authentication failures, rejected
    /// or blocked requests and blank prompts are not.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Http(_)
            | Self::Timeout
            | Self::RateLimited { .. }
            | Self::Server { .. }
            | Self::InvalidResponse(_)
            | Self::EmptyResponse
            | Self::NoCitations
            | Self::Json(_) => true,
            Self::Authentication(_) | Self::BadRequest(_) | Self::Blocked(_) | Self::EmptyPrompt => {
                false
            }
        }
    }

    /// Seconds the service asked us to wait, if any.
    pub fn retry_after(&self) -> Option<u64> {
        match self {
            Self::RateLimited { retry_after } => *retry_after,
            _ => None,
        }
    }
}

impl From<reqwest::Error> for SearchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            SearchError::Timeout
        } else {
            SearchError::Http(err)
        }
    }
}

// ============================================================================
// HTTP Error
// ============================================================================

/// HTTP-specific error type for page fetches.
#[derive(Debug, Error)]
pub enum HttpError {
    /// Request error.
    #[error("Request error: {0}")]
    Request(#[from] reqwest::Error),

    /// Invalid URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// The server answered with an error status.
    #[error("HTTP {0}")]
    Status(u16),
}
