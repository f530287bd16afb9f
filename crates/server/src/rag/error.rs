//! Error types for the retrieval and generation clients.

use thiserror::Error;

/// Errors that can occur while embedding, retrieving, or generating.
///
/// The conversation pipeline converts every variant into a user-facing
/// fallback answer; none of these ever reach the client verbatim.
#[derive(Debug, Error)]
pub enum RagError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Upstream API returned an error response.
    #[error("API error ({error_type}): {message}")]
    Api {
        /// Error type from the API.
        error_type: String,
        /// Error message from the API.
        message: String,
    },

    /// Invalid or missing API key.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Rate limited; retry after the given seconds.
    #[error("rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// Failed to parse a response body.
    #[error("parse error: {0}")]
    Parse(String),

    /// Response was well-formed but missing expected data.
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}
