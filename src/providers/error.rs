//! Generation-specific error types
//!
//! Errors that can occur while asking a model provider for a response.

use std::time::Duration;
use thiserror::Error;

/// Errors that can occur during response generation
///
/// These are recovered at the conversation controller and shown to the user
/// inline; they never abort the process.
#[derive(Error, Debug)]
pub enum GenerationError {
    /// The provider needs an API key and none is configured
    #[error("{0} API key is not configured")]
    MissingApiKey(&'static str),

    /// The HTTP request could not be sent or the connection failed
    #[error("Failed to send HTTP request to {provider}: {message}")]
    Request {
        /// Provider name
        provider: &'static str,
        /// Underlying transport error
        message: String,
    },

    /// The provider rejected the request because of rate limiting
    #[error("{provider} rate limit exceeded (HTTP 429): {body}")]
    RateLimited {
        /// Provider name
        provider: &'static str,
        /// Response body returned by the provider
        body: String,
    },

    /// The provider answered with a non-success status
    #[error("{provider} returned error status {status}: {body}")]
    Status {
        /// Provider name
        provider: &'static str,
        /// HTTP status code
        status: u16,
        /// Response body returned by the provider
        body: String,
    },

    /// The response body did not have the expected shape
    #[error("Failed to parse response from {provider}: {message}")]
    InvalidResponse {
        /// Provider name
        provider: &'static str,
        /// Parse failure details
        message: String,
    },

    /// The provider answered successfully but without any text
    #[error("{0} returned an empty response")]
    EmptyResponse(&'static str),

    /// Generation did not finish within the configured limit
    #[error("Generation timed out after {0:?}")]
    Timeout(Duration),
}
