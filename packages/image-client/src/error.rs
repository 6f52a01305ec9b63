//! Error types for the image provider clients.

use thiserror::Error;

/// Result type for image client operations.
pub type Result<T> = std::result::Result<T, ImageClientError>;

/// Image provider client errors.
#[derive(Debug, Error)]
pub enum ImageClientError {
    /// Configuration error (missing API key, invalid settings)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Network error (connection failed, timeout)
    #[error("Network error: {0}")]
    Network(String),

    /// API error (non-2xx response, rate limit, content rejection)
    #[error("API error ({code}): {message}")]
    Api {
        /// Short machine-readable code reported by the provider, when one
        /// could be derived from the response.
        code: String,
        message: String,
    },

    /// Parse error (invalid JSON, unexpected response shape, bad base64)
    #[error("Parse error: {0}")]
    Parse(String),
}

impl ImageClientError {
    /// True for failures the provider reported about the request itself
    /// (quota, content policy, bad parameters) rather than transport faults.
    pub fn is_api_error(&self) -> bool {
        matches!(self, ImageClientError::Api { .. })
    }
}
