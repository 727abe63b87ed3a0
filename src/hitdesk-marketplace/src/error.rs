//! Error types for the marketplace client.

use thiserror::Error;

/// Errors raised by marketplace API calls.
#[derive(Debug, Error)]
pub enum MarketplaceError {
    /// Transport-level failure (connect, timeout, TLS).
    #[error("marketplace request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with a non-success status.
    #[error("marketplace API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// The response body did not match the expected shape.
    #[error("unexpected marketplace response: {0}")]
    Decode(String),

    /// No API token configured for the targeted environment.
    #[error("no API token configured")]
    MissingToken,
}
