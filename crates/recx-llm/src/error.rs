//! Error types for the completion layer.

use thiserror::Error;

/// Errors that can occur while obtaining a completion.
#[derive(Error, Debug)]
pub enum CompletionError {
    /// The provider is misconfigured (missing API key, bad base URL).
    #[error("provider configuration error: {0}")]
    Config(String),

    /// Transport-level failure talking to the provider.
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The provider answered with a non-success status.
    #[error("provider returned status {status}: {message}")]
    Api { status: u16, message: String },

    /// The provider's response body could not be decoded.
    #[error("malformed provider response: {0}")]
    MalformedResponse(String),

    /// The provider answered successfully but produced no text.
    #[error("provider returned an empty completion")]
    EmptyCompletion,
}
