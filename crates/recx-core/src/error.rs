//! Error types for the recx-core library.

use thiserror::Error;

/// Main error type for the recx library.
#[derive(Error, Debug)]
pub enum RecxError {
    /// Receipt extraction error.
    #[error("extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    /// Summarization error.
    #[error("summary error: {0}")]
    Summary(#[from] SummaryError),

    /// Completion error from the provider layer.
    #[error("completion error: {0}")]
    Completion(#[from] recx_llm::CompletionError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors related to receipt extraction.
///
/// Every failure of `extract` is one of these variants; all are terminal for
/// the current request and none are recovered silently.
#[derive(Error, Debug)]
pub enum ExtractionError {
    /// Input text was empty or whitespace-only. The provider is never called.
    #[error("receipt text is empty")]
    InvalidInput,

    /// The completion provider failed; surfaced as-is, not retried.
    #[error("completion failed: {0}")]
    Completion(#[from] recx_llm::CompletionError),

    /// The completion succeeded but its text could not be parsed into a
    /// receipt, even after the repair pass. Carries the raw model output
    /// unchanged for diagnostic display.
    #[error("could not parse model output as a receipt: {reason}")]
    ExtractionFailed { reason: String, raw_output: String },
}

/// Errors related to text summarization.
#[derive(Error, Debug)]
pub enum SummaryError {
    /// Input text was empty or whitespace-only. The provider is never called.
    #[error("article text is empty")]
    InvalidInput,

    /// The completion provider failed; surfaced as-is, not retried.
    #[error("completion failed: {0}")]
    Completion(#[from] recx_llm::CompletionError),

    /// The completion succeeded but contained no usable summary text.
    #[error("model produced an empty summary")]
    EmptySummary,
}

/// Result type for the recx library.
pub type Result<T> = std::result::Result<T, RecxError>;
