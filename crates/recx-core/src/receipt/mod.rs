//! Receipt extraction module.

mod extractor;
pub mod prompt;
pub mod repair;

pub use extractor::{ExtractionResult, LlmReceiptExtractor};

use crate::error::ExtractionError;

/// Result type for extraction operations.
pub type Result<T> = std::result::Result<T, ExtractionError>;

/// Trait for receipt extractors.
pub trait ReceiptExtractor {
    /// Extract a structured receipt from raw receipt text.
    ///
    /// One best-effort attempt per call: the completion collaborator is
    /// invoked at most once and never retried automatically.
    fn extract(&self, receipt_text: &str) -> Result<ExtractionResult>;
}
