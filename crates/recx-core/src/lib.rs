//! Core library for LLM-backed receipt extraction.
//!
//! This crate provides:
//! - Receipt data model with lenient, placeholder-preserving deserialization
//! - Extraction prompt construction
//! - Parse-with-repair of raw model output (code fences, surrounding prose)
//! - Post-parse normalization (total recovery, ISO date rewriting)
//! - Article summarization over the same completion provider

pub mod error;
pub mod models;
pub mod receipt;
pub mod summarize;

pub use error::{ExtractionError, RecxError, Result, SummaryError};
pub use models::config::{ExtractionConfig, ProviderConfig, RecxConfig};
pub use models::receipt::{Receipt, ReceiptItem};
pub use receipt::{ExtractionResult, LlmReceiptExtractor, ReceiptExtractor};
pub use summarize::Summarizer;

/// Re-export completion types.
pub use recx_llm::{CompletionError, CompletionProvider, OpenAiProvider};
