//! Completion-provider abstraction layer for recx.
//!
//! This crate provides a unified interface for text-completion backends:
//! a prompt goes in, the model's raw text comes out. The extraction core
//! never depends on a specific model identity; anything implementing
//! [`CompletionProvider`] is substitutable, including in-memory test doubles.

mod error;
mod provider;

pub use error::CompletionError;
pub use provider::CompletionProvider;
pub use provider::openai::OpenAiProvider;

/// Result type for completion operations.
pub type Result<T> = std::result::Result<T, CompletionError>;
