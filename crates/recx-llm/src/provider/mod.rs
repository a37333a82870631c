//! Completion provider implementations.

pub mod openai;

use crate::Result;

/// Trait for text-completion providers.
///
/// This trait abstracts over completion backends so the extraction core can
/// run against any provider that turns a prompt into generated text. The
/// call is synchronous and blocking; callers issue at most one request at a
/// time and rely on the provider's own timeout.
pub trait CompletionProvider: Send + Sync {
    /// Complete a prompt, returning the model's raw text output.
    ///
    /// # Arguments
    /// * `prompt` - Full prompt text, including any instructions
    /// * `max_tokens` - Upper bound on generated tokens
    fn complete(&self, prompt: &str, max_tokens: u32) -> Result<String>;

    /// Identifier of the underlying model, for logging and metadata.
    fn model(&self) -> &str;
}

impl<P: CompletionProvider + ?Sized> CompletionProvider for std::sync::Arc<P> {
    fn complete(&self, prompt: &str, max_tokens: u32) -> Result<String> {
        (**self).complete(prompt, max_tokens)
    }

    fn model(&self) -> &str {
        (**self).model()
    }
}
