//! Article summarization over the same completion provider.

use tracing::debug;

use recx_llm::CompletionProvider;

use crate::error::SummaryError;
use crate::receipt::repair::truncate_chars;

const MAX_ARTICLE_CHARS: usize = 12_000;

/// N-sentence summarizer.
pub struct Summarizer<P> {
    provider: P,
    max_tokens: u32,
    sentences: usize,
}

impl<P: CompletionProvider> Summarizer<P> {
    /// Create a summarizer producing three-sentence summaries.
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            max_tokens: 256,
            sentences: 3,
        }
    }

    /// Set the target sentence count.
    pub fn with_sentences(mut self, sentences: usize) -> Self {
        self.sentences = sentences.max(1);
        self
    }

    /// Set the token budget for the completion call.
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Summarize an article in a fixed number of sentences.
    pub fn summarize(&self, article: &str) -> Result<String, SummaryError> {
        if article.trim().is_empty() {
            return Err(SummaryError::InvalidInput);
        }

        let article = truncate_chars(article, MAX_ARTICLE_CHARS);
        let prompt = format!(
            "Summarize the following article in exactly {} sentences. \
             Output only the summary, with no introduction.\n\n{}",
            self.sentences, article
        );

        debug!(
            article_chars = article.len(),
            sentences = self.sentences,
            model = self.provider.model(),
            "requesting summary"
        );

        let output = self.provider.complete(&prompt, self.max_tokens)?;
        let summary = output.trim();

        if summary.is_empty() {
            return Err(SummaryError::EmptySummary);
        }

        Ok(summary.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use recx_llm::Result as LlmResult;

    struct FixedProvider(&'static str);

    impl CompletionProvider for FixedProvider {
        fn complete(&self, _prompt: &str, _max_tokens: u32) -> LlmResult<String> {
            Ok(self.0.to_string())
        }

        fn model(&self) -> &str {
            "fixed"
        }
    }

    #[test]
    fn test_empty_article_rejected() {
        let summarizer = Summarizer::new(FixedProvider("summary"));
        assert!(matches!(
            summarizer.summarize("  \n "),
            Err(SummaryError::InvalidInput)
        ));
    }

    #[test]
    fn test_summary_trimmed() {
        let summarizer = Summarizer::new(FixedProvider("  A short summary.  \n"));
        assert_eq!(
            summarizer.summarize("some article").unwrap(),
            "A short summary."
        );
    }

    #[test]
    fn test_whitespace_only_completion_rejected() {
        let summarizer = Summarizer::new(FixedProvider("   "));
        assert!(matches!(
            summarizer.summarize("some article"),
            Err(SummaryError::EmptySummary)
        ));
    }

    #[test]
    fn test_sentence_count_floor() {
        let summarizer = Summarizer::new(FixedProvider("x")).with_sentences(0);
        assert_eq!(summarizer.sentences, 1);
    }
}
