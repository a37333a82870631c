//! LLM-backed receipt extractor with parse-and-repair.

use std::time::Instant;

use tracing::{debug, info};

use recx_llm::CompletionProvider;

use crate::error::ExtractionError;
use crate::models::config::ExtractionConfig;
use crate::models::receipt::Receipt;

use super::prompt::build_extraction_prompt;
use super::{ReceiptExtractor, Result, repair};

/// Result of receipt extraction.
#[derive(Debug, Clone)]
pub struct ExtractionResult {
    /// Extracted receipt data.
    pub receipt: Receipt,
    /// Raw model output the receipt was parsed from.
    pub raw_output: String,
    /// Extraction warnings.
    pub warnings: Vec<String>,
    /// Processing time in milliseconds.
    pub processing_time_ms: u64,
}

/// Receipt extractor that prompts a completion provider and parses the
/// returned text.
///
/// One-shot and stateless: each call is an isolated request/response with
/// no state carried between invocations.
pub struct LlmReceiptExtractor<P> {
    provider: P,
    max_tokens: u32,
    repair_totals: bool,
    normalize_dates: bool,
    max_receipt_chars: usize,
}

impl<P: CompletionProvider> LlmReceiptExtractor<P> {
    /// Create an extractor with default settings.
    pub fn new(provider: P) -> Self {
        let defaults = ExtractionConfig::default();
        Self {
            provider,
            max_tokens: 512,
            repair_totals: defaults.repair_totals,
            normalize_dates: defaults.normalize_dates,
            max_receipt_chars: defaults.max_receipt_chars,
        }
    }

    /// Create an extractor from an extraction config section.
    pub fn from_config(provider: P, config: &ExtractionConfig, max_tokens: u32) -> Self {
        Self {
            provider,
            max_tokens,
            repair_totals: config.repair_totals,
            normalize_dates: config.normalize_dates,
            max_receipt_chars: config.max_receipt_chars,
        }
    }

    /// Set the token budget for the completion call.
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Enable or disable total recovery.
    pub fn with_total_repair(mut self, repair: bool) -> Self {
        self.repair_totals = repair;
        self
    }

    /// Enable or disable ISO date normalization.
    pub fn with_date_normalization(mut self, normalize: bool) -> Self {
        self.normalize_dates = normalize;
        self
    }

    /// Set the receipt-text truncation limit.
    pub fn with_max_receipt_chars(mut self, max_chars: usize) -> Self {
        self.max_receipt_chars = max_chars;
        self
    }
}

impl<P: CompletionProvider> ReceiptExtractor for LlmReceiptExtractor<P> {
    fn extract(&self, receipt_text: &str) -> Result<ExtractionResult> {
        let start = Instant::now();

        if receipt_text.trim().is_empty() {
            return Err(ExtractionError::InvalidInput);
        }

        let text = repair::truncate_chars(receipt_text, self.max_receipt_chars);
        let prompt = build_extraction_prompt(text);

        debug!(
            receipt_chars = text.len(),
            model = self.provider.model(),
            "requesting receipt extraction"
        );

        let raw_output = self.provider.complete(&prompt, self.max_tokens)?;

        let mut receipt = parse_receipt(&raw_output)?;
        let mut warnings = Vec::new();

        if self.repair_totals && receipt.total.is_none() {
            self.repair_total(&mut receipt, text, &mut warnings);
        }

        if self.normalize_dates {
            normalize_date(&mut receipt, &mut warnings);
        }

        warnings.extend(receipt.validate());

        let processing_time_ms = start.elapsed().as_millis() as u64;

        info!(
            items = receipt.items.len(),
            warnings = warnings.len(),
            elapsed_ms = processing_time_ms,
            "receipt extracted"
        );

        Ok(ExtractionResult {
            receipt,
            raw_output,
            warnings,
            processing_time_ms,
        })
    }
}

impl<P: CompletionProvider> LlmReceiptExtractor<P> {
    /// Recover a missing total: the labeled amount in the source text is the
    /// most reliable, the item sum is the last resort.
    fn repair_total(&self, receipt: &mut Receipt, source_text: &str, warnings: &mut Vec<String>) {
        if let Some(total) = repair::total_from_source(source_text) {
            warnings.push(format!(
                "Model omitted the total; recovered {} from the receipt text",
                total
            ));
            receipt.total = Some(total);
        } else if !receipt.items.is_empty() {
            let total = receipt.items_total().round_dp(2);
            warnings.push(format!(
                "Model omitted the total; calculated {} from items",
                total
            ));
            receipt.total = Some(total);
        }
    }
}

fn normalize_date(receipt: &mut Receipt, warnings: &mut Vec<String>) {
    let Some(raw_date) = receipt.date.as_deref() else {
        return;
    };

    match repair::normalize_date(raw_date) {
        Some(date) => receipt.date = Some(date.format("%Y-%m-%d").to_string()),
        None => warnings.push(format!("Unrecognized date format: {}", raw_date)),
    }
}

/// Parse the raw model output into a receipt.
///
/// Strict parsing first; on failure, one repair pass over the salvaged JSON
/// payload. The model call is never repeated.
fn parse_receipt(raw_output: &str) -> Result<Receipt> {
    let reason = match serde_json::from_str::<Receipt>(raw_output) {
        Ok(receipt) => return Ok(receipt),
        Err(e) => e.to_string(),
    };

    let reason = match repair::extract_json_payload(raw_output) {
        Some(payload) => match serde_json::from_str::<Receipt>(payload) {
            Ok(receipt) => {
                debug!("strict parse failed, repair pass succeeded");
                return Ok(receipt);
            }
            Err(e) => e.to_string(),
        },
        None => reason,
    };

    Err(ExtractionError::ExtractionFailed {
        reason,
        raw_output: raw_output.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use recx_llm::CompletionError;
    use rust_decimal::Decimal;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Deterministic provider that replays a scripted output and counts calls.
    struct ScriptedProvider {
        output: String,
        calls: AtomicUsize,
    }

    impl ScriptedProvider {
        fn new(output: &str) -> Arc<Self> {
            Arc::new(Self {
                output: output.to_string(),
                calls: AtomicUsize::new(0),
            })
        }
    }

    impl CompletionProvider for ScriptedProvider {
        fn complete(&self, _prompt: &str, _max_tokens: u32) -> recx_llm::Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.output.clone())
        }

        fn model(&self) -> &str {
            "scripted"
        }
    }

    struct FailingProvider;

    impl CompletionProvider for FailingProvider {
        fn complete(&self, _prompt: &str, _max_tokens: u32) -> recx_llm::Result<String> {
            Err(CompletionError::Api {
                status: 503,
                message: "overloaded".to_string(),
            })
        }

        fn model(&self) -> &str {
            "failing"
        }
    }

    #[test]
    fn test_empty_input_fails_without_calling_provider() {
        let provider = ScriptedProvider::new("{}");
        let extractor = LlmReceiptExtractor::new(provider.clone());

        assert!(matches!(
            extractor.extract(""),
            Err(ExtractionError::InvalidInput)
        ));
        assert!(matches!(
            extractor.extract("   "),
            Err(ExtractionError::InvalidInput)
        ));
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_prose_wrapped_output_parses_via_repair() {
        let provider = ScriptedProvider::new(
            r#"Here you go: {"merchant":"Cafe X","date":"2024-01-01","items":[{"description":"Coffee","amount":3.5}],"total":3.5} thanks!"#,
        );
        let extractor = LlmReceiptExtractor::new(provider);

        let result = extractor.extract("receipt text").unwrap();

        assert_eq!(result.receipt.merchant.as_deref(), Some("Cafe X"));
        assert_eq!(result.receipt.date.as_deref(), Some("2024-01-01"));
        assert_eq!(result.receipt.items.len(), 1);
        assert_eq!(result.receipt.total, Some(Decimal::new(35, 1)));
    }

    #[test]
    fn test_braceless_output_fails_with_raw_text() {
        let raw = "I could not parse this receipt.";
        let provider = ScriptedProvider::new(raw);
        let extractor = LlmReceiptExtractor::new(provider);

        match extractor.extract("receipt text") {
            Err(ExtractionError::ExtractionFailed { raw_output, .. }) => {
                assert_eq!(raw_output, raw);
            }
            other => panic!("expected ExtractionFailed, got {:?}", other.map(|r| r.receipt)),
        }
    }

    #[test]
    fn test_zero_item_receipt_is_valid() {
        let provider = ScriptedProvider::new(
            r#"{"merchant":"Y","date":"2024-02-02","items":[],"total":0}"#,
        );
        let extractor = LlmReceiptExtractor::new(provider);

        let result = extractor.extract("receipt text").unwrap();

        assert!(result.receipt.items.is_empty());
        assert_eq!(result.receipt.total, Some(Decimal::ZERO));
    }

    #[test]
    fn test_extraction_is_idempotent() {
        let provider = ScriptedProvider::new(
            r#"{"merchant":"Cafe X","date":"2024-01-01","items":[{"description":"Coffee","amount":3.5}],"total":3.5}"#,
        );
        let extractor = LlmReceiptExtractor::new(provider.clone());

        let first = extractor.extract("receipt text").unwrap();
        let second = extractor.extract("receipt text").unwrap();

        assert_eq!(first.receipt, second.receipt);
        assert_eq!(provider.calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_provider_failure_surfaces_as_completion_error() {
        let extractor = LlmReceiptExtractor::new(FailingProvider);

        assert!(matches!(
            extractor.extract("receipt text"),
            Err(ExtractionError::Completion(CompletionError::Api { status: 503, .. }))
        ));
    }

    #[test]
    fn test_fenced_output_parses() {
        let provider = ScriptedProvider::new(
            "```json\n{\"merchant\":\"Cafe X\",\"items\":[],\"total\":1.0}\n```",
        );
        let extractor = LlmReceiptExtractor::new(provider);

        let result = extractor.extract("receipt text").unwrap();
        assert_eq!(result.receipt.merchant.as_deref(), Some("Cafe X"));
    }

    #[test]
    fn test_missing_total_recovered_from_source_text() {
        let provider = ScriptedProvider::new(
            r#"{"merchant":"Grocery","items":[{"description":"Milk","amount":4.5}]}"#,
        );
        let extractor = LlmReceiptExtractor::new(provider);

        let result = extractor
            .extract("GROCERY STORE\nMilk 4.50\nTax: 17.32\nTOTAL: 21.82")
            .unwrap();

        assert_eq!(result.receipt.total, Some(Decimal::new(2182, 2)));
        assert!(result.warnings.iter().any(|w| w.contains("recovered")));
    }

    #[test]
    fn test_missing_total_calculated_from_items() {
        let provider = ScriptedProvider::new(
            r#"{"merchant":"Grocery","items":[
                {"description":"Bread","quantity":2,"amount":3.0},
                {"description":"Eggs","amount":5.25}
            ]}"#,
        );
        let extractor = LlmReceiptExtractor::new(provider);

        let result = extractor.extract("a receipt with no labeled sum").unwrap();

        assert_eq!(result.receipt.total, Some(Decimal::new(1125, 2)));
        assert!(result.warnings.iter().any(|w| w.contains("calculated")));
    }

    #[test]
    fn test_total_repair_can_be_disabled() {
        let provider = ScriptedProvider::new(r#"{"merchant":"Grocery","items":[]}"#);
        let extractor = LlmReceiptExtractor::new(provider).with_total_repair(false);

        let result = extractor.extract("TOTAL: 21.82").unwrap();
        assert_eq!(result.receipt.total, None);
    }

    #[test]
    fn test_dates_normalized_to_iso() {
        let provider = ScriptedProvider::new(
            r#"{"merchant":"Grocery","date":"04.10.2024","items":[],"total":1.0}"#,
        );
        let extractor = LlmReceiptExtractor::new(provider);

        let result = extractor.extract("receipt text").unwrap();
        assert_eq!(result.receipt.date.as_deref(), Some("2024-10-04"));
    }

    #[test]
    fn test_unrecognized_date_kept_with_warning() {
        let provider = ScriptedProvider::new(
            r#"{"merchant":"Grocery","date":"last friday","items":[],"total":1.0}"#,
        );
        let extractor = LlmReceiptExtractor::new(provider);

        let result = extractor.extract("receipt text").unwrap();
        assert_eq!(result.receipt.date.as_deref(), Some("last friday"));
        assert!(result.warnings.iter().any(|w| w.contains("Unrecognized date")));
    }
}
