//! Repair heuristics for salvaging structured data from model output.
//!
//! Models wrap their JSON in prose, markdown code fences, or both, and
//! sometimes drop fields that are plainly visible in the source receipt.
//! The helpers here recover from those cases without ever re-invoking the
//! model.

use chrono::NaiveDate;
use lazy_static::lazy_static;
use regex::Regex;
use rust_decimal::Decimal;
use std::str::FromStr;

lazy_static! {
    // Labeled total in the source receipt, e.g. "TOTAL: 21.82" or "Total $21.82"
    static ref TOTAL_LABEL: Regex = Regex::new(
        r"(?i)total[\s:]*\$?\s*(\d[\d,]*(?:\.\d{1,2})?)"
    ).unwrap();
}

/// Locate a JSON payload embedded in extraneous model output.
///
/// Strips a markdown code fence when present, then trims to the first `{`
/// and the last `}`. The brace trim is deliberately naive: it can pick up
/// too much when the output embeds several JSON objects, and that is the
/// documented behavior.
pub fn extract_json_payload(output: &str) -> Option<&str> {
    let trimmed = output.trim();

    if let Some(fenced) = strip_code_fence(trimmed) {
        return brace_span(fenced).or(Some(fenced));
    }

    brace_span(trimmed)
}

fn strip_code_fence(text: &str) -> Option<&str> {
    let start = text.find("```")?;
    let after = start + 3;

    // Skip the language tag if present (e.g. "json\n")
    let content_start = text[after..]
        .find('\n')
        .map(|i| after + i + 1)
        .unwrap_or(after);

    let end = text[content_start..].find("```")?;
    Some(text[content_start..content_start + end].trim())
}

fn brace_span(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}

/// Recover the grand total from the source receipt text.
pub fn total_from_source(receipt_text: &str) -> Option<Decimal> {
    let caps = TOTAL_LABEL.captures(receipt_text)?;
    let cleaned = caps[1].replace(',', "");
    Decimal::from_str(&cleaned).ok()
}

/// Parse a date the model emitted in one of the common receipt formats.
pub fn normalize_date(raw: &str) -> Option<NaiveDate> {
    const FORMATS: &[&str] = &[
        "%Y-%m-%d",
        "%Y/%m/%d",
        "%d.%m.%Y",
        "%d-%m-%Y",
        "%d/%m/%Y",
        "%m/%d/%Y",
        "%B %d, %Y",
        "%d %B %Y",
    ];

    let raw = raw.trim();
    FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(raw, format).ok())
}

/// Truncate to at most `max_chars` bytes without splitting a character.
pub fn truncate_chars(content: &str, max_chars: usize) -> &str {
    if content.len() <= max_chars {
        content
    } else {
        content
            .char_indices()
            .take_while(|(i, _)| *i < max_chars)
            .last()
            .map(|(i, c)| &content[..i + c.len_utf8()])
            .unwrap_or(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_payload_from_clean_json() {
        let output = r#"{"merchant":"Y","total":0}"#;
        assert_eq!(extract_json_payload(output), Some(output));
    }

    #[test]
    fn test_payload_from_surrounding_prose() {
        let output = r#"Here you go: {"merchant":"Cafe X","total":3.5} thanks!"#;
        assert_eq!(
            extract_json_payload(output),
            Some(r#"{"merchant":"Cafe X","total":3.5}"#)
        );
    }

    #[test]
    fn test_payload_from_code_fence() {
        let output = "Sure!\n```json\n{\"merchant\":\"Cafe X\"}\n```\nAnything else?";
        assert_eq!(extract_json_payload(output), Some(r#"{"merchant":"Cafe X"}"#));
    }

    #[test]
    fn test_no_braces_yields_none() {
        assert_eq!(extract_json_payload("I could not parse this receipt."), None);
    }

    #[test]
    fn test_reversed_braces_yield_none() {
        assert_eq!(extract_json_payload("} nothing here {"), None);
    }

    #[test]
    fn test_total_from_source() {
        let text = "GROCERY STORE\nTax: 1.15\nTOTAL: 21.82\n";
        assert_eq!(total_from_source(text), Some(Decimal::new(2182, 2)));
    }

    #[test]
    fn test_total_from_source_with_currency_and_grouping() {
        assert_eq!(
            total_from_source("Total $1,234.50"),
            Some(Decimal::new(123450, 2))
        );
    }

    #[test]
    fn test_total_absent() {
        assert_eq!(total_from_source("no amounts here"), None);
    }

    #[test]
    fn test_normalize_date_formats() {
        let expected = NaiveDate::from_ymd_opt(2024, 10, 4).unwrap();

        assert_eq!(normalize_date("2024-10-04"), Some(expected));
        assert_eq!(normalize_date("04.10.2024"), Some(expected));
        assert_eq!(normalize_date(" 04/10/2024 "), Some(expected));
        assert_eq!(normalize_date("October 04, 2024"), Some(expected));
        assert_eq!(normalize_date("next tuesday"), None);
    }

    #[test]
    fn test_truncate_respects_char_boundaries() {
        assert_eq!(truncate_chars("hello", 10), "hello");
        assert_eq!(truncate_chars("hello world", 5), "hello");
        // Multi-byte character straddling the limit is kept whole.
        let text = "ab\u{00e9}cd";
        assert!(truncate_chars(text, 3).is_char_boundary(truncate_chars(text, 3).len()));
    }
}
