//! Receipt data model.
//!
//! The shape mirrors the JSON schema the extraction prompt asks the model
//! for. Deserialization is deliberately lenient: models routinely emit
//! amounts as strings, rename keys, or drop fields, and a dropped field
//! must surface as a null/empty placeholder rather than a parse failure.

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use std::str::FromStr;

/// A structured receipt extracted from free text.
///
/// All declared fields are always present after a successful parse; fields
/// the model omitted come back as `None` or an empty item list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Receipt {
    /// Merchant / store name.
    pub merchant: Option<String>,

    /// Receipt date, ISO-normalized when recognizable.
    pub date: Option<String>,

    /// Line items in receipt order.
    pub items: Vec<ReceiptItem>,

    /// Grand total.
    #[serde(deserialize_with = "lenient_optional_decimal")]
    pub total: Option<Decimal>,
}

/// A single line item on the receipt.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReceiptItem {
    /// Item description.
    #[serde(alias = "name")]
    pub description: String,

    /// Quantity, when the model reports one (assumed 1 otherwise).
    #[serde(
        deserialize_with = "lenient_optional_decimal",
        skip_serializing_if = "Option::is_none"
    )]
    pub quantity: Option<Decimal>,

    /// Line amount. Falls back to zero when the model emits garbage here.
    #[serde(alias = "price", deserialize_with = "lenient_decimal")]
    pub amount: Decimal,
}

impl Receipt {
    /// Sum of quantity × amount over all items (quantity defaults to 1).
    pub fn items_total(&self) -> Decimal {
        self.items
            .iter()
            .map(|item| item.quantity.unwrap_or(Decimal::ONE) * item.amount)
            .sum()
    }

    /// Validate the receipt and return any issues found.
    pub fn validate(&self) -> Vec<String> {
        let mut issues = Vec::new();

        if self.merchant.as_deref().is_none_or(str::is_empty) {
            issues.push("Missing merchant name".to_string());
        }

        if self.date.as_deref().is_none_or(str::is_empty) {
            issues.push("Missing receipt date".to_string());
        }

        match self.total {
            None => issues.push("Missing total".to_string()),
            Some(total) if !self.items.is_empty() => {
                let calculated = self.items_total();
                if (calculated - total).abs() > Decimal::new(1, 2) {
                    issues.push(format!(
                        "Item total ({}) differs from receipt total ({})",
                        calculated, total
                    ));
                }
            }
            Some(_) => {}
        }

        issues
    }
}

/// Accept a number, a numeric string, or anything else as `None`.
fn lenient_optional_decimal<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(decimal_from_value(&value))
}

/// Like `lenient_optional_decimal`, but unusable values become zero.
fn lenient_decimal<'de, D>(deserializer: D) -> Result<Decimal, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(decimal_from_value(&value).unwrap_or(Decimal::ZERO))
}

fn decimal_from_value(value: &serde_json::Value) -> Option<Decimal> {
    match value {
        serde_json::Value::Number(n) => Decimal::from_str(&n.to_string()).ok(),
        serde_json::Value::String(s) => {
            let cleaned = s.trim().trim_start_matches('$').replace(',', "");
            Decimal::from_str(&cleaned).ok()
        }
        _ => None,
    }
}
