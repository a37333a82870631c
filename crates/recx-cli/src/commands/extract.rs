//! Extract command - structured data from a single receipt.

use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::debug;

use recx_core::receipt::ReceiptExtractor;
use recx_core::{ExtractionError, ExtractionResult, LlmReceiptExtractor, Receipt};

use super::{build_provider, load_config, read_input};

/// Arguments for the extract command.
#[derive(Args)]
pub struct ExtractArgs {
    /// Input text file with receipt content (stdin if omitted or "-")
    input: Option<PathBuf>,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Override the configured model
    #[arg(short, long)]
    model: Option<String>,

    /// Disable total recovery from the source text
    #[arg(long)]
    no_total_repair: bool,

    /// Disable ISO date normalization
    #[arg(long)]
    no_date_normalization: bool,

    /// Print extraction warnings
    #[arg(long)]
    show_warnings: bool,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// CSV output (one row per item)
    Csv,
    /// Plain text summary
    Text,
}

pub fn run(args: ExtractArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;

    let receipt_text = read_input(args.input.as_ref())?;
    debug!(receipt_chars = receipt_text.len(), "read receipt text");

    let mut provider = build_provider(&config)?;
    if let Some(model) = &args.model {
        provider = provider.with_model(model.clone());
    }

    let extractor = LlmReceiptExtractor::from_config(
        provider,
        &config.extraction,
        config.provider.max_tokens,
    )
    .with_total_repair(!args.no_total_repair)
    .with_date_normalization(!args.no_date_normalization);

    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap(),
    );
    pb.enable_steady_tick(Duration::from_millis(100));
    pb.set_message("Extracting receipt data...");

    let result = extractor.extract(&receipt_text);
    pb.finish_and_clear();

    let result = match result {
        Ok(result) => result,
        Err(ExtractionError::ExtractionFailed { reason, raw_output }) => {
            eprintln!(
                "{} Model output could not be parsed: {}",
                style("✗").red(),
                reason
            );
            eprintln!();
            eprintln!("Raw model output:");
            eprintln!("{}", raw_output);
            anyhow::bail!("extraction failed");
        }
        Err(e) => return Err(e.into()),
    };

    report_warnings(&result, args.show_warnings);

    let output = format_receipt(&result.receipt, args.format)?;

    if let Some(output_path) = &args.output {
        fs::write(output_path, &output)?;
        println!(
            "{} Output written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else {
        println!("{}", output);
    }

    Ok(())
}

fn report_warnings(result: &ExtractionResult, show: bool) {
    if !show || result.warnings.is_empty() {
        return;
    }

    eprintln!("{}", style("Warnings:").yellow());
    for warning in &result.warnings {
        eprintln!("  - {}", warning);
    }
    eprintln!(
        "{} Processing time: {}ms",
        style("ℹ").blue(),
        result.processing_time_ms
    );
}

fn format_receipt(receipt: &Receipt, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(receipt)?),
        OutputFormat::Csv => format_csv(receipt),
        OutputFormat::Text => Ok(format_text(receipt)),
    }
}

fn format_csv(receipt: &Receipt) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record(["merchant", "date", "description", "quantity", "amount", "total"])?;

    let merchant = receipt.merchant.clone().unwrap_or_default();
    let date = receipt.date.clone().unwrap_or_default();
    let total = receipt.total.map(|t| t.to_string()).unwrap_or_default();

    if receipt.items.is_empty() {
        wtr.write_record([merchant.as_str(), date.as_str(), "", "", "", total.as_str()])?;
    }

    for item in &receipt.items {
        let quantity = item.quantity.map(|q| q.to_string()).unwrap_or_default();
        let amount = item.amount.to_string();
        wtr.write_record([
            merchant.as_str(),
            date.as_str(),
            item.description.as_str(),
            quantity.as_str(),
            amount.as_str(),
            total.as_str(),
        ])?;
    }

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}

fn format_text(receipt: &Receipt) -> String {
    let mut output = String::new();

    output.push_str(&format!(
        "Merchant: {}\n",
        receipt.merchant.as_deref().unwrap_or("(unknown)")
    ));
    output.push_str(&format!(
        "Date:     {}\n",
        receipt.date.as_deref().unwrap_or("(unknown)")
    ));
    output.push('\n');

    output.push_str("Items:\n");
    if receipt.items.is_empty() {
        output.push_str("  (none)\n");
    }
    for item in &receipt.items {
        let quantity = item
            .quantity
            .map(|q| format!("{} x ", q))
            .unwrap_or_default();
        output.push_str(&format!("  {}{} - {}\n", quantity, item.description, item.amount));
    }
    output.push('\n');

    match receipt.total {
        Some(total) => output.push_str(&format!("Total: {}\n", total)),
        None => output.push_str("Total: (unknown)\n"),
    }

    output
}
