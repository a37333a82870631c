//! Summarize command - N-sentence summary of an article.

use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};

use recx_core::Summarizer;

use super::{build_provider, load_config, read_input};

/// Arguments for the summarize command.
#[derive(Args)]
pub struct SummarizeArgs {
    /// Input text file (stdin if omitted or "-")
    input: Option<PathBuf>,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Number of sentences in the summary
    #[arg(short, long, default_value = "3")]
    sentences: usize,
}

pub fn run(args: SummarizeArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;
    let article = read_input(args.input.as_ref())?;

    let provider = build_provider(&config)?;
    let summarizer = Summarizer::new(provider)
        .with_sentences(args.sentences)
        .with_max_tokens(config.provider.max_tokens);

    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap(),
    );
    pb.enable_steady_tick(Duration::from_millis(100));
    pb.set_message("Summarizing...");

    let summary = summarizer.summarize(&article);
    pb.finish_and_clear();

    let summary = summary?;

    if let Some(output_path) = &args.output {
        fs::write(output_path, &summary)?;
        println!(
            "{} Summary written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else {
        println!("{}", summary);
    }

    Ok(())
}
