//! CLI subcommands.

pub mod config;
pub mod extract;
pub mod summarize;

use std::io::Read;
use std::path::{Path, PathBuf};

use recx_core::{OpenAiProvider, RecxConfig};

/// Load the pipeline configuration, falling back to defaults.
pub fn load_config(config_path: Option<&str>) -> anyhow::Result<RecxConfig> {
    match config_path {
        Some(path) => Ok(RecxConfig::from_file(Path::new(path))?),
        None => {
            let default_path = config::default_config_path();
            if default_path.exists() {
                Ok(RecxConfig::from_file(&default_path)?)
            } else {
                Ok(RecxConfig::default())
            }
        }
    }
}

/// Build a provider from the config section, reading the key from the
/// configured environment variable.
pub fn build_provider(config: &RecxConfig) -> anyhow::Result<OpenAiProvider> {
    let provider = OpenAiProvider::from_env(&config.provider.api_key_env)?
        .with_base_url(config.provider.base_url.clone())
        .with_model(config.provider.model.clone())
        .with_temperature(config.provider.temperature)
        .with_timeout(std::time::Duration::from_secs(config.provider.timeout_secs));

    Ok(provider)
}

/// Read input from a file, or from stdin when the path is absent or "-".
pub fn read_input(input: Option<&PathBuf>) -> anyhow::Result<String> {
    match input {
        Some(path) if path.as_os_str() != "-" => {
            std::fs::read_to_string(path)
                .map_err(|e| anyhow::anyhow!("cannot read {}: {}", path.display(), e))
        }
        _ => {
            let mut text = String::new();
            std::io::stdin().read_to_string(&mut text)?;
            Ok(text)
        }
    }
}
