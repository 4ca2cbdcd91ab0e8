//! Subcommand implementations.

pub mod caption;
pub mod compose;
pub mod config;

use std::path::{Path, PathBuf};

use snapcap_core::{SeededChooser, SnapcapConfig, TemplateChooser, ThreadRngChooser};
use tracing::debug;

/// Output format shared by the captioning commands.
#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// CSV output
    Csv,
    /// Plain text, one caption per line
    Text,
}

pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("snapcap")
        .join("config.json")
}

/// Load the configuration named on the command line, else the user's
/// config file if it exists, else defaults.
pub fn load_config(config_path: Option<&str>) -> anyhow::Result<SnapcapConfig> {
    if let Some(path) = config_path {
        debug!("Loading config from {}", path);
        return Ok(SnapcapConfig::from_file(Path::new(path))?);
    }

    let default_path = default_config_path();
    if default_path.exists() {
        debug!("Loading config from {}", default_path.display());
        Ok(SnapcapConfig::from_file(&default_path)?)
    } else {
        Ok(SnapcapConfig::default())
    }
}

/// Seeded chooser when a seed is given, OS randomness otherwise.
pub fn chooser_for(seed: Option<u64>) -> Box<dyn TemplateChooser> {
    match seed {
        Some(seed) => Box::new(SeededChooser::new(seed)),
        None => Box::new(ThreadRngChooser),
    }
}
