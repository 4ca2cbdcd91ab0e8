//! Config command - manage configuration.

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Args, Subcommand};
use console::style;
use serde_json::Value;

use snapcap_core::SnapcapConfig;

use super::default_config_path;

/// Arguments for the config command.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    command: ConfigCommand,
}

#[derive(Subcommand)]
enum ConfigCommand {
    /// Show current configuration
    Show,

    /// Initialize a new configuration file
    Init(InitArgs),

    /// Get a specific configuration value
    Get {
        /// Configuration key (e.g., "caption.thresholds.confident")
        key: String,
    },

    /// Set a configuration value
    Set {
        /// Configuration key
        key: String,
        /// New value
        value: String,
    },

    /// Show configuration file path
    Path,
}

#[derive(Args)]
struct InitArgs {
    /// Output path for configuration file
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Overwrite existing file
    #[arg(long)]
    force: bool,
}

pub async fn run(args: ConfigArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let path = config_path.map(PathBuf::from).unwrap_or_else(default_config_path);

    match args.command {
        ConfigCommand::Show => show_config(&path),
        ConfigCommand::Init(init_args) => init_config(init_args, path),
        ConfigCommand::Get { key } => get_config(&path, &key),
        ConfigCommand::Set { key, value } => set_config(&path, &key, &value),
        ConfigCommand::Path => show_path(&path),
    }
}

fn load_or_default(path: &Path) -> anyhow::Result<SnapcapConfig> {
    if path.exists() {
        Ok(SnapcapConfig::from_file(path)?)
    } else {
        Ok(SnapcapConfig::default())
    }
}

fn show_config(path: &Path) -> anyhow::Result<()> {
    if !path.exists() {
        eprintln!("{} No config file found, showing defaults.", style("ℹ").blue());
    }
    let config = load_or_default(path)?;

    println!("{}", serde_json::to_string_pretty(&config)?);

    Ok(())
}

fn init_config(args: InitArgs, path: PathBuf) -> anyhow::Result<()> {
    let output_path = args.output.unwrap_or(path);

    if output_path.exists() && !args.force {
        anyhow::bail!(
            "Config file already exists at {}. Use --force to overwrite.",
            output_path.display()
        );
    }

    if let Some(parent) = output_path.parent() {
        fs::create_dir_all(parent)?;
    }

    SnapcapConfig::default().save(&output_path)?;

    println!(
        "{} Created configuration file at {}",
        style("✓").green(),
        output_path.display()
    );

    Ok(())
}

fn get_config(path: &Path, key: &str) -> anyhow::Result<()> {
    let json = config_json(&load_or_default(path)?)?;
    let value = lookup(&json, key).ok_or_else(|| anyhow::anyhow!("Configuration key not found: {}", key))?;

    println!("{}", serde_json::to_string_pretty(value)?);

    Ok(())
}

fn set_config(path: &Path, key: &str, value: &str) -> anyhow::Result<()> {
    let config = load_or_default(path)?;

    // Bare words that are not valid JSON are stored as strings.
    let parsed_value: Value = serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_string()));

    let mut json = config_json(&config)?;
    assign(&mut json, key, parsed_value.clone())?;

    let config: SnapcapConfig = serde_json::from_value(json)
        .map_err(|e| anyhow::anyhow!("Invalid value for {}: {}", key, e))?;
    config.validate()?;

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    config.save(path)?;

    println!(
        "{} Set {} = {}",
        style("✓").green(),
        key,
        serde_json::to_string(&parsed_value)?
    );

    Ok(())
}

fn show_path(path: &Path) -> anyhow::Result<()> {
    println!("Configuration file: {}", path.display());

    if path.exists() {
        println!("Status: {}", style("exists").green());
    } else {
        println!("Status: {}", style("not created").yellow());
        println!();
        println!("Run 'snapcap config init' to create a configuration file.");
    }

    Ok(())
}

/// Config as a JSON tree with floats as `show` prints them.
///
/// `to_value` widens `f32` thresholds to `f64` (0.7 becomes 0.699999988079071);
/// going through text keeps the shortest `f32` form.
fn config_json(config: &SnapcapConfig) -> anyhow::Result<Value> {
    Ok(serde_json::from_str(&serde_json::to_string(config)?)?)
}

/// Follow a dotted key through nested objects.
fn lookup<'v>(json: &'v Value, key: &str) -> Option<&'v Value> {
    key.split('.').try_fold(json, |current, part| current.get(part))
}

/// Replace the value at an existing dotted key.
fn assign(json: &mut Value, key: &str, value: Value) -> anyhow::Result<()> {
    let mut current = json;
    for part in key.split('.') {
        current = current
            .get_mut(part)
            .ok_or_else(|| anyhow::anyhow!("Configuration key not found: {}", key))?;
    }
    *current = value;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_lookup_nested_key() {
        let json = config_json(&SnapcapConfig::default()).unwrap();
        assert_eq!(lookup(&json, "classifier.input_size"), Some(&json!(299)));
        assert_eq!(lookup(&json, "classifier.layout"), Some(&json!("nhwc")));
        assert!(lookup(&json, "classifier.missing").is_none());
    }

    #[test]
    fn test_assign_existing_key_only() {
        let mut json = config_json(&SnapcapConfig::default()).unwrap();

        assign(&mut json, "caption.thresholds.single", json!(0.25)).unwrap();
        assert_eq!(lookup(&json, "caption.thresholds.single"), Some(&json!(0.25)));

        assert!(assign(&mut json, "caption.thresholds.bogus", json!(1)).is_err());
    }

    #[test]
    fn test_thresholds_print_like_show() {
        let config = SnapcapConfig::default();
        let json = config_json(&config).unwrap();
        let confident = lookup(&json, "caption.thresholds.confident").unwrap();

        assert_eq!(serde_json::to_string_pretty(confident).unwrap(), "0.7");
        assert!(serde_json::to_string_pretty(&config).unwrap().contains("\"confident\": 0.7,"));
    }

    #[test]
    fn test_set_and_reload() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.json");

        set_config(&path, "classifier.top_k", "5").unwrap();
        set_config(&path, "classifier.model_file", "resnet50.onnx").unwrap();

        let config = SnapcapConfig::from_file(&path).unwrap();
        assert_eq!(config.classifier.top_k, 5);
        assert_eq!(config.classifier.model_file, "resnet50.onnx");
    }

    #[test]
    fn test_set_rejects_invalid_values() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.json");

        assert!(set_config(&path, "classifier.top_k", "0").is_err());
        assert!(set_config(&path, "classifier.input_size", "\"big\"").is_err());
        assert!(!path.exists());
    }
}
