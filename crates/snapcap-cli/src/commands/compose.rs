//! Compose command - caption a prediction list without running a model.

use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;

use clap::Args;
use serde::Deserialize;
use tracing::{debug, info};

use snapcap_core::{Caption, CaptionComposer, Prediction, rank};

use super::{OutputFormat, chooser_for, load_config};

/// Arguments for the compose command.
#[derive(Args)]
pub struct ComposeArgs {
    /// Prediction as LABEL=SCORE (repeatable, in any order)
    #[arg(short, long = "prediction", value_name = "LABEL=SCORE")]
    predictions: Vec<String>,

    /// JSON file with predictions ("-" for stdin). Read from stdin when no
    /// --prediction is given.
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    format: OutputFormat,

    /// Seed for reproducible template choice
    #[arg(long)]
    seed: Option<u64>,
}

/// Accepted JSON shapes for one prediction.
#[derive(Deserialize)]
#[serde(untagged)]
enum PredictionEntry {
    Object(Prediction),
    Pair(String, f32),
    Triple(String, String, f32),
}

impl From<PredictionEntry> for Prediction {
    fn from(entry: PredictionEntry) -> Self {
        match entry {
            PredictionEntry::Object(prediction) => prediction,
            PredictionEntry::Pair(label, score) => Prediction::labelled(label, score),
            PredictionEntry::Triple(id, label, score) => Prediction::new(id, label, score),
        }
    }
}

pub async fn run(args: ComposeArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;

    let mut predictions = args
        .predictions
        .iter()
        .map(|raw| parse_prediction(raw))
        .collect::<anyhow::Result<Vec<_>>>()?;

    if args.input.is_some() || predictions.is_empty() {
        predictions.extend(read_predictions(args.input.as_ref())?);
    }

    let predictions = rank(predictions);
    debug!("Composing from {} predictions", predictions.len());

    let composer = CaptionComposer::with_chooser(chooser_for(args.seed))
        .with_thresholds(config.caption.thresholds);
    let caption = composer.compose(&predictions);
    info!("Branch {} ({})", caption.branch, caption.scene);

    println!("{}", format_caption(&caption, args.format)?);

    Ok(())
}

/// Parse `LABEL=SCORE`; the split is on the last `=`.
pub fn parse_prediction(raw: &str) -> anyhow::Result<Prediction> {
    let (label, score) = raw
        .rsplit_once('=')
        .ok_or_else(|| anyhow::anyhow!("Expected LABEL=SCORE, got: {}", raw))?;

    let label = label.trim();
    if label.is_empty() {
        anyhow::bail!("Empty label in prediction: {}", raw);
    }

    let score: f32 = score
        .trim()
        .parse()
        .map_err(|_| anyhow::anyhow!("Invalid score in prediction: {}", raw))?;

    Ok(Prediction::labelled(label, score))
}

/// Read a JSON array of predictions from a file or stdin.
fn read_predictions(input: Option<&PathBuf>) -> anyhow::Result<Vec<Prediction>> {
    let content = match input {
        Some(path) if path.as_os_str() != "-" => fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Failed to read {}: {}", path.display(), e))?,
        _ => {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer)?;
            buffer
        }
    };

    if content.trim().is_empty() {
        return Ok(Vec::new());
    }

    let entries: Vec<PredictionEntry> = serde_json::from_str(&content)
        .map_err(|e| anyhow::anyhow!("Invalid predictions JSON: {}", e))?;

    Ok(entries.into_iter().map(Prediction::from).collect())
}

fn format_caption(caption: &Caption, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(caption)?),
        OutputFormat::Csv => {
            let mut wtr = csv::Writer::from_writer(vec![]);
            wtr.write_record(["caption", "branch", "scene", "context"])?;
            wtr.write_record([
                caption.text.as_str(),
                caption.branch.as_str(),
                caption.scene.as_str(),
                caption.context.map(|c| c.as_str()).unwrap_or_default(),
            ])?;
            let data = String::from_utf8(wtr.into_inner()?)?;
            Ok(data.trim_end().to_string())
        }
        OutputFormat::Text => Ok(caption.text.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_prediction() {
        let prediction = parse_prediction("golden_retriever=0.82").unwrap();
        assert_eq!(prediction.label, "golden_retriever");
        assert!((prediction.score - 0.82).abs() < 1e-6);
    }

    #[test]
    fn test_parse_prediction_splits_on_last_equals() {
        let prediction = parse_prediction("a=b=0.5").unwrap();
        assert_eq!(prediction.label, "a=b");
    }

    #[test]
    fn test_parse_prediction_rejects_malformed() {
        assert!(parse_prediction("pizza").is_err());
        assert!(parse_prediction("=0.5").is_err());
        assert!(parse_prediction("pizza=high").is_err());
    }

    #[test]
    fn test_prediction_entry_shapes() {
        let json = r#"[
            {"label": "pizza", "score": 0.5},
            ["table", 0.3],
            ["n03201208", "dining_table", 0.1]
        ]"#;
        let entries: Vec<PredictionEntry> = serde_json::from_str(json).unwrap();
        let predictions: Vec<Prediction> = entries.into_iter().map(Prediction::from).collect();

        assert_eq!(predictions[0].label, "pizza");
        assert_eq!(predictions[1].label, "table");
        assert_eq!(predictions[2].id, "n03201208");
        assert_eq!(predictions[2].label, "dining_table");
    }
}
