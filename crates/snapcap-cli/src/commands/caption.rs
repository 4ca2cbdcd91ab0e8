//! Caption command - classify and caption image files.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use clap::Args;
use console::style;
use glob::glob;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use tracing::{debug, error, warn};

use snapcap_core::{
    CaptionComposer, CaptionGenerator, Described, ERROR_CAPTION, Prediction, create_classifier_from_config,
};

use super::{OutputFormat, chooser_for, load_config};

const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "bmp", "webp"];

/// Arguments for the caption command.
#[derive(Args)]
pub struct CaptionArgs {
    /// Input image files or glob patterns
    #[arg(required = true)]
    inputs: Vec<String>,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    format: OutputFormat,

    /// Model directory (overrides config)
    #[arg(short, long)]
    model_dir: Option<PathBuf>,

    /// Include ranked predictions in JSON output
    #[arg(long)]
    details: bool,

    /// Seed for reproducible template choice
    #[arg(long)]
    seed: Option<u64>,

    /// Continue on error
    #[arg(long)]
    continue_on_error: bool,
}

/// Caption outcome for one file.
#[derive(Debug, Serialize)]
struct CaptionRecord {
    file: PathBuf,
    caption: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    branch: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    scene: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    context: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    predictions: Vec<Prediction>,
    processing_time_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl CaptionRecord {
    fn success(file: PathBuf, described: Described, details: bool) -> Self {
        Self {
            file,
            caption: described.caption.text,
            branch: Some(described.caption.branch.to_string()),
            scene: Some(described.caption.scene.to_string()),
            context: described.caption.context.map(|c| c.to_string()),
            predictions: if details { described.predictions } else { Vec::new() },
            processing_time_ms: described.processing_time_ms,
            error: None,
        }
    }

    fn failure(file: PathBuf, error: String, processing_time_ms: u64) -> Self {
        Self {
            file,
            caption: ERROR_CAPTION.to_string(),
            branch: None,
            scene: None,
            context: None,
            predictions: Vec::new(),
            processing_time_ms,
            error: Some(error),
        }
    }
}

#[derive(Serialize)]
struct CaptionReport<'a> {
    generated_at: DateTime<Utc>,
    model: String,
    results: &'a [CaptionRecord],
}

pub async fn run(args: CaptionArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    let mut config = load_config(config_path)?;
    if let Some(model_dir) = &args.model_dir {
        config.classifier.model_dir = model_dir.clone();
    }

    let files = collect_inputs(&args.inputs)?;
    if files.is_empty() {
        anyhow::bail!("No matching image files found for: {}", args.inputs.join(" "));
    }
    debug!("Found {} images to caption", files.len());

    let classifier = create_classifier_from_config(&config)
        .map_err(|e| anyhow::anyhow!("Failed to load classifier: {}", e))?;
    let composer = CaptionComposer::with_chooser(chooser_for(args.seed))
        .with_thresholds(config.caption.thresholds);
    let generator = Arc::new(CaptionGenerator::with_composer(classifier, composer));

    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} images")?
            .progress_chars("=>-"),
    );

    let mut records = Vec::with_capacity(files.len());
    for path in files {
        let file_start = Instant::now();
        let worker = Arc::clone(&generator);
        let job_path = path.clone();
        let result = tokio::task::spawn_blocking(move || worker.describe_file(&job_path)).await?;

        match result {
            Ok(described) => records.push(CaptionRecord::success(path, described, args.details)),
            Err(e) => {
                let error_msg = e.to_string();
                if args.continue_on_error {
                    warn!("Failed to caption {}: {}", path.display(), error_msg);
                    let elapsed = file_start.elapsed().as_millis() as u64;
                    records.push(CaptionRecord::failure(path, error_msg, elapsed));
                } else {
                    pb.abandon();
                    error!("Failed to caption {}: {}", path.display(), error_msg);
                    anyhow::bail!("Captioning failed: {}", error_msg);
                }
            }
        }

        pb.inc(1);
    }

    pb.finish_and_clear();

    let output = format_records(&records, args.format, &config.classifier.model_file)?;

    if let Some(output_path) = &args.output {
        fs::write(output_path, &output)?;
        eprintln!("{} Output written to {}", style("✓").green(), output_path.display());
    } else {
        println!("{}", output);
    }

    let failed = records.iter().filter(|r| r.error.is_some()).count();
    eprintln!(
        "{} Captioned {} images in {:?} ({} failed)",
        style("✓").green(),
        records.len() - failed,
        start.elapsed(),
        style(failed).red()
    );

    Ok(())
}

/// Expand paths and glob patterns into image files, keeping input order and
/// dropping duplicates.
fn collect_inputs(inputs: &[String]) -> anyhow::Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for input in inputs {
        let path = Path::new(input);
        if path.is_file() {
            push_unique(&mut files, path.to_path_buf());
            continue;
        }

        for entry in glob(input)?.filter_map(|r| r.ok()) {
            if entry.is_file() && is_image(&entry) {
                push_unique(&mut files, entry);
            }
        }
    }

    Ok(files)
}

fn push_unique(files: &mut Vec<PathBuf>, path: PathBuf) {
    if !files.contains(&path) {
        files.push(path);
    }
}

fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

fn format_records(records: &[CaptionRecord], format: OutputFormat, model: &str) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => {
            let report = CaptionReport {
                generated_at: Utc::now(),
                model: model.to_string(),
                results: records,
            };
            Ok(serde_json::to_string_pretty(&report)?)
        }
        OutputFormat::Csv => format_csv(records),
        OutputFormat::Text => Ok(format_text(records)),
    }
}

fn format_csv(records: &[CaptionRecord]) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record([
        "filename",
        "caption",
        "branch",
        "scene",
        "context",
        "top_label",
        "top_score",
        "processing_time_ms",
        "error",
    ])?;

    for record in records {
        let top = record.predictions.first();
        wtr.write_record([
            record.file.display().to_string(),
            record.caption.clone(),
            record.branch.clone().unwrap_or_default(),
            record.scene.clone().unwrap_or_default(),
            record.context.clone().unwrap_or_default(),
            top.map(|p| p.label.clone()).unwrap_or_default(),
            top.map(|p| format!("{:.4}", p.score)).unwrap_or_default(),
            record.processing_time_ms.to_string(),
            record.error.clone().unwrap_or_default(),
        ])?;
    }

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data.trim_end().to_string())
}

fn format_text(records: &[CaptionRecord]) -> String {
    if let [record] = records {
        return record.caption.clone();
    }

    records
        .iter()
        .map(|record| format!("{}: {}", record.file.display(), record.caption))
        .collect::<Vec<_>>()
        .join("\n")
}
