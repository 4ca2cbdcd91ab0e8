//! Configuration for the captioning pipeline.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::caption::CaptionThresholds;
use crate::classify::TensorLayout;
use crate::error::SnapcapError;

/// Main configuration for snapcap.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SnapcapConfig {
    /// Image classifier configuration.
    pub classifier: ClassifierConfig,

    /// Caption composition configuration.
    pub caption: CaptionConfig,
}

/// Image classifier configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Directory containing the model and class index.
    pub model_dir: PathBuf,

    /// ONNX classifier file name.
    pub model_file: String,

    /// ImageNet class index file name (Keras JSON format).
    pub labels_file: String,

    /// Square input edge in pixels.
    pub input_size: u32,

    /// Input tensor layout.
    pub layout: TensorLayout,

    /// Apply softmax to the raw output. Off for models exported with a
    /// softmax head.
    pub apply_softmax: bool,

    /// Number of predictions handed to the composer.
    pub top_k: usize,

    /// Number of CPU threads for the native runtime.
    pub num_threads: usize,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            model_dir: PathBuf::from("models"),
            model_file: "inception_v3.onnx".to_string(),
            labels_file: "imagenet_class_index.json".to_string(),
            input_size: 299,
            layout: TensorLayout::Nhwc,
            apply_softmax: false,
            top_k: crate::MAX_PREDICTIONS,
            num_threads: 4,
        }
    }
}

/// Caption composition configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptionConfig {
    /// Confidence thresholds of the caption policy.
    pub thresholds: CaptionThresholds,
}

impl SnapcapConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self, SnapcapError> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &Path) -> Result<(), SnapcapError> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Reject values the classifier cannot run with.
    pub fn validate(&self) -> Result<(), SnapcapError> {
        if self.classifier.input_size == 0 {
            return Err(SnapcapError::Config("classifier.input_size must be positive".into()));
        }
        if self.classifier.top_k == 0 || self.classifier.top_k > crate::MAX_PREDICTIONS {
            return Err(SnapcapError::Config(format!(
                "classifier.top_k must be between 1 and {}",
                crate::MAX_PREDICTIONS
            )));
        }
        Ok(())
    }

    /// Full path to the classifier model.
    pub fn model_path(&self) -> PathBuf {
        self.classifier.model_dir.join(&self.classifier.model_file)
    }

    /// Full path to the class index.
    pub fn labels_path(&self) -> PathBuf {
        self.classifier.model_dir.join(&self.classifier.labels_file)
    }
}
