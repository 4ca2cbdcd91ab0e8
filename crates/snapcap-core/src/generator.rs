//! Whole-image captioning: prediction source + caption composer.

use std::path::Path;
use std::time::Instant;

use image::DynamicImage;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::caption::{Caption, CaptionComposer, TemplateChooser, ThreadRngChooser};
use crate::classify::PredictionSource;
use crate::error::{Result, SnapcapError};
use crate::models::prediction::{Prediction, rank};

/// Caption returned when the prediction source fails or finds nothing.
pub const ERROR_CAPTION: &str = "Error processing image";

/// Predictions for an image together with the caption built from them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Described {
    pub predictions: Vec<Prediction>,
    pub caption: Caption,
    pub processing_time_ms: u64,
}

/// Captions images using a prediction source and a composer.
pub struct CaptionGenerator<S: PredictionSource, C: TemplateChooser = ThreadRngChooser> {
    source: S,
    composer: CaptionComposer<C>,
}

impl<S: PredictionSource> CaptionGenerator<S> {
    /// Generator with a default composer.
    pub fn new(source: S) -> Self {
        Self::with_composer(source, CaptionComposer::new())
    }
}

impl<S: PredictionSource, C: TemplateChooser> CaptionGenerator<S, C> {
    pub fn with_composer(source: S, composer: CaptionComposer<C>) -> Self {
        Self { source, composer }
    }

    pub fn composer(&self) -> &CaptionComposer<C> {
        &self.composer
    }

    /// Classify and caption a decoded image.
    pub fn describe_image(&self, image: &DynamicImage) -> Result<Described> {
        let start = Instant::now();

        let predictions = rank(self.source.predict(image)?);
        if predictions.is_empty() {
            return Err(SnapcapError::NoPredictions);
        }

        let caption = self.composer.compose(&predictions);
        let processing_time_ms = start.elapsed().as_millis() as u64;
        debug!("Captioned image in {}ms: {}", processing_time_ms, caption.text);

        Ok(Described {
            predictions,
            caption,
            processing_time_ms,
        })
    }

    /// Decode, classify and caption an image file.
    pub fn describe_file(&self, path: &Path) -> Result<Described> {
        debug!("Captioning {}", path.display());
        let image = image::open(path)?;
        self.describe_image(&image)
    }

    /// Caption a decoded image; failures become [`ERROR_CAPTION`].
    pub fn caption_image(&self, image: &DynamicImage) -> String {
        match self.describe_image(image) {
            Ok(described) => described.caption.text,
            Err(e) => {
                warn!("Error processing image: {}", e);
                ERROR_CAPTION.to_string()
            }
        }
    }

    /// Caption an image file; failures become [`ERROR_CAPTION`].
    pub fn generate_caption(&self, path: &Path) -> String {
        match self.describe_file(path) {
            Ok(described) => described.caption.text,
            Err(e) => {
                warn!("Error processing image {}: {}", path.display(), e);
                ERROR_CAPTION.to_string()
            }
        }
    }
}

#[cfg(feature = "native")]
mod native {
    use tracing::info;

    use super::CaptionGenerator;
    use crate::caption::CaptionComposer;
    use crate::classify::{ClassIndex, ImageClassifier, ImagePreprocessor};
    use crate::error::{ClassifyError, Result};
    use crate::models::config::SnapcapConfig;
    use snapcap_inference::OrtBackend;

    /// Load the ONNX Runtime backed classifier described by `config`.
    pub fn create_classifier_from_config(config: &SnapcapConfig) -> Result<ImageClassifier<OrtBackend>> {
        config.validate()?;
        let classifier_config = &config.classifier;

        let model_path = config.model_path();
        let labels_path = config.labels_path();
        info!("Loading classifier from {}", model_path.display());

        if !model_path.exists() {
            return Err(ClassifyError::ModelLoad(format!("model not found: {}", model_path.display())).into());
        }

        let backend = OrtBackend::from_file_with_threads(&model_path, classifier_config.num_threads)?;
        let classes = ClassIndex::from_file(&labels_path)?;

        Ok(ImageClassifier::new(backend, classes)
            .with_preprocessor(
                ImagePreprocessor::new()
                    .with_input_size(classifier_config.input_size)
                    .with_layout(classifier_config.layout),
            )
            .with_top_k(classifier_config.top_k)
            .with_softmax(classifier_config.apply_softmax))
    }

    /// Build an ONNX Runtime backed generator from configuration.
    pub fn create_generator_from_config(
        config: &SnapcapConfig,
    ) -> Result<CaptionGenerator<ImageClassifier<OrtBackend>>> {
        let classifier = create_classifier_from_config(config)?;
        let composer = CaptionComposer::new().with_thresholds(config.caption.thresholds);
        Ok(CaptionGenerator::with_composer(classifier, composer))
    }
}

#[cfg(feature = "native")]
pub use native::{create_classifier_from_config, create_generator_from_config};
