//! ImageNet classifier running on an inference backend.

use image::DynamicImage;
use tracing::debug;

use snapcap_inference::{InferenceBackend, InputTensor};

use super::class_index::ClassIndex;
use super::preprocessing::ImagePreprocessor;
use super::PredictionSource;
use crate::error::ClassifyError;
use crate::models::prediction::{MAX_PREDICTIONS, Prediction, rank};

/// Image classifier producing ranked ImageNet predictions.
pub struct ImageClassifier<B: InferenceBackend> {
    backend: B,
    preprocessor: ImagePreprocessor,
    classes: ClassIndex,
    top_k: usize,
    apply_softmax: bool,
}

impl<B: InferenceBackend> ImageClassifier<B> {
    /// Create a classifier with InceptionV3 preprocessing and top-8 output.
    pub fn new(backend: B, classes: ClassIndex) -> Self {
        Self {
            backend,
            preprocessor: ImagePreprocessor::new(),
            classes,
            top_k: MAX_PREDICTIONS,
            apply_softmax: false,
        }
    }

    pub fn with_preprocessor(mut self, preprocessor: ImagePreprocessor) -> Self {
        self.preprocessor = preprocessor;
        self
    }

    /// Number of predictions to return (clamped to 1..=8).
    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k.clamp(1, MAX_PREDICTIONS);
        self
    }

    /// Treat the model output as logits and normalize with softmax.
    pub fn with_softmax(mut self, apply: bool) -> Self {
        self.apply_softmax = apply;
        self
    }

    /// Classify an image.
    pub fn classify(&self, image: &DynamicImage) -> Result<Vec<Prediction>, ClassifyError> {
        let tensor = self.preprocessor.preprocess(image)?;
        let input_name = self
            .backend
            .input_names()
            .first()
            .map(String::as_str)
            .unwrap_or("input");

        let outputs = self
            .backend
            .run(&[(input_name, InputTensor::Float32(tensor))])
            .map_err(|e| ClassifyError::Inference(e.to_string()))?;

        let (name, output) = outputs
            .into_iter()
            .next()
            .ok_or_else(|| ClassifyError::InvalidOutput("model produced no outputs".to_string()))?;

        let scores = output
            .to_f32_vec()
            .ok_or_else(|| ClassifyError::InvalidOutput(format!("output '{}' is not float", name)))?;

        let predictions = self.decode(scores)?;
        if let Some(top) = predictions.first() {
            debug!("Top prediction: {} ({:.3})", top.label, top.score);
        }
        Ok(predictions)
    }

    /// Map raw class scores to the top-k labelled predictions.
    fn decode(&self, mut scores: Vec<f32>) -> Result<Vec<Prediction>, ClassifyError> {
        // TF-slim exports prepend a background class
        if scores.len() == self.classes.len() + 1 {
            scores.remove(0);
        }
        if scores.len() != self.classes.len() {
            return Err(ClassifyError::InvalidOutput(format!(
                "expected {} class scores, got {}",
                self.classes.len(),
                scores.len()
            )));
        }

        if self.apply_softmax {
            softmax(&mut scores);
        }

        let predictions = scores
            .iter()
            .enumerate()
            .filter_map(|(id, &score)| {
                self.classes
                    .get(id)
                    .map(|(wnid, label)| Prediction::new(wnid, label, score))
            })
            .collect();

        let mut ranked = rank(predictions);
        ranked.truncate(self.top_k);
        Ok(ranked)
    }
}

impl<B: InferenceBackend> PredictionSource for ImageClassifier<B> {
    fn predict(&self, image: &DynamicImage) -> Result<Vec<Prediction>, ClassifyError> {
        self.classify(image)
    }
}

/// Numerically stable in-place softmax.
fn softmax(values: &mut [f32]) {
    let max = values.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let mut sum = 0.0;
    for v in values.iter_mut() {
        *v = (*v - max).exp();
        sum += *v;
    }
    if sum > 0.0 {
        for v in values.iter_mut() {
            *v /= sum;
        }
    }
}
