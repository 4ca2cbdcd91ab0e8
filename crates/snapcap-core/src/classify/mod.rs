//! Prediction sources: image in, ranked labels out.

mod class_index;
mod classifier;
mod preprocessing;

pub use class_index::ClassIndex;
pub use classifier::ImageClassifier;
pub use preprocessing::{ImagePreprocessor, TensorLayout};

use image::DynamicImage;

use crate::error::ClassifyError;
use crate::models::prediction::Prediction;

/// Anything that can rank labels for an image.
pub trait PredictionSource: Send + Sync {
    /// Predictions for `image`, highest score first, at most
    /// [`MAX_PREDICTIONS`](crate::MAX_PREDICTIONS) entries.
    fn predict(&self, image: &DynamicImage) -> Result<Vec<Prediction>, ClassifyError>;
}

impl<T: PredictionSource + ?Sized> PredictionSource for Box<T> {
    fn predict(&self, image: &DynamicImage) -> Result<Vec<Prediction>, ClassifyError> {
        (**self).predict(image)
    }
}
