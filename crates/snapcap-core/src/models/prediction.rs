//! Classifier predictions consumed by the caption composer.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

/// Maximum number of predictions kept per image.
pub const MAX_PREDICTIONS: usize = 8;

/// One ranked classification result for an image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    /// Class identifier from the model vocabulary (ImageNet wnid).
    #[serde(default)]
    pub id: String,

    /// Raw class label, e.g. `"golden_retriever"`.
    pub label: String,

    /// Confidence score (0.0 - 1.0).
    pub score: f32,
}

impl Prediction {
    pub fn new(id: impl Into<String>, label: impl Into<String>, score: f32) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            score,
        }
    }

    /// Prediction without a class identifier.
    pub fn labelled(label: impl Into<String>, score: f32) -> Self {
        Self::new(String::new(), label, score)
    }
}

/// Order predictions by descending score and keep at most [`MAX_PREDICTIONS`].
///
/// The sort is stable, so equal scores keep their input order. NaN scores
/// sink to the end.
pub fn rank(mut predictions: Vec<Prediction>) -> Vec<Prediction> {
    predictions.sort_by(|a, b| match (a.score.is_nan(), b.score.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal),
    });
    predictions.truncate(MAX_PREDICTIONS);
    predictions
}
