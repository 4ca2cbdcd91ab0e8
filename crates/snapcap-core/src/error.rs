//! Error types for the snapcap-core library.

use thiserror::Error;

/// Main error type for the snapcap library.
#[derive(Error, Debug)]
pub enum SnapcapError {
    /// Image classification error.
    #[error("classification error: {0}")]
    Classify(#[from] ClassifyError),

    /// Error from the inference layer.
    #[error("inference error: {0}")]
    Inference(#[from] snapcap_inference::InferenceError),

    /// Image decoding error.
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The prediction source returned nothing for an image.
    #[error("no predictions returned for image")]
    NoPredictions,

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors raised by a prediction source.
#[derive(Error, Debug)]
pub enum ClassifyError {
    /// Failed to load the classifier model.
    #[error("failed to load model: {0}")]
    ModelLoad(String),

    /// Failed to load or parse the class index.
    #[error("invalid class index: {0}")]
    ClassIndex(String),

    /// Image preprocessing failed.
    #[error("preprocessing failed: {0}")]
    Preprocessing(String),

    /// Running the model failed.
    #[error("inference failed: {0}")]
    Inference(String),

    /// The model produced an output that cannot be decoded as class scores.
    #[error("unexpected model output: {0}")]
    InvalidOutput(String),
}

/// Errors from rendering a caption template.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TemplateError {
    /// The template names a slot with no value.
    #[error("unknown template slot '{0}'")]
    UnknownSlot(String),

    /// A `{` without a closing `}`.
    #[error("unterminated slot in template '{0}'")]
    Unterminated(String),
}

/// Result type for the snapcap library.
pub type Result<T> = std::result::Result<T, SnapcapError>;
