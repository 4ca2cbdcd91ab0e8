//! Error types for the inference layer.

use thiserror::Error;

/// Errors raised while loading or running an ONNX classifier.
#[derive(Error, Debug)]
pub enum InferenceError {
    /// The model bytes could not be parsed or optimized.
    #[error("failed to load model: {0}")]
    ModelLoad(String),

    /// The runtime session could not be created.
    #[error("failed to create session: {0}")]
    SessionCreate(String),

    /// An input tensor had the wrong shape or element type.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("inference failed: {0}")]
    InferenceFailed(String),

    /// An output tensor could not be converted back to ndarray.
    #[error("failed to extract output: {0}")]
    OutputExtraction(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
