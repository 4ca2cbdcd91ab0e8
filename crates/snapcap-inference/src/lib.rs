//! ONNX inference layer for snapcap classifiers.
//!
//! Two backends sit behind [`InferenceBackend`]:
//! - `ort` with the XNNPACK execution provider for native builds
//! - `tract` for WASM/browser builds

mod backend;
mod error;
mod tensor;

pub use backend::InferenceBackend;
pub use error::InferenceError;
pub use tensor::{InputTensor, OutputTensor, TensorType};

#[cfg(feature = "native")]
pub use backend::ort::OrtBackend;

#[cfg(feature = "wasm")]
pub use backend::tract::TractBackend;

/// Result type for inference operations.
pub type Result<T> = std::result::Result<T, InferenceError>;
