//! Inference backend implementations.

#[cfg(feature = "native")]
pub mod ort;

#[cfg(feature = "wasm")]
pub mod tract;

use crate::{InputTensor, OutputTensor, Result};

/// A loaded ONNX model that can be run on named input tensors.
///
/// Implemented by `ort` on native targets and `tract` in the browser so
/// classifiers can stay generic over the runtime.
pub trait InferenceBackend: Send + Sync {
    /// Run the model and return its named outputs in declaration order.
    fn run(&self, inputs: &[(&str, InputTensor)]) -> Result<Vec<(String, OutputTensor)>>;

    /// Input names expected by the model.
    fn input_names(&self) -> &[String];

    /// Output names produced by the model.
    fn output_names(&self) -> &[String];
}
