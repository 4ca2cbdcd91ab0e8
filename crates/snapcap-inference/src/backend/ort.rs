//! ONNX Runtime (ort) backend for native platforms with XNNPACK.

use std::path::Path;
use std::sync::Mutex;

use ndarray::{ArrayD, IxDyn};
use ort::ep::XNNPACK;
use ort::session::builder::GraphOptimizationLevel;
use ort::session::{Session, SessionInputValue};
use ort::value::Tensor;
use tracing::debug;

use crate::error::InferenceError;
use crate::tensor::{InputTensor, OutputTensor};
use crate::{InferenceBackend, Result};

const DEFAULT_INTRA_THREADS: usize = 4;

/// Backend using ONNX Runtime for native inference.
pub struct OrtBackend {
    // `Session::run` needs `&mut`, so concurrent callers queue here.
    session: Mutex<Session>,
    input_names: Vec<String>,
    output_names: Vec<String>,
}

impl OrtBackend {
    /// Load a model from a file path.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::from_file_with_threads(path, DEFAULT_INTRA_THREADS)
    }

    /// Load a model from a file path, using `threads` intra-op threads.
    pub fn from_file_with_threads<P: AsRef<Path>>(path: P, threads: usize) -> Result<Self> {
        let path = path.as_ref();
        debug!("Loading classifier model from: {}", path.display());

        let bytes = std::fs::read(path)?;
        Self::from_bytes_with_threads(&bytes, threads)
    }

    /// Load a model from bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Self::from_bytes_with_threads(bytes, DEFAULT_INTRA_THREADS)
    }

    /// Load a model from bytes, using `threads` intra-op threads.
    pub fn from_bytes_with_threads(bytes: &[u8], threads: usize) -> Result<Self> {
        debug!("Loading classifier model from {} bytes ({} threads)", bytes.len(), threads);

        let session = Session::builder()
            .map_err(|e| InferenceError::SessionCreate(e.to_string()))?
            .with_execution_providers([XNNPACK::default().build()])
            .map_err(|e| InferenceError::SessionCreate(e.to_string()))?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(|e| InferenceError::SessionCreate(e.to_string()))?
            .with_intra_threads(threads.max(1))
            .map_err(|e| InferenceError::SessionCreate(e.to_string()))?
            .commit_from_memory(bytes)
            .map_err(|e| InferenceError::ModelLoad(e.to_string()))?;

        let input_names: Vec<String> = session
            .inputs()
            .iter()
            .map(|i| i.name().to_string())
            .collect();

        let output_names: Vec<String> = session
            .outputs()
            .iter()
            .map(|o| o.name().to_string())
            .collect();

        debug!("Model inputs: {:?}, outputs: {:?}", input_names, output_names);

        Ok(Self {
            session: Mutex::new(session),
            input_names,
            output_names,
        })
    }

    fn convert_input(tensor: &InputTensor) -> Result<SessionInputValue<'static>> {
        let shape: Vec<i64> = tensor.shape().iter().map(|&s| s as i64).collect();
        let value = match tensor {
            InputTensor::Float32(arr) => {
                let data: Vec<f32> = arr.iter().copied().collect();
                Tensor::from_array((shape, data)).map(Into::into)
            }
            InputTensor::Int64(arr) => {
                let data: Vec<i64> = arr.iter().copied().collect();
                Tensor::from_array((shape, data)).map(Into::into)
            }
        };
        value.map_err(|e| InferenceError::InvalidInput(e.to_string()))
    }
}

fn to_array<T: Clone>(shape: &[i64], data: &[T]) -> Result<ArrayD<T>> {
    let shape: Vec<usize> = shape.iter().map(|&s| s as usize).collect();
    ArrayD::from_shape_vec(IxDyn(&shape), data.to_vec())
        .map_err(|e| InferenceError::OutputExtraction(e.to_string()))
}

impl InferenceBackend for OrtBackend {
    fn run(&self, inputs: &[(&str, InputTensor)]) -> Result<Vec<(String, OutputTensor)>> {
        let ort_inputs = inputs
            .iter()
            .map(|(name, tensor)| Ok((*name, Self::convert_input(tensor)?)))
            .collect::<Result<Vec<_>>>()?;

        let mut session = self
            .session
            .lock()
            .map_err(|e| InferenceError::InferenceFailed(format!("session lock poisoned: {}", e)))?;

        let outputs = session
            .run(ort_inputs)
            .map_err(|e| InferenceError::InferenceFailed(e.to_string()))?;

        let mut results = Vec::with_capacity(outputs.len());

        for (name, value) in outputs.iter() {
            let tensor = if let Ok((shape, data)) = value.try_extract_tensor::<f32>() {
                OutputTensor::Float32(to_array(shape, data)?)
            } else if let Ok((shape, data)) = value.try_extract_tensor::<i64>() {
                OutputTensor::Int64(to_array(shape, data)?)
            } else {
                return Err(InferenceError::OutputExtraction(format!(
                    "unsupported output type for '{}'",
                    name
                )));
            };

            results.push((name.to_string(), tensor));
        }

        Ok(results)
    }

    fn input_names(&self) -> &[String] {
        &self.input_names
    }

    fn output_names(&self) -> &[String] {
        &self.output_names
    }
}
