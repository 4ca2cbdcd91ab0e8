//! Tract backend for WASM classifier inference.

use std::io::Read;
use std::path::Path;

use ndarray::{ArrayD, IxDyn};
use tract_onnx::prelude::*;
use tracing::debug;

use crate::error::InferenceError;
use crate::tensor::{InputTensor, OutputTensor};
use crate::{InferenceBackend, Result};

/// Default input fact: one 299x299 RGB image in NHWC order.
pub const DEFAULT_INPUT_SHAPE: [usize; 4] = [1, 299, 299, 3];

type Plan = SimplePlan<TypedFact, Box<dyn TypedOp>, Graph<TypedFact, Box<dyn TypedOp>>>;

/// Backend using Tract for pure-Rust ONNX inference.
pub struct TractBackend {
    model: Plan,
    input_names: Vec<String>,
    output_names: Vec<String>,
}

impl TractBackend {
    /// Load a model from a file path with [`DEFAULT_INPUT_SHAPE`].
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::from_file_with_shape(path, &DEFAULT_INPUT_SHAPE)
    }

    /// Load a model from a file path with a concrete input shape.
    pub fn from_file_with_shape<P: AsRef<Path>>(path: P, input_shape: &[usize]) -> Result<Self> {
        let path = path.as_ref();
        debug!("Loading classifier model with Tract from: {}", path.display());

        let mut file = std::fs::File::open(path)?;
        Self::from_reader(&mut file, input_shape)
    }

    /// Load a model from bytes with [`DEFAULT_INPUT_SHAPE`].
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Self::from_bytes_with_shape(bytes, &DEFAULT_INPUT_SHAPE)
    }

    /// Load a model from bytes with a concrete input shape.
    pub fn from_bytes_with_shape(bytes: &[u8], input_shape: &[usize]) -> Result<Self> {
        debug!("Loading classifier model with Tract from {} bytes", bytes.len());
        Self::from_reader(&mut std::io::Cursor::new(bytes), input_shape)
    }

    fn from_reader(reader: &mut dyn Read, input_shape: &[usize]) -> Result<Self> {
        let mut model = tract_onnx::onnx()
            .model_for_read(reader)
            .map_err(|e| InferenceError::ModelLoad(format!("Failed to load model: {}", e)))?;

        // Dynamic batch/spatial dims must be pinned before typing.
        model
            .set_input_fact(0, InferenceFact::dt_shape(f32::datum_type(), input_shape))
            .map_err(|e| InferenceError::ModelLoad(format!("Failed to set input shape: {}", e)))?;

        let input_names = model
            .input_outlets()
            .map_err(|e| InferenceError::ModelLoad(e.to_string()))?
            .iter()
            .map(|outlet| model.node(outlet.node).name.clone())
            .collect();
        let output_names = model
            .output_outlets()
            .map_err(|e| InferenceError::ModelLoad(e.to_string()))?
            .iter()
            .map(|outlet| model.node(outlet.node).name.clone())
            .collect();

        let model = model
            .into_typed()
            .map_err(|e| InferenceError::ModelLoad(format!("Failed to type model: {}", e)))?
            .into_optimized()
            .map_err(|e| InferenceError::ModelLoad(format!("Failed to optimize: {}", e)))?
            .into_runnable()
            .map_err(|e| InferenceError::SessionCreate(e.to_string()))?;

        Ok(Self {
            model,
            input_names,
            output_names,
        })
    }

    fn convert_input(tensor: &InputTensor) -> Result<TValue> {
        let shape = tensor.shape().to_vec();
        let value = match tensor {
            InputTensor::Float32(arr) => {
                tract_ndarray::ArrayD::from_shape_vec(
                    tract_ndarray::IxDyn(&shape),
                    arr.iter().copied().collect::<Vec<f32>>(),
                )
                .map(|a| a.into_tvalue())
            }
            InputTensor::Int64(arr) => {
                tract_ndarray::ArrayD::from_shape_vec(
                    tract_ndarray::IxDyn(&shape),
                    arr.iter().copied().collect::<Vec<i64>>(),
                )
                .map(|a| a.into_tvalue())
            }
        };
        value.map_err(|e| InferenceError::InvalidInput(e.to_string()))
    }
}

impl InferenceBackend for TractBackend {
    fn run(&self, inputs: &[(&str, InputTensor)]) -> Result<Vec<(String, OutputTensor)>> {
        // Tract binds inputs positionally.
        let tract_inputs: TVec<TValue> = inputs
            .iter()
            .map(|(_, tensor)| Self::convert_input(tensor))
            .collect::<Result<TVec<_>>>()?;

        let outputs = self
            .model
            .run(tract_inputs)
            .map_err(|e| InferenceError::InferenceFailed(e.to_string()))?;

        let mut results = Vec::with_capacity(outputs.len());

        for (idx, output) in outputs.iter().enumerate() {
            let name = self
                .output_names
                .get(idx)
                .cloned()
                .unwrap_or_else(|| format!("output_{}", idx));

            let tensor = if let Ok(view) = output.to_array_view::<f32>() {
                let data: Vec<f32> = view.iter().copied().collect();
                ArrayD::from_shape_vec(IxDyn(view.shape()), data).map(OutputTensor::Float32)
            } else if let Ok(view) = output.to_array_view::<i64>() {
                let data: Vec<i64> = view.iter().copied().collect();
                ArrayD::from_shape_vec(IxDyn(view.shape()), data).map(OutputTensor::Int64)
            } else {
                return Err(InferenceError::OutputExtraction(format!(
                    "unsupported output type for '{}'",
                    name
                )));
            }
            .map_err(|e| InferenceError::OutputExtraction(e.to_string()))?;

            results.push((name, tensor));
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
