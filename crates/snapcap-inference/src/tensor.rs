//! Tensors exchanged with the inference backends.
//!
//! Image classifiers only ever feed float pixels and read back float
//! scores or integer class ids, so only those element types are modelled.

use ndarray::{ArrayD, IxDyn};

use crate::error::InferenceError;

/// Element type of a tensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TensorType {
    Float32,
    Int64,
}

/// Input tensor for inference.
#[derive(Debug, Clone)]
pub enum InputTensor {
    Float32(ArrayD<f32>),
    Int64(ArrayD<i64>),
}

impl InputTensor {
    pub fn shape(&self) -> &[usize] {
        match self {
            InputTensor::Float32(arr) => arr.shape(),
            InputTensor::Int64(arr) => arr.shape(),
        }
    }

    pub fn dtype(&self) -> TensorType {
        match self {
            InputTensor::Float32(_) => TensorType::Float32,
            InputTensor::Int64(_) => TensorType::Int64,
        }
    }

    /// Build a Float32 tensor from a flat buffer.
    ///
    /// Fails when `data.len()` does not match the product of `shape`.
    pub fn from_f32(data: Vec<f32>, shape: &[usize]) -> Result<Self, InferenceError> {
        ArrayD::from_shape_vec(IxDyn(shape), data)
            .map(InputTensor::Float32)
            .map_err(|e| InferenceError::InvalidInput(e.to_string()))
    }
}

/// Output tensor from inference.
#[derive(Debug, Clone)]
pub enum OutputTensor {
    Float32(ArrayD<f32>),
    Int64(ArrayD<i64>),
}

impl OutputTensor {
    pub fn shape(&self) -> &[usize] {
        match self {
            OutputTensor::Float32(arr) => arr.shape(),
            OutputTensor::Int64(arr) => arr.shape(),
        }
    }

    pub fn dtype(&self) -> TensorType {
        match self {
            OutputTensor::Float32(_) => TensorType::Float32,
            OutputTensor::Int64(_) => TensorType::Int64,
        }
    }

    /// Try to get the inner Float32 array.
    pub fn as_f32(&self) -> Option<&ArrayD<f32>> {
        match self {
            OutputTensor::Float32(arr) => Some(arr),
            _ => None,
        }
    }

    /// Flatten a Float32 output (e.g. `[1, 1000]` class scores) into a vector.
    pub fn to_f32_vec(&self) -> Option<Vec<f32>> {
        self.as_f32().map(|arr| arr.iter().copied().collect())
    }
}
