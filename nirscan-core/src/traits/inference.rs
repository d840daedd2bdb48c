//! Inference runtime trait
//!
//! The model takes a single input tensor of shape `[1, N]` or `[1, N, 1]`
//! and produces one score per substance class.

use core::fmt;
use std::sync::Arc;

/// Errors that can occur loading or running the model
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InferenceError {
    /// Model artifact missing or malformed (startup-time only)
    #[error("model load failed: {0}")]
    Load(String),
    /// Tensor shape that preprocessing cannot reconcile
    #[error("unsupported tensor shape: {0}")]
    Shape(String),
    /// Forward pass failed
    #[error("inference failed: {0}")]
    Runtime(String),
}

/// Supported model input layouts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TensorShape {
    /// `[1, len]`
    Sequence { len: usize },
    /// `[1, len, 1]`
    SequenceChannel { len: usize },
}

impl TensorShape {
    /// Interpret raw model dimensions
    pub fn from_dims(dims: &[usize]) -> Result<Self, InferenceError> {
        match *dims {
            [1, len] if len > 0 => Ok(TensorShape::Sequence { len }),
            [1, len, 1] if len > 0 => Ok(TensorShape::SequenceChannel { len }),
            _ => Err(InferenceError::Shape(format!("{:?}", dims))),
        }
    }

    /// Sequence length the model expects
    pub fn len(&self) -> usize {
        match *self {
            TensorShape::Sequence { len } | TensorShape::SequenceChannel { len } => len,
        }
    }

    /// Full dimension list, batch first
    pub fn dims(&self) -> Vec<usize> {
        match *self {
            TensorShape::Sequence { len } => vec![1, len],
            TensorShape::SequenceChannel { len } => vec![1, len, 1],
        }
    }
}

impl fmt::Display for TensorShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.dims())
    }
}

/// Model-ready input: data laid out for a specific shape
#[derive(Debug, Clone, PartialEq)]
pub struct InputTensor {
    shape: TensorShape,
    data: Vec<f32>,
}

impl InputTensor {
    /// Pair data with a shape, rejecting a length mismatch
    pub fn new(shape: TensorShape, data: Vec<f32>) -> Result<Self, InferenceError> {
        if data.len() != shape.len() {
            return Err(InferenceError::Shape(format!(
                "{} values for shape {}",
                data.len(),
                shape
            )));
        }
        Ok(Self { shape, data })
    }

    /// Wrap data already fitted to `shape`
    pub(crate) fn fitted(shape: TensorShape, data: Vec<f32>) -> Self {
        debug_assert_eq!(data.len(), shape.len());
        Self { shape, data }
    }

    pub fn shape(&self) -> TensorShape {
        self.shape
    }

    pub fn data(&self) -> &[f32] {
        &self.data
    }
}

/// Trait for a loaded inference model
///
/// A model is loaded once at startup and is immutable afterwards, so
/// inference takes `&self` and engines are shared across scan workers.
pub trait InferenceEngine: Send + Sync {
    /// Input layout the model was built for
    fn input_shape(&self) -> TensorShape;

    /// Number of scores in the output vector
    fn output_len(&self) -> usize;

    /// Run one forward pass and return the output scores
    ///
    /// Scores are treated as already normalized; no softmax is applied.
    fn infer(&self, input: &InputTensor) -> Result<Vec<f32>, InferenceError>;
}

impl<T: InferenceEngine + ?Sized> InferenceEngine for Box<T> {
    fn input_shape(&self) -> TensorShape {
        (**self).input_shape()
    }

    fn output_len(&self) -> usize {
        (**self).output_len()
    }

    fn infer(&self, input: &InputTensor) -> Result<Vec<f32>, InferenceError> {
        (**self).infer(input)
    }
}

impl<T: InferenceEngine + ?Sized> InferenceEngine for Arc<T> {
    fn input_shape(&self) -> TensorShape {
        (**self).input_shape()
    }

    fn output_len(&self) -> usize {
        (**self).output_len()
    }

    fn infer(&self, input: &InputTensor) -> Result<Vec<f32>, InferenceError> {
        (**self).infer(input)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shape_from_dims() {
        assert_eq!(
            TensorShape::from_dims(&[1, 228]),
            Ok(TensorShape::Sequence { len: 228 })
        );
        assert_eq!(
            TensorShape::from_dims(&[1, 227, 1]),
            Ok(TensorShape::SequenceChannel { len: 227 })
        );
        assert!(TensorShape::from_dims(&[2, 228]).is_err());
        assert!(TensorShape::from_dims(&[1, 228, 3]).is_err());
        assert!(TensorShape::from_dims(&[228]).is_err());
        assert!(TensorShape::from_dims(&[1, 0]).is_err());
    }

    #[test]
    fn test_dims_roundtrip() {
        let shape = TensorShape::SequenceChannel { len: 12 };
        assert_eq!(TensorShape::from_dims(&shape.dims()), Ok(shape));
    }

    #[test]
    fn test_input_tensor_length_checked() {
        let shape = TensorShape::Sequence { len: 3 };
        assert!(InputTensor::new(shape, vec![0.0; 3]).is_ok());
        assert!(matches!(
            InputTensor::new(shape, vec![0.0; 4]),
            Err(InferenceError::Shape(_))
        ));
    }
}
