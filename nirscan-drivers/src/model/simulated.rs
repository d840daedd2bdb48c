//! Built-in stand-in model
//!
//! Splits the input into one segment per class, scores each segment by
//! its total absolute slope, and applies a softmax. A spectrum with one
//! sharp band scores high on the class owning that segment; a smooth
//! spectrum scores near-uniform and stays undetected.

use nirscan_core::spectrum::MIN_POINTS;
use nirscan_core::traits::{InferenceEngine, InferenceError, InputTensor, TensorShape};

/// Softmax gain applied to segment activity
pub const DEFAULT_GAIN: f32 = 4.0;

/// Deterministic engine used by the simulated backend and in tests
#[derive(Debug, Clone)]
pub struct SimulatedEngine {
    shape: TensorShape,
    classes: usize,
    gain: f32,
}

impl SimulatedEngine {
    /// Engine for `classes` outputs with the standard `[1, 228, 1]` input
    pub fn new(classes: usize) -> Self {
        Self {
            shape: TensorShape::SequenceChannel { len: MIN_POINTS },
            classes: classes.max(1),
            gain: DEFAULT_GAIN,
        }
    }

    pub fn with_shape(mut self, shape: TensorShape) -> Self {
        self.shape = shape;
        self
    }

    pub fn with_gain(mut self, gain: f32) -> Self {
        self.gain = gain;
        self
    }

    /// Index range of the input owned by a class
    pub fn segment(&self, class: usize) -> core::ops::Range<usize> {
        let len = self.shape.len();
        let start = class * len / self.classes;
        let end = (class + 1) * len / self.classes;
        start..end
    }
}

fn softmax(logits: &[f32]) -> Vec<f32> {
    let max = logits.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let exps: Vec<f32> = logits.iter().map(|&l| (l - max).exp()).collect();
    let sum: f32 = exps.iter().sum();
    exps.into_iter().map(|e| e / sum).collect()
}

impl InferenceEngine for SimulatedEngine {
    fn input_shape(&self) -> TensorShape {
        self.shape
    }

    fn output_len(&self) -> usize {
        self.classes
    }

    fn infer(&self, input: &InputTensor) -> Result<Vec<f32>, InferenceError> {
        if input.shape() != self.shape {
            return Err(InferenceError::Shape(format!(
                "got {}, model takes {}",
                input.shape(),
                self.shape
            )));
        }
        let data = input.data();
        let logits: Vec<f32> = (0..self.classes)
            .map(|c| {
                let activity: f32 = data[self.segment(c)].iter().map(|v| v.abs()).sum();
                activity * self.gain
            })
            .collect();
        if logits.iter().any(|l| !l.is_finite()) {
            return Err(InferenceError::Runtime("non-finite activation".into()));
        }
        Ok(softmax(&logits))
    }
}
