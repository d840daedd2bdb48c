//! TFLite model backend
//!
//! Loads a `.tflite` flatbuffer once through tract and runs it on the
//! calling thread. Float input is fed directly; other input dtypes get a
//! plain cast, without quantization parameters.

use std::path::Path;

use nirscan_core::traits::{InferenceEngine, InferenceError, InputTensor, TensorShape};
use tracing::{debug, info};
use tract_tflite::prelude::*;

type Plan = TypedRunnableModel<TypedModel>;

/// A loaded, optimized TFLite model
pub struct TfliteEngine {
    plan: Plan,
    shape: TensorShape,
    input_dt: DatumType,
    output_len: usize,
}

fn load_err(e: impl core::fmt::Display) -> InferenceError {
    InferenceError::Load(e.to_string())
}

fn runtime_err(e: impl core::fmt::Display) -> InferenceError {
    InferenceError::Runtime(e.to_string())
}

impl TfliteEngine {
    /// Load and optimize the model at `path`
    ///
    /// Fails if the file is missing, malformed, or has an input layout
    /// other than `[1, N]` / `[1, N, 1]`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, InferenceError> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(InferenceError::Load(format!(
                "model not found: {}",
                path.display()
            )));
        }

        let model = tract_tflite::tflite()
            .model_for_path(path)
            .map_err(load_err)?
            .into_optimized()
            .map_err(load_err)?;

        let input = model.input_fact(0).map_err(load_err)?.clone();
        let dims = input
            .shape
            .as_concrete()
            .ok_or_else(|| InferenceError::Shape("symbolic input shape".into()))?;
        let shape = TensorShape::from_dims(dims)?;

        let output = model.output_fact(0).map_err(load_err)?.clone();
        let output_len = output
            .shape
            .as_concrete()
            .map(|d| d.iter().product())
            .ok_or_else(|| InferenceError::Shape("symbolic output shape".into()))?;

        let plan = model.into_runnable().map_err(load_err)?;

        info!(
            "Loaded model {} input {} {:?} output {}",
            path.display(),
            shape,
            input.datum_type,
            output_len
        );

        Ok(Self {
            plan,
            shape,
            input_dt: input.datum_type,
            output_len,
        })
    }
}

impl InferenceEngine for TfliteEngine {
    fn input_shape(&self) -> TensorShape {
        self.shape
    }

    fn output_len(&self) -> usize {
        self.output_len
    }

    fn infer(&self, input: &InputTensor) -> Result<Vec<f32>, InferenceError> {
        if input.shape() != self.shape {
            return Err(InferenceError::Shape(format!(
                "got {}, model takes {}",
                input.shape(),
                self.shape
            )));
        }

        let mut x = Tensor::from_shape(&self.shape.dims(), input.data()).map_err(runtime_err)?;
        if self.input_dt != f32::datum_type() {
            debug!("Casting input to {:?}", self.input_dt);
            x = x.cast_to_dt(self.input_dt).map_err(runtime_err)?.into_owned();
        }

        let outputs = self.plan.run(tvec!(x.into_tvalue())).map_err(runtime_err)?;
        let first = outputs
            .first()
            .ok_or_else(|| InferenceError::Runtime("model produced no output".into()))?;
        let scores = first.cast_to::<f32>().map_err(runtime_err)?;
        let scores = scores.as_slice::<f32>().map_err(runtime_err)?.to_vec();

        if scores.len() != self.output_len {
            return Err(InferenceError::Shape(format!(
                "{} scores, expected {}",
                scores.len(),
                self.output_len
            )));
        }
        Ok(scores)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_model_is_load_error() {
        let err = TfliteEngine::load("/nonexistent/model.tflite").err();
        assert!(matches!(err, Some(InferenceError::Load(_))));
    }
}
