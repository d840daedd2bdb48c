//! Inference engines

pub mod simulated;
#[cfg(feature = "tflite")]
pub mod tflite;

pub use simulated::SimulatedEngine;
#[cfg(feature = "tflite")]
pub use tflite::TfliteEngine;
