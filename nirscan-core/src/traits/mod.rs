//! Hardware abstraction traits
//!
//! These traits define the interface between the application logic
//! and hardware-specific (or simulated) implementations.

pub mod adc;
pub mod inference;

pub use adc::{AdcReader, SensorError};
pub use inference::{InferenceEngine, InferenceError, InputTensor, TensorShape};
