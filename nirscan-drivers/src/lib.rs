//! Hardware and inference backend implementations
//!
//! This crate provides concrete implementations of the traits defined
//! in nirscan-core:
//!
//! - ADC readers (ADS1115 over `embedded-hal` I2C)
//! - Inference engines (built-in simulated model, TFLite behind the
//!   `tflite` feature)

#![deny(unsafe_code)]

pub mod model;
pub mod sensor;
