//! Board-agnostic core logic for the handheld spectrometer
//!
//! This crate contains all application logic that does not depend on
//! specific hardware, processes or threads:
//!
//! - Hardware abstraction traits (ADC reader, inference engine)
//! - Button mapping and press edge detection
//! - UI state machine (menu and scan screens)
//! - Scan outcome and per-scan error taxonomy
//! - Spectral preprocessing (absorbance, differencing, length fitting)
//! - Arg-max classification against a fixed substance set
//! - Configuration type definitions

#![deny(unsafe_code)]

pub mod classify;
pub mod config;
pub mod input;
pub mod scan;
pub mod spectrum;
pub mod state;
pub mod traits;
