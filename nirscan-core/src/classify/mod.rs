//! Arg-max classification
//!
//! Maps a model output vector onto the fixed substance set, gated by a
//! minimum confidence.

pub mod classes;
pub mod classifier;

pub use classes::{ClassSet, MAX_CLASSES};
pub use classifier::{classify, SpectralClassifier, CONFIDENCE_THRESHOLD};
