//! Spectral data and model preprocessing

pub mod preprocess;
pub mod record;

pub use preprocess::{
    first_difference, fit_length, preprocess, validate, PreprocessError, MIN_POINTS,
};
pub use record::{absorbance, SpectralRecord};
