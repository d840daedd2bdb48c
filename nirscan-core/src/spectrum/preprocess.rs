//! Absorbance-to-tensor preprocessing
//!
//! The model consumes the first difference of the absorbance series,
//! which cancels the baseline offset between scans. The differenced
//! series is fitted to the model's fixed length by padding with the last
//! value or truncating.

use tracing::debug;

use super::record::SpectralRecord;
use crate::traits::{InputTensor, TensorShape};

/// Minimum number of absorbance points a scan must produce
pub const MIN_POINTS: usize = 228;

/// Data validation failures
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PreprocessError {
    /// Absorbance undefined at some point (sentinel present)
    #[error("absorbance undefined at point {index}. Please scan again!")]
    Undefined { index: usize },
    /// Too few points to difference and classify
    #[error("only {len} absorbance points, need {min}. Please scan again!")]
    TooShort { len: usize, min: usize },
    /// Intensity and reference series differ in length
    #[error("intensity has {intensity} points but reference has {reference}")]
    LengthMismatch { intensity: usize, reference: usize },
    /// Raw series and absorbance differ in length
    #[error("raw series has {raw} points but absorbance has {absorbance}")]
    RawLengthMismatch { raw: usize, absorbance: usize },
}

/// Check that a series is fully defined and long enough
pub fn validate(series: &[f32], min_points: usize) -> Result<(), PreprocessError> {
    if let Some(index) = series.iter().position(|v| !v.is_finite()) {
        return Err(PreprocessError::Undefined { index });
    }
    if series.len() < min_points {
        return Err(PreprocessError::TooShort {
            len: series.len(),
            min: min_points,
        });
    }
    Ok(())
}

/// First-difference series (`x[i+1] - x[i]`, length N-1)
pub fn first_difference(series: &[f32]) -> Vec<f32> {
    series.windows(2).map(|w| w[1] - w[0]).collect()
}

/// Fit a series to `len` values
///
/// Short series are right-padded with their last value (0.0 if empty);
/// long series are truncated.
pub fn fit_length(series: &[f32], len: usize) -> Vec<f32> {
    if series.len() >= len {
        return series[..len].to_vec();
    }
    let pad = series.last().copied().unwrap_or(0.0);
    let mut out = Vec::with_capacity(len);
    out.extend_from_slice(series);
    out.resize(len, pad);
    out
}

/// Turn a record into a model-ready input tensor
///
/// Validation happens before any tensor work, so a short or undefined
/// series never reaches the inference runtime.
pub fn preprocess(
    record: &SpectralRecord,
    shape: TensorShape,
    min_points: usize,
) -> Result<InputTensor, PreprocessError> {
    let absorbance = record.absorbance();
    validate(absorbance, min_points)?;

    let delta = first_difference(absorbance);
    if delta.len() != shape.len() {
        debug!(
            "Fitting delta series from {} to {} points",
            delta.len(),
            shape.len()
        );
    }
    let fitted = fit_length(&delta, shape.len());

    Ok(InputTensor::fitted(shape, fitted))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn ramp(n: usize) -> Vec<f32> {
        (0..n).map(|i| i as f32 * 0.01).collect()
    }

    #[test]
    fn test_validate_rejects_nan() {
        let mut series = ramp(300);
        series[17] = f32::NAN;
        assert_eq!(
            validate(&series, MIN_POINTS),
            Err(PreprocessError::Undefined { index: 17 })
        );
    }

    #[test]
    fn test_validate_rejects_short() {
        assert_eq!(
            validate(&ramp(227), MIN_POINTS),
            Err(PreprocessError::TooShort { len: 227, min: 228 })
        );
        assert_eq!(validate(&ramp(228), MIN_POINTS), Ok(()));
    }

    #[test]
    fn test_first_difference() {
        assert_eq!(first_difference(&[1.0, 3.0, 6.0, 10.0]), vec![2.0, 3.0, 4.0]);
        assert!(first_difference(&[1.0]).is_empty());
        assert!(first_difference(&[]).is_empty());
    }

    #[test]
    fn test_fit_length_pads_with_last() {
        assert_eq!(fit_length(&[1.0, 2.0], 4), vec![1.0, 2.0, 2.0, 2.0]);
        assert_eq!(fit_length(&[], 2), vec![0.0, 0.0]);
    }

    #[test]
    fn test_fit_length_truncates() {
        assert_eq!(fit_length(&[1.0, 2.0, 3.0], 2), vec![1.0, 2.0]);
        assert_eq!(fit_length(&[1.0, 2.0], 2), vec![1.0, 2.0]);
    }

    #[test]
    fn test_preprocess_pads_227_deltas_to_228() {
        let record = SpectralRecord::from_absorbance(ramp(228));
        let shape = TensorShape::SequenceChannel { len: 228 };
        let tensor = preprocess(&record, shape, MIN_POINTS).unwrap();
        assert_eq!(tensor.data().len(), 228);
        assert_eq!(tensor.shape(), shape);
        let last = tensor.data()[226];
        assert_eq!(tensor.data()[227], last);
    }

    #[test]
    fn test_preprocess_truncates_long_series() {
        let record = SpectralRecord::from_absorbance(ramp(400));
        let shape = TensorShape::Sequence { len: 227 };
        let tensor = preprocess(&record, shape, MIN_POINTS).unwrap();
        assert_eq!(tensor.data().len(), 227);
    }

    #[test]
    fn test_preprocess_rejects_short_before_tensor() {
        let record = SpectralRecord::from_absorbance(ramp(100));
        let shape = TensorShape::Sequence { len: 227 };
        assert_eq!(
            preprocess(&record, shape, MIN_POINTS),
            Err(PreprocessError::TooShort { len: 100, min: 228 })
        );
    }

    #[test]
    fn test_preprocess_rejects_missing_reference() {
        let record = SpectralRecord::new(vec![1.0; 300], None).unwrap();
        let shape = TensorShape::Sequence { len: 299 };
        assert_eq!(
            preprocess(&record, shape, MIN_POINTS),
            Err(PreprocessError::Undefined { index: 0 })
        );
    }

    proptest! {
        #[test]
        fn prop_pad_then_truncate_is_identity(
            series in proptest::collection::vec(-10.0f32..10.0, 0..300),
            extra in 0usize..64,
        ) {
            let padded = fit_length(&series, series.len() + extra);
            prop_assert_eq!(padded.len(), series.len() + extra);
            prop_assert_eq!(fit_length(&padded, series.len()), series);
        }

        #[test]
        fn prop_fit_length_always_exact(
            series in proptest::collection::vec(-10.0f32..10.0, 0..300),
            len in 1usize..400,
        ) {
            prop_assert_eq!(fit_length(&series, len).len(), len);
        }

        #[test]
        fn prop_short_series_never_validates(len in 0usize..MIN_POINTS) {
            prop_assert!(validate(&ramp(len), MIN_POINTS).is_err());
        }
    }
}
