//! Spectral record
//!
//! One scan's samples: optional wavelength axis, detector intensity,
//! optional reference (lamp) intensity, and the absorbance derived from
//! the two. Undefined absorbance points are NaN, never zero.

use super::preprocess::PreprocessError;

/// Absorbance `-log10(intensity / reference)`
///
/// Returns NaN when the reference is not positive or the ratio is not
/// positive (including NaN inputs).
pub fn absorbance(intensity: f32, reference: f32) -> f32 {
    if reference > 0.0 {
        let ratio = intensity / reference;
        if ratio > 0.0 {
            return -ratio.log10();
        }
    }
    f32::NAN
}

/// One scan's sample series
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SpectralRecord {
    wavelength: Option<Vec<f32>>,
    intensity: Vec<f32>,
    reference: Option<Vec<f32>>,
    absorbance: Vec<f32>,
}

impl SpectralRecord {
    /// Build a record from raw detector data, deriving absorbance
    ///
    /// Without a reference channel the absorbance is undefined everywhere.
    pub fn new(intensity: Vec<f32>, reference: Option<Vec<f32>>) -> Result<Self, PreprocessError> {
        let absorbance = match &reference {
            Some(reference) => {
                if reference.len() != intensity.len() {
                    return Err(PreprocessError::LengthMismatch {
                        intensity: intensity.len(),
                        reference: reference.len(),
                    });
                }
                intensity
                    .iter()
                    .zip(reference)
                    .map(|(&i, &r)| absorbance(i, r))
                    .collect()
            }
            None => vec![f32::NAN; intensity.len()],
        };

        Ok(Self {
            wavelength: None,
            intensity,
            reference,
            absorbance,
        })
    }

    /// Build a record from an already-derived absorbance series
    ///
    /// Used when only the persisted absorbance column is available.
    pub fn from_absorbance(absorbance: Vec<f32>) -> Self {
        Self {
            wavelength: None,
            intensity: Vec::new(),
            reference: None,
            absorbance,
        }
    }

    /// Attach the wavelength axis (nm)
    pub fn with_wavelength(mut self, wavelength: Vec<f32>) -> Self {
        self.wavelength = Some(wavelength);
        self
    }

    /// Attach raw detector series without re-deriving absorbance
    ///
    /// Both series must match the absorbance length.
    pub fn with_raw(
        mut self,
        intensity: Vec<f32>,
        reference: Option<Vec<f32>>,
    ) -> Result<Self, PreprocessError> {
        if let Some(reference) = &reference {
            if reference.len() != intensity.len() {
                return Err(PreprocessError::LengthMismatch {
                    intensity: intensity.len(),
                    reference: reference.len(),
                });
            }
        }
        if intensity.len() != self.absorbance.len() {
            return Err(PreprocessError::RawLengthMismatch {
                raw: intensity.len(),
                absorbance: self.absorbance.len(),
            });
        }
        self.intensity = intensity;
        self.reference = reference;
        Ok(self)
    }

    pub fn wavelength(&self) -> Option<&[f32]> {
        self.wavelength.as_deref()
    }

    pub fn intensity(&self) -> &[f32] {
        &self.intensity
    }

    pub fn reference(&self) -> Option<&[f32]> {
        self.reference.as_deref()
    }

    pub fn absorbance(&self) -> &[f32] {
        &self.absorbance
    }

    /// Number of samples in the absorbance series
    pub fn len(&self) -> usize {
        self.absorbance.len()
    }

    pub fn is_empty(&self) -> bool {
        self.absorbance.is_empty()
    }
}
