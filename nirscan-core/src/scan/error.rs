//! Per-scan failures
//!
//! Every failure a scan attempt can hit ends up here. None of them are
//! fatal to the process: the worker converts them into a failed outcome
//! and the UI shows the short code plus the detail string.

use core::fmt;

use crate::spectrum::PreprocessError;
use crate::traits::InferenceError;

/// Kinds of per-scan failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanErrorKind {
    /// External acquisition program exited non-zero or could not start
    Acquisition,
    /// No artifact newer than the pre-scan baseline
    ArtifactNotFound,
    /// Artifact exists but could not be read or parsed
    ArtifactUnreadable,
    /// Absorbance series has undefined points or is too short
    DataValidation,
    /// Input tensor shape cannot be reconciled with the model
    InferenceShape,
    /// Forward pass failed
    Inference,
}

impl ScanErrorKind {
    /// Short code shown on the error view
    pub fn code(&self) -> &'static str {
        match self {
            ScanErrorKind::Acquisition => "ACQ",
            ScanErrorKind::ArtifactNotFound => "NOFILE",
            ScanErrorKind::ArtifactUnreadable => "IO",
            ScanErrorKind::DataValidation => "DATA",
            ScanErrorKind::InferenceShape => "SHAPE",
            ScanErrorKind::Inference => "INFER",
        }
    }
}

impl fmt::Display for ScanErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// A failed scan attempt
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}: {detail}")]
pub struct ScanError {
    pub kind: ScanErrorKind,
    pub detail: String,
}

impl ScanError {
    pub fn new(kind: ScanErrorKind, detail: impl Into<String>) -> Self {
        Self {
            kind,
            detail: detail.into(),
        }
    }

    pub fn code(&self) -> &'static str {
        self.kind.code()
    }
}

impl From<PreprocessError> for ScanError {
    fn from(e: PreprocessError) -> Self {
        ScanError::new(ScanErrorKind::DataValidation, e.to_string())
    }
}

impl From<InferenceError> for ScanError {
    fn from(e: InferenceError) -> Self {
        let kind = match e {
            InferenceError::Shape(_) => ScanErrorKind::InferenceShape,
            _ => ScanErrorKind::Inference,
        };
        ScanError::new(kind, e.to_string())
    }
}
