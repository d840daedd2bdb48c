//! Terminal result of one scan attempt

use heapless::String;

use super::error::ScanError;

/// Maximum substance label length
pub const MAX_LABEL_LEN: usize = 16;

/// Substance label
pub type Label = String<MAX_LABEL_LEN>;

/// Result of a completed scan worker run
///
/// Created once per run and superseded, never merged, by the next one.
#[derive(Debug, Clone, PartialEq)]
pub enum ScanOutcome {
    /// A substance cleared the confidence threshold
    ///
    /// `confidence` is always within `0.0..=1.0`.
    Detected { label: Label, confidence: f32 },
    /// The best class stayed below the threshold
    Undetected,
    /// The attempt failed somewhere in the pipeline
    Failed(ScanError),
}

impl ScanOutcome {
    /// Build a detection, clamping the confidence into `0.0..=1.0`
    pub fn detected(label: &str, confidence: f32) -> Self {
        let mut l = Label::new();
        for c in label.chars() {
            if l.push(c).is_err() {
                break;
            }
        }
        ScanOutcome::Detected {
            label: l,
            confidence: confidence.clamp(0.0, 1.0),
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, ScanOutcome::Failed(_))
    }
}

impl From<ScanError> for ScanOutcome {
    fn from(e: ScanError) -> Self {
        ScanOutcome::Failed(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_confidence_clamped() {
        match ScanOutcome::detected("Salt", 1.7) {
            ScanOutcome::Detected { confidence, .. } => assert_eq!(confidence, 1.0),
            other => panic!("unexpected {:?}", other),
        }
        match ScanOutcome::detected("Salt", -0.2) {
            ScanOutcome::Detected { confidence, .. } => assert_eq!(confidence, 0.0),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_long_label_truncated() {
        match ScanOutcome::detected("Monosodium glutamate", 0.9) {
            ScanOutcome::Detected { label, .. } => assert_eq!(label.as_str(), "Monosodium gluta"),
            other => panic!("unexpected {:?}", other),
        }
    }
}
