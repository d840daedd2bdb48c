//! Spectral classifier
//!
//! Preprocesses a record, runs the model, and maps the best score onto a
//! substance. Every failure becomes a [`ScanOutcome::Failed`]; nothing
//! here panics or propagates past the outcome.

use tracing::{debug, info};

use super::classes::ClassSet;
use crate::scan::{ScanError, ScanErrorKind, ScanOutcome};
use crate::spectrum::{preprocess, SpectralRecord, MIN_POINTS};
use crate::traits::{InferenceEngine, InputTensor};

/// Minimum best-class score for a detection
pub const CONFIDENCE_THRESHOLD: f32 = 0.8;

/// Map model scores onto a substance
///
/// A best score strictly below `threshold` is [`ScanOutcome::Undetected`];
/// a score exactly at the threshold counts as a detection. Ties go to the
/// lowest index.
pub fn classify(scores: &[f32], classes: &ClassSet, threshold: f32) -> ScanOutcome {
    if scores.len() != classes.len() {
        return ScanError::new(
            ScanErrorKind::InferenceShape,
            format!(
                "model produced {} scores for {} classes",
                scores.len(),
                classes.len()
            ),
        )
        .into();
    }
    if let Some(index) = scores.iter().position(|s| !s.is_finite()) {
        return ScanError::new(
            ScanErrorKind::Inference,
            format!("non-finite score at class {}", index),
        )
        .into();
    }

    let mut best = 0;
    for (i, &score) in scores.iter().enumerate().skip(1) {
        if score > scores[best] {
            best = i;
        }
    }
    let confidence = scores[best];

    if confidence < threshold {
        debug!("Best score {:.3} below threshold {:.2}", confidence, threshold);
        return ScanOutcome::Undetected;
    }

    match classes.get(best) {
        Some(label) => ScanOutcome::detected(label, confidence),
        // Unreachable once lengths match
        None => ScanError::new(ScanErrorKind::InferenceShape, "class index out of range").into(),
    }
}

/// Model plus the class set and thresholds it was trained for
pub struct SpectralClassifier<E: InferenceEngine> {
    engine: E,
    classes: ClassSet,
    threshold: f32,
    min_points: usize,
}

impl<E: InferenceEngine> SpectralClassifier<E> {
    /// Create a classifier with the default class set and thresholds
    pub fn new(engine: E) -> Self {
        Self {
            engine,
            classes: ClassSet::default(),
            threshold: CONFIDENCE_THRESHOLD,
            min_points: MIN_POINTS,
        }
    }

    pub fn with_classes(mut self, classes: ClassSet) -> Self {
        self.classes = classes;
        self
    }

    pub fn with_threshold(mut self, threshold: f32) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn with_min_points(mut self, min_points: usize) -> Self {
        self.min_points = min_points;
        self
    }

    pub fn classes(&self) -> &ClassSet {
        &self.classes
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Validate and shape a record for the model
    pub fn preprocess(&self, record: &SpectralRecord) -> Result<InputTensor, ScanError> {
        Ok(preprocess(record, self.engine.input_shape(), self.min_points)?)
    }

    /// Run the model on a prepared tensor
    pub fn infer(&self, input: &InputTensor) -> Result<Vec<f32>, ScanError> {
        Ok(self.engine.infer(input)?)
    }

    /// Map scores onto a substance using this classifier's settings
    pub fn classify(&self, scores: &[f32]) -> ScanOutcome {
        classify(scores, &self.classes, self.threshold)
    }

    /// Full record-to-outcome pipeline
    pub fn run(&self, record: &SpectralRecord) -> ScanOutcome {
        let input = match self.preprocess(record) {
            Ok(input) => input,
            Err(e) => return e.into(),
        };
        let scores = match self.infer(&input) {
            Ok(scores) => scores,
            Err(e) => return e.into(),
        };
        let outcome = self.classify(&scores);
        match &outcome {
            ScanOutcome::Detected { label, confidence } => {
                info!("Detected {} ({:.1}%)", label, confidence * 100.0)
            }
            ScanOutcome::Undetected => info!("No substance above threshold"),
            ScanOutcome::Failed(e) => info!("Classification failed: {}", e),
        }
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::{InferenceError, TensorShape};
    use core::sync::atomic::{AtomicUsize, Ordering};

    /// Engine returning fixed scores and counting calls
    struct FixedEngine {
        scores: Vec<f32>,
        calls: AtomicUsize,
    }

    impl FixedEngine {
        fn new(scores: &[f32]) -> Self {
            Self {
                scores: scores.to_vec(),
                calls: AtomicUsize::new(0),
            }
        }
    }

    impl InferenceEngine for FixedEngine {
        fn input_shape(&self) -> TensorShape {
            TensorShape::SequenceChannel { len: 228 }
        }

        fn output_len(&self) -> usize {
            self.scores.len()
        }

        fn infer(&self, input: &InputTensor) -> Result<Vec<f32>, InferenceError> {
            assert_eq!(input.data().len(), 228);
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.scores.clone())
        }
    }

    struct FailingEngine;

    impl InferenceEngine for FailingEngine {
        fn input_shape(&self) -> TensorShape {
            TensorShape::Sequence { len: 228 }
        }

        fn output_len(&self) -> usize {
            3
        }

        fn infer(&self, _input: &InputTensor) -> Result<Vec<f32>, InferenceError> {
            Err(InferenceError::Runtime("interpreter crashed".into()))
        }
    }

    fn good_record() -> SpectralRecord {
        SpectralRecord::from_absorbance((0..228).map(|i| (i as f32 * 0.05).sin()).collect())
    }

    #[test]
    fn test_classify_detects_salt() {
        let outcome = classify(&[0.02, 0.95, 0.03], &ClassSet::default(), CONFIDENCE_THRESHOLD);
        assert_eq!(outcome, ScanOutcome::detected("Salt", 0.95));
    }

    #[test]
    fn test_classify_below_threshold() {
        let outcome = classify(&[0.3, 0.3, 0.3], &ClassSet::default(), CONFIDENCE_THRESHOLD);
        assert_eq!(outcome, ScanOutcome::Undetected);
    }

    #[test]
    fn test_threshold_is_inclusive() {
        let outcome = classify(&[0.1, 0.1, 0.8], &ClassSet::default(), CONFIDENCE_THRESHOLD);
        assert_eq!(outcome, ScanOutcome::detected("Sugar", 0.8));

        let outcome = classify(&[0.1, 0.1, 0.7999], &ClassSet::default(), CONFIDENCE_THRESHOLD);
        assert_eq!(outcome, ScanOutcome::Undetected);
    }

    #[test]
    fn test_tie_goes_to_lowest_index() {
        let outcome = classify(&[0.9, 0.9, 0.1], &ClassSet::default(), CONFIDENCE_THRESHOLD);
        assert_eq!(outcome, ScanOutcome::detected("MSG", 0.9));
    }

    #[test]
    fn test_score_count_mismatch() {
        match classify(&[0.9, 0.1], &ClassSet::default(), CONFIDENCE_THRESHOLD) {
            ScanOutcome::Failed(e) => assert_eq!(e.kind, ScanErrorKind::InferenceShape),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_nan_score_fails() {
        match classify(&[f32::NAN, 0.9, 0.1], &ClassSet::default(), CONFIDENCE_THRESHOLD) {
            ScanOutcome::Failed(e) => assert_eq!(e.kind, ScanErrorKind::Inference),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_run_detects() {
        let classifier = SpectralClassifier::new(FixedEngine::new(&[0.02, 0.95, 0.03]));
        assert_eq!(classifier.run(&good_record()), ScanOutcome::detected("Salt", 0.95));
        assert_eq!(classifier.engine().calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_short_series_fails_before_inference() {
        let classifier = SpectralClassifier::new(FixedEngine::new(&[0.02, 0.95, 0.03]));
        let record = SpectralRecord::from_absorbance(vec![0.5; 100]);
        match classifier.run(&record) {
            ScanOutcome::Failed(e) => assert_eq!(e.kind, ScanErrorKind::DataValidation),
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(classifier.engine().calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_undefined_point_fails_before_inference() {
        let classifier = SpectralClassifier::new(FixedEngine::new(&[0.02, 0.95, 0.03]));
        let mut series = vec![0.5; 228];
        series[40] = f32::NAN;
        let record = SpectralRecord::from_absorbance(series);
        assert!(classifier.run(&record).is_failure());
        assert_eq!(classifier.engine().calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_engine_failure_becomes_outcome() {
        let classifier = SpectralClassifier::new(FailingEngine);
        match classifier.run(&good_record()) {
            ScanOutcome::Failed(e) => {
                assert_eq!(e.kind, ScanErrorKind::Inference);
                assert!(e.detail.contains("interpreter crashed"));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_custom_threshold() {
        let classifier =
            SpectralClassifier::new(FixedEngine::new(&[0.6, 0.3, 0.1])).with_threshold(0.5);
        assert_eq!(classifier.run(&good_record()), ScanOutcome::detected("MSG", 0.6));
    }
}
