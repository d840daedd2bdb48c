//! One scan attempt, start to outcome
//!
//! Runs on the worker thread. Every step is blocking; every failure is
//! turned into a `ScanOutcome::Failed` so nothing escapes the worker.

use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use nirscan_core::classify::SpectralClassifier;
use nirscan_core::scan::{ScanError, ScanErrorKind, ScanOutcome};
use nirscan_core::traits::InferenceEngine;
use tracing::{debug, error, info};

use super::acquisition::{Acquisition, AcquisitionRequest};
use super::artifact::read_artifact;
use super::resolver::ResultResolver;

/// Shared model handle, loaded once at startup
pub type SharedClassifier = SpectralClassifier<Arc<dyn InferenceEngine>>;

/// Work executed by a scan worker
pub trait ScanJob: Send + Sync {
    /// Run one attempt to a terminal outcome
    fn run(&self) -> ScanOutcome;
}

/// Acquire, resolve, read, classify
pub struct ScanPipeline {
    acquisition: Box<dyn Acquisition>,
    resolver: ResultResolver,
    classifier: SharedClassifier,
    request: AcquisitionRequest,
    min_duration: Duration,
}

impl ScanPipeline {
    pub fn new(
        acquisition: Box<dyn Acquisition>,
        resolver: ResultResolver,
        classifier: SharedClassifier,
    ) -> Self {
        Self {
            acquisition,
            resolver,
            classifier,
            request: AcquisitionRequest::default(),
            min_duration: Duration::ZERO,
        }
    }

    /// Parameters passed to every acquisition
    pub fn with_request(mut self, request: AcquisitionRequest) -> Self {
        self.request = request;
        self
    }

    /// Minimum time before an outcome is surfaced
    pub fn with_min_duration(mut self, min_duration: Duration) -> Self {
        self.min_duration = min_duration;
        self
    }

    fn attempt(&self) -> Result<ScanOutcome, ScanError> {
        let baseline = self.resolver.capture_baseline();

        self.acquisition.acquire(&self.request)?;

        let artifact = self
            .resolver
            .resolve(baseline)
            .map_err(|e| ScanError::new(ScanErrorKind::ArtifactNotFound, e.to_string()))?;

        let record = read_artifact(&artifact.path)
            .map_err(|e| ScanError::new(ScanErrorKind::ArtifactUnreadable, e.to_string()))?;
        debug!(
            "Read {} points from {}",
            record.len(),
            artifact.path.display()
        );

        Ok(self.classifier.run(&record))
    }
}

impl ScanJob for ScanPipeline {
    fn run(&self) -> ScanOutcome {
        let started = Instant::now();
        info!("Scan started");

        let outcome = self.attempt().unwrap_or_else(ScanOutcome::from);
        if let ScanOutcome::Failed(e) = &outcome {
            error!("Scan failed: {}", e);
        }

        // Pacing only; the outcome is already final
        let elapsed = started.elapsed();
        if let Some(remaining) = self.min_duration.checked_sub(elapsed) {
            thread::sleep(remaining);
        }
        info!("Scan finished after {} ms", started.elapsed().as_millis());
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scan::acquisition::{AcquisitionError, SimulatedAcquisition};
    use nirscan_core::traits::{InferenceError, InputTensor, TensorShape};
    use nirscan_drivers::model::SimulatedEngine;
    use std::fs::File;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::SystemTime;

    /// Scripted acquisition: succeeds or fails without writing anything
    struct ScriptedAcquisition {
        fail: bool,
        calls: AtomicUsize,
    }

    impl Acquisition for ScriptedAcquisition {
        fn acquire(&self, _request: &AcquisitionRequest) -> Result<(), AcquisitionError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                Err(AcquisitionError::Failed {
                    status: "exit status: 1".into(),
                    stdout: String::new(),
                    stderr: "no device".into(),
                })
            } else {
                Ok(())
            }
        }
    }

    struct FixedEngine(Vec<f32>);

    impl InferenceEngine for FixedEngine {
        fn input_shape(&self) -> TensorShape {
            TensorShape::Sequence { len: 227 }
        }

        fn output_len(&self) -> usize {
            self.0.len()
        }

        fn infer(&self, _input: &InputTensor) -> Result<Vec<f32>, InferenceError> {
            Ok(self.0.clone())
        }
    }

    fn classifier(engine: impl InferenceEngine + 'static) -> SharedClassifier {
        SpectralClassifier::new(Arc::new(engine) as Arc<dyn InferenceEngine>)
    }

    fn code(outcome: &ScanOutcome) -> Option<&'static str> {
        match outcome {
            ScanOutcome::Failed(e) => Some(e.code()),
            _ => None,
        }
    }

    #[test]
    fn test_simulated_end_to_end() {
        let dir = tempfile::tempdir().unwrap();
        let pipeline = ScanPipeline::new(
            Box::new(SimulatedAcquisition::new(dir.path(), "csv", 3)),
            ResultResolver::new(dir.path(), "csv"),
            classifier(SimulatedEngine::new(3)),
        );
        match pipeline.run() {
            ScanOutcome::Detected { label, confidence } => {
                assert_eq!(label.as_str(), "MSG");
                assert!(confidence >= 0.8);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_salt_scenario() {
        let dir = tempfile::tempdir().unwrap();
        let pipeline = ScanPipeline::new(
            Box::new(SimulatedAcquisition::new(dir.path(), "csv", 3)),
            ResultResolver::new(dir.path(), "csv"),
            classifier(FixedEngine(vec![0.02, 0.95, 0.03])),
        );
        assert_eq!(pipeline.run(), ScanOutcome::detected("Salt", 0.95));
    }

    #[test]
    fn test_acquisition_failure() {
        let dir = tempfile::tempdir().unwrap();
        let pipeline = ScanPipeline::new(
            Box::new(ScriptedAcquisition {
                fail: true,
                calls: AtomicUsize::new(0),
            }),
            ResultResolver::new(dir.path(), "csv"),
            classifier(FixedEngine(vec![0.0, 1.0, 0.0])),
        );
        assert_eq!(code(&pipeline.run()), Some("ACQ"));
    }

    #[test]
    fn test_empty_directory_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let pipeline = ScanPipeline::new(
            Box::new(ScriptedAcquisition {
                fail: false,
                calls: AtomicUsize::new(0),
            }),
            ResultResolver::new(dir.path(), "csv"),
            classifier(FixedEngine(vec![0.0, 1.0, 0.0])),
        );
        assert_eq!(code(&pipeline.run()), Some("NOFILE"));
    }

    #[test]
    fn test_leftover_artifact_is_not_reused() {
        let dir = tempfile::tempdir().unwrap();
        let old = File::create(dir.path().join("20240101000000.csv")).unwrap();
        old.set_modified(SystemTime::UNIX_EPOCH + Duration::from_secs(1_700_000_000))
            .unwrap();
        let pipeline = ScanPipeline::new(
            Box::new(ScriptedAcquisition {
                fail: false,
                calls: AtomicUsize::new(0),
            }),
            ResultResolver::new(dir.path(), "csv"),
            classifier(FixedEngine(vec![0.0, 1.0, 0.0])),
        );
        assert_eq!(code(&pipeline.run()), Some("NOFILE"));
    }

    #[test]
    fn test_unreadable_artifact() {
        let dir = tempfile::tempdir().unwrap();

        struct Garbage(std::path::PathBuf);
        impl Acquisition for Garbage {
            fn acquire(&self, _request: &AcquisitionRequest) -> Result<(), AcquisitionError> {
                std::fs::write(self.0.join("20240101000000.csv"), "a,b\n1,2\n").unwrap();
                Ok(())
            }
        }

        let pipeline = ScanPipeline::new(
            Box::new(Garbage(dir.path().to_path_buf())),
            ResultResolver::new(dir.path(), "csv"),
            classifier(FixedEngine(vec![0.0, 1.0, 0.0])),
        );
        assert_eq!(code(&pipeline.run()), Some("IO"));
    }

    #[test]
    fn test_min_duration_enforced() {
        let dir = tempfile::tempdir().unwrap();
        let pipeline = ScanPipeline::new(
            Box::new(ScriptedAcquisition {
                fail: true,
                calls: AtomicUsize::new(0),
            }),
            ResultResolver::new(dir.path(), "csv"),
            classifier(FixedEngine(vec![0.0, 1.0, 0.0])),
        )
        .with_min_duration(Duration::from_millis(150));
        let started = Instant::now();
        pipeline.run();
        assert!(started.elapsed() >= Duration::from_millis(150));
    }
}
