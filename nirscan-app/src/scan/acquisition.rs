//! Scan acquisition backends
//!
//! An acquisition runs one spectrometer scan and persists the result as
//! an artifact in the scan directory. It reports only success or
//! failure; finding the artifact is the resolver's job.

use std::fs;
use std::path::PathBuf;
use std::process::Command;
use std::sync::atomic::{AtomicUsize, Ordering};

use chrono::Local;
use nirscan_core::scan::{ScanError, ScanErrorKind};
use nirscan_core::spectrum::{PreprocessError, SpectralRecord, MIN_POINTS};
use tracing::{debug, error, info};

use super::artifact::{artifact_name, write_artifact, ArtifactError};

/// Command-line flag asking the acquisition program to save an artifact
pub const PERSIST_FLAG: &str = "--save-csv";

/// Parameters for one acquisition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcquisitionRequest {
    /// Save the scan as an artifact
    pub persist: bool,
    /// Optional artifact name prefix
    ///
    /// Prefixed artifacts are excluded from automatic discovery.
    pub prefix: Option<String>,
}

impl Default for AcquisitionRequest {
    fn default() -> Self {
        Self {
            persist: true,
            prefix: None,
        }
    }
}

/// Acquisition failures
#[derive(Debug, thiserror::Error)]
pub enum AcquisitionError {
    /// Program could not be started
    #[error("cannot start {program}: {source}")]
    Spawn {
        program: String,
        source: std::io::Error,
    },
    /// Program ran but reported failure
    #[error("scan program failed with {status}")]
    Failed {
        status: String,
        stdout: String,
        stderr: String,
    },
    /// Simulated artifact could not be written
    #[error(transparent)]
    Artifact(#[from] ArtifactError),
    /// Synthetic series are inconsistent
    #[error(transparent)]
    Record(#[from] PreprocessError),
}

impl From<AcquisitionError> for ScanError {
    fn from(e: AcquisitionError) -> Self {
        ScanError::new(ScanErrorKind::Acquisition, e.to_string())
    }
}

/// Trait for something that can take a scan
pub trait Acquisition: Send + Sync {
    /// Run one scan to completion
    fn acquire(&self, request: &AcquisitionRequest) -> Result<(), AcquisitionError>;
}

/// Runs an external acquisition program
#[derive(Debug, Clone)]
pub struct ProcessAcquisition {
    program: String,
    args: Vec<String>,
}

impl ProcessAcquisition {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// Full argument list for a request
    pub fn command_args(&self, request: &AcquisitionRequest) -> Vec<String> {
        let mut args: Vec<String> = self
            .args
            .iter()
            .filter(|a| a.as_str() != PERSIST_FLAG)
            .cloned()
            .collect();
        if request.persist {
            args.push(PERSIST_FLAG.to_string());
        }
        if let Some(prefix) = request.prefix.as_deref().map(str::trim).filter(|p| !p.is_empty()) {
            args.push("--prefix".to_string());
            args.push(prefix.to_string());
        }
        args
    }
}

impl Acquisition for ProcessAcquisition {
    fn acquire(&self, request: &AcquisitionRequest) -> Result<(), AcquisitionError> {
        let args = self.command_args(request);
        info!("Starting scan: {} {}", self.program, args.join(" "));

        let output = Command::new(&self.program)
            .args(&args)
            .output()
            .map_err(|source| AcquisitionError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        if !output.status.success() {
            let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
            let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
            error!("Scan program stderr:\n{}", if stderr.is_empty() { "<none>" } else { &stderr });
            error!("Scan program stdout:\n{}", if stdout.is_empty() { "<none>" } else { &stdout });
            return Err(AcquisitionError::Failed {
                status: output.status.to_string(),
                stdout,
                stderr,
            });
        }

        debug!("Scan program finished");
        Ok(())
    }
}

/// Synthesizes scans and writes them as artifacts
///
/// Successive scans cycle through one absorption band per class, then a
/// featureless spectrum that should classify as undetected.
#[derive(Debug)]
pub struct SimulatedAcquisition {
    dir: PathBuf,
    extension: String,
    classes: usize,
    points: usize,
    count: AtomicUsize,
}

/// Reference lamp intensity for synthetic scans
const SIM_REFERENCE: f32 = 50_000.0;
/// Wavelength span (nm)
const SIM_WAVELENGTH: (f32, f32) = (900.0, 1700.0);

impl SimulatedAcquisition {
    pub fn new(dir: impl Into<PathBuf>, extension: impl Into<String>, classes: usize) -> Self {
        Self {
            dir: dir.into(),
            extension: extension.into(),
            classes: classes.max(1),
            points: MIN_POINTS,
            count: AtomicUsize::new(0),
        }
    }

    /// Absorbance for scan number `n`
    pub fn absorbance(&self, n: usize) -> Vec<f32> {
        let slot = n % (self.classes + 1);
        let len = self.points;
        let segment = len / self.classes;
        (0..len)
            .map(|i| {
                let x = i as f32;
                let base = 0.2 + 0.0005 * x;
                if slot < self.classes {
                    let center = (slot * segment + segment / 2) as f32;
                    base + 0.8 * (-((x - center) / 6.0).powi(2)).exp()
                } else {
                    base
                }
            })
            .collect()
    }

    /// Build the record for scan number `n`
    pub fn record(&self, n: usize) -> Result<SpectralRecord, PreprocessError> {
        let absorbance = self.absorbance(n);
        let intensity: Vec<f32> = absorbance
            .iter()
            .map(|a| SIM_REFERENCE * 10f32.powf(-a))
            .collect();
        let (lo, hi) = SIM_WAVELENGTH;
        let step = (hi - lo) / (self.points - 1) as f32;
        let wavelength = (0..self.points).map(|i| lo + step * i as f32).collect();
        Ok(SpectralRecord::from_absorbance(absorbance)
            .with_raw(intensity, Some(vec![SIM_REFERENCE; self.points]))?
            .with_wavelength(wavelength))
    }
}

impl Acquisition for SimulatedAcquisition {
    fn acquire(&self, request: &AcquisitionRequest) -> Result<(), AcquisitionError> {
        let n = self.count.fetch_add(1, Ordering::Relaxed);
        let record = self.record(n)?;
        if !request.persist {
            debug!("Simulated scan {} not persisted", n);
            return Ok(());
        }

        fs::create_dir_all(&self.dir).map_err(|source| ArtifactError::Io {
            path: self.dir.clone(),
            source,
        })?;
        let now = Local::now();
        let path = self
            .dir
            .join(artifact_name(&now, request.prefix.as_deref(), &self.extension));
        write_artifact(&path, &record, "sim", &now)?;
        info!("Simulated scan {} written to {}", n, path.display());
        Ok(())
    }
}
