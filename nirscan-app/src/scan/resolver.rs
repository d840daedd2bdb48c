//! Staleness-safe artifact discovery
//!
//! The acquisition program writes into a fixed directory but does not
//! report the file it wrote. The resolver records the newest artifact
//! before a scan and afterwards only accepts something strictly newer,
//! so a failed acquisition can never be answered with an old result.
//!
//! Only files whose stem is all digits (timestamp names) are candidates;
//! user-prefixed artifacts are never picked up.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use tracing::{debug, trace};

/// Artifact discovery failures
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolveError {
    /// No candidate artifact at all
    #[error("no scan file in {}", .dir.display())]
    NotFound { dir: PathBuf },
    /// Newest candidate predates the scan
    #[error("no new scan file in {} (newest is {})", .dir.display(), .newest.display())]
    Stale { dir: PathBuf, newest: PathBuf },
}

/// Newly produced artifact
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultArtifact {
    pub path: PathBuf,
    pub modified: SystemTime,
}

/// Scans one directory for timestamp-named artifacts
#[derive(Debug, Clone)]
pub struct ResultResolver {
    dir: PathBuf,
    extension: String,
}

/// Check that a file name is `<digits>.<extension>`
pub fn is_candidate_name(path: &Path, extension: &str) -> bool {
    let ext_ok = path.extension().and_then(|e| e.to_str()) == Some(extension);
    let stem_ok = path
        .file_stem()
        .and_then(|s| s.to_str())
        .map(|s| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit()))
        .unwrap_or(false);
    ext_ok && stem_ok
}

impl ResultResolver {
    pub fn new(dir: impl Into<PathBuf>, extension: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            extension: extension.into(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Newest candidate in the directory, if any
    ///
    /// A missing or unreadable directory has no candidates.
    fn newest(&self) -> Option<ResultArtifact> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) => {
                trace!("Cannot list {}: {}", self.dir.display(), e);
                return None;
            }
        };

        entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| is_candidate_name(path, &self.extension))
            .filter_map(|path| {
                let meta = fs::metadata(&path).ok()?;
                if !meta.is_file() {
                    return None;
                }
                let modified = meta.modified().ok()?;
                Some(ResultArtifact { path, modified })
            })
            .max_by_key(|a| a.modified)
    }

    /// Modification time of the newest candidate before a scan
    pub fn capture_baseline(&self) -> Option<SystemTime> {
        let baseline = self.newest().map(|a| a.modified);
        debug!("Baseline for {}: {:?}", self.dir.display(), baseline);
        baseline
    }

    /// Find the artifact a scan produced
    ///
    /// Fails unless the newest candidate is strictly newer than
    /// `baseline`.
    pub fn resolve(&self, baseline: Option<SystemTime>) -> Result<ResultArtifact, ResolveError> {
        let newest = self.newest().ok_or_else(|| ResolveError::NotFound {
            dir: self.dir.clone(),
        })?;

        match baseline {
            Some(baseline) if newest.modified <= baseline => Err(ResolveError::Stale {
                dir: self.dir.clone(),
                newest: newest.path,
            }),
            _ => {
                debug!("Resolved {}", newest.path.display());
                Ok(newest)
            }
        }
    }
}
