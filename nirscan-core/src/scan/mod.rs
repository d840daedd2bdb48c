//! Scan outcome and per-scan error taxonomy

pub mod error;
pub mod outcome;

pub use error::{ScanError, ScanErrorKind};
pub use outcome::{Label, ScanOutcome, MAX_LABEL_LEN};
