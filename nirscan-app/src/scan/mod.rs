//! Scan pipeline
//!
//! Acquisition, artifact discovery and parsing, classification, and the
//! single-flight worker that ties them together.

pub mod acquisition;
pub mod artifact;
pub mod orchestrator;
pub mod pipeline;
pub mod resolver;

pub use acquisition::{Acquisition, AcquisitionRequest, ProcessAcquisition, SimulatedAcquisition};
pub use orchestrator::{OutcomeSignal, ScanOrchestrator};
pub use pipeline::{ScanJob, ScanPipeline};
pub use resolver::ResultResolver;
