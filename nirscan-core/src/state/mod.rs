//! UI state machine
//!
//! Two screens (menu and scan) with a scan status nested under the scan
//! screen. The machine is explicit, finite, and deterministic; side
//! effects are returned as [`Command`]s for the caller to carry out.

pub mod events;
pub mod machine;

pub use events::UiEvent;
pub use machine::{Command, MenuItem, ScanStatus, Screen, UiState, View};
