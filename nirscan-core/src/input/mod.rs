//! Button input decoding
//!
//! Turns raw ladder voltages into one event per physical press.

pub mod buttons;
pub mod poller;

pub use buttons::{detect_button, ButtonEvent, ButtonMap, MillivoltRange, SENTINEL_MV};
pub use poller::{InputPoller, PressDetector};
