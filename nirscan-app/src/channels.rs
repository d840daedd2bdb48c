//! Cross-thread handoff
//!
//! Static embassy-sync primitives shared by the poller thread, the
//! render loop and the scan worker.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;

use nirscan_core::input::ButtonEvent;

use crate::scan::OutcomeSignal;

/// Channel capacity for button events
pub const BUTTON_CHANNEL_SIZE: usize = 8;

/// Button presses from the input poller
pub type ButtonChannel = Channel<CriticalSectionRawMutex, ButtonEvent, BUTTON_CHANNEL_SIZE>;

/// Button presses from the input poller
pub static BUTTON_CHANNEL: ButtonChannel = Channel::new();

/// Terminal outcome of the last scan worker
pub static SCAN_OUTCOME: OutcomeSignal = OutcomeSignal::new();
