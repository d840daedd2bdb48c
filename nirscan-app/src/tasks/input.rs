//! Input poller thread
//!
//! Samples the button ladder at a fixed interval and forwards one event
//! per press. Never exits on a hardware fault.

use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use nirscan_core::input::InputPoller;
use nirscan_core::traits::AdcReader;
use tracing::{debug, info, warn};

use crate::channels::ButtonChannel;

/// Poll until `running` is cleared
pub fn input_task<A: AdcReader>(
    mut poller: InputPoller<A>,
    interval: Duration,
    buttons: &'static ButtonChannel,
    running: &AtomicBool,
) {
    info!("Input task started ({} ms interval)", interval.as_millis());

    let mut next = Instant::now();
    while running.load(Ordering::Acquire) {
        if let Some(button) = poller.poll_once() {
            debug!("Button {}", button.name());
            if buttons.try_send(button).is_err() {
                warn!("Button queue full, dropped {}", button.name());
            }
        }

        next += interval;
        let now = Instant::now();
        if next > now {
            thread::sleep(next - now);
        } else {
            // Overran; resync instead of bursting
            next = now;
        }
    }

    info!("Input task stopped");
}
