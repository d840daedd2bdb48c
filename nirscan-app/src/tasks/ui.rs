//! Fixed-rate render loop
//!
//! Runs on the main thread. Never blocks on the scan worker or on
//! hardware; a failed present is logged and the next frame tried.

use std::thread;
use std::time::{Duration, Instant};

use nirscan_display::DisplayBackend;
use tracing::{info, trace, warn};

use crate::controller::Controller;

/// Tick until SYSTEM OFF is chosen
pub fn ui_task<D: DisplayBackend>(controller: &mut Controller, display: &mut D, tick: Duration) {
    info!("UI task started ({} ms tick)", tick.as_millis());

    let start = Instant::now();
    let mut next = start;
    loop {
        let now_ms = start.elapsed().as_millis() as u64;
        let power_off = controller.tick(now_ms);

        if let Err(e) = display.present(controller.frame()) {
            warn!("Present failed: {}", e);
        }
        if power_off {
            break;
        }

        next += tick;
        let now = Instant::now();
        if next > now {
            thread::sleep(next - now);
        } else {
            trace!("UI tick overran by {} ms", (now - next).as_millis());
            next = now;
        }
    }

    info!("UI task stopped");
}
