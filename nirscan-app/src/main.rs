//! Nirscan - handheld NIR spectrometer device software
//!
//! Wires the three timing domains together: the input poller thread,
//! the fixed-rate render loop on the main thread, and the on-demand
//! scan worker. They share nothing but the statics in `channels`.

#![deny(unsafe_code)]

use std::process::ExitCode;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use nirscan_core::classify::SpectralClassifier;
use nirscan_core::input::InputPoller;
use nirscan_display::Canvas;
use tracing::{error, info, warn};

use crate::capability::StartupError;
use crate::channels::{BUTTON_CHANNEL, SCAN_OUTCOME};
use crate::config::{load_config, ConfigSource, CONFIG_ENV};
use crate::controller::Controller;
use crate::scan::{AcquisitionRequest, ResultResolver, ScanOrchestrator, ScanPipeline};

mod capability;
mod channels;
mod config;
mod controller;
mod scan;
mod tasks;

#[cfg(test)]
#[path = "../build/error_box.rs"]
mod error_box;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Startup failed: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), StartupError> {
    info!("Nirscan starting...");

    let source = ConfigSource::select(std::env::args().nth(1), std::env::var(CONFIG_ENV).ok());
    let config = load_config(&source)?;
    let devices = capability::open(&config)?;

    let classifier = SpectralClassifier::new(devices.engine)
        .with_classes(config.model.class_set()?)
        .with_threshold(config.model.confidence_threshold)
        .with_min_points(config.model.min_points);
    let pipeline = ScanPipeline::new(
        devices.acquisition,
        ResultResolver::new(&config.scan.artifact_dir, config.scan.artifact_extension.clone()),
        classifier,
    )
    .with_request(AcquisitionRequest {
        persist: true,
        prefix: config.scan.prefix.clone(),
    })
    .with_min_duration(Duration::from_millis(u64::from(config.scan.min_duration_ms)));
    let orchestrator = ScanOrchestrator::new(Arc::new(pipeline), &SCAN_OUTCOME);

    // Input poller thread
    let running = Arc::new(AtomicBool::new(true));
    let poller = InputPoller::new(devices.adc, config.input.buttons);
    let interval = Duration::from_millis(u64::from(config.input.poll_interval_ms));
    let input = {
        let running = Arc::clone(&running);
        thread::Builder::new()
            .name("input".into())
            .spawn(move || tasks::input_task(poller, interval, &BUTTON_CHANNEL, &running))
            .map_err(StartupError::Thread)?
    };

    // Render loop runs here until SYSTEM OFF
    let canvas = Canvas::new(config.ui.virtual_width, config.ui.virtual_height);
    let mut controller = Controller::new(orchestrator, &BUTTON_CHANNEL, canvas);
    let mut display = devices.display;
    tasks::ui_task(
        &mut controller,
        &mut display,
        Duration::from_millis(config.ui.tick_ms()),
    );

    running.store(false, Ordering::Release);
    if input.join().is_err() {
        warn!("Input thread panicked");
    }
    if controller.orchestrator().is_active() {
        info!("Leaving in-flight scan behind");
    }

    info!("System off");
    Ok(())
}
