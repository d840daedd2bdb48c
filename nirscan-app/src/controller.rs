//! Render-loop controller
//!
//! Owns the UI state and the frame. Once per tick it applies any
//! published scan outcome, applies at most one queued button press,
//! carries out the resulting command and composes the frame.

use nirscan_core::state::{Command, UiEvent, UiState};
use nirscan_display::{Canvas, Renderer};
use tracing::info;

use crate::channels::ButtonChannel;
use crate::scan::ScanOrchestrator;

/// Per-tick coordination of input, scan worker and frame
pub struct Controller {
    ui: UiState,
    renderer: Renderer,
    canvas: Canvas,
    orchestrator: ScanOrchestrator,
    buttons: &'static ButtonChannel,
}

impl Controller {
    pub fn new(
        orchestrator: ScanOrchestrator,
        buttons: &'static ButtonChannel,
        canvas: Canvas,
    ) -> Self {
        Self {
            ui: UiState::new(),
            renderer: Renderer::new(),
            canvas,
            orchestrator,
            buttons,
        }
    }

    pub fn ui(&self) -> &UiState {
        &self.ui
    }

    /// Frame composed by the last tick
    pub fn frame(&self) -> &Canvas {
        &self.canvas
    }

    pub fn orchestrator(&self) -> &ScanOrchestrator {
        &self.orchestrator
    }

    /// Run one render tick
    ///
    /// Returns `true` once the user chose SYSTEM OFF.
    pub fn tick(&mut self, now_ms: u64) -> bool {
        // Consumed on every screen so the slot never holds a stale value.
        // The worker publishes before clearing its flag, so a taken
        // outcome means no worker is running this tick.
        let scan_active = match self.orchestrator.take_outcome() {
            Some(outcome) => {
                self.ui.handle(UiEvent::ScanCompleted(outcome), false);
                false
            }
            None => self.orchestrator.is_active(),
        };

        let mut power_off = false;
        if let Ok(button) = self.buttons.try_receive() {
            let command = self.ui.handle(UiEvent::Button(button), scan_active);
            match command {
                Some(Command::StartScan) => {
                    if !self.orchestrator.start() {
                        self.ui.start_rejected();
                    }
                }
                Some(Command::PowerOff) => {
                    info!("System off requested");
                    power_off = true;
                }
                None => {}
            }
        }

        if let Err(e) = self.renderer.compose(self.ui.view(), now_ms, &mut self.canvas) {
            match e {}
        }
        power_off
    }
}
