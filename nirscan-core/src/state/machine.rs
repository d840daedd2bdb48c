//! UI state definition
//!
//! Screen, menu focus, and scan status are a function of the previous
//! state and one event.

use tracing::debug;

use super::events::UiEvent;
use crate::input::ButtonEvent;
use crate::scan::{ScanError, ScanOutcome};

/// Top-level screens
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    /// Main menu with two items
    Menu,
    /// Scan screen
    Scan,
}

/// Scan status, only meaningful on the scan screen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanStatus {
    /// Ready for a scan
    Idle,
    /// Worker running; ENTER is ignored
    Scanning,
    /// Last scan produced a classification
    Result,
    /// Last scan failed
    Error,
}

impl ScanStatus {
    /// Label shown on the status bar
    pub fn name(&self) -> &'static str {
        match self {
            ScanStatus::Idle => "IDLE",
            ScanStatus::Scanning => "SCANNING",
            ScanStatus::Result => "RESULT",
            ScanStatus::Error => "ERROR",
        }
    }

    /// Status a finished scan settles into
    pub fn for_outcome(outcome: &ScanOutcome) -> Self {
        match outcome {
            ScanOutcome::Failed(_) => ScanStatus::Error,
            _ => ScanStatus::Result,
        }
    }
}

/// Menu entries, in display order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuItem {
    InitiateScan,
    SystemOff,
}

impl MenuItem {
    pub const ALL: [MenuItem; 2] = [MenuItem::InitiateScan, MenuItem::SystemOff];

    pub fn label(&self) -> &'static str {
        match self {
            MenuItem::InitiateScan => "INITIATE SCAN",
            MenuItem::SystemOff => "SYSTEM OFF",
        }
    }

    pub fn index(&self) -> usize {
        match self {
            MenuItem::InitiateScan => 0,
            MenuItem::SystemOff => 1,
        }
    }

    /// The other entry (two items, so up and down both wrap to it)
    pub fn toggled(self) -> Self {
        match self {
            MenuItem::InitiateScan => MenuItem::SystemOff,
            MenuItem::SystemOff => MenuItem::InitiateScan,
        }
    }
}

/// Side effects requested by a transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Ask the orchestrator to start a scan worker
    StartScan,
    /// Leave the render loop and exit the process
    PowerOff,
}

/// Everything the renderer needs to compose one frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum View<'a> {
    Menu {
        focus: MenuItem,
    },
    ScanIdle,
    Scanning,
    ScanResult(&'a ScanOutcome),
    ScanError(&'a ScanError),
}

/// UI state owned by the render loop
#[derive(Debug, Clone, PartialEq)]
pub struct UiState {
    screen: Screen,
    focus: MenuItem,
    status: ScanStatus,
    outcome: Option<ScanOutcome>,
}

impl Default for UiState {
    fn default() -> Self {
        Self::new()
    }
}

impl UiState {
    /// Initial state: menu, first item focused
    pub fn new() -> Self {
        Self {
            screen: Screen::Menu,
            focus: MenuItem::InitiateScan,
            status: ScanStatus::Idle,
            outcome: None,
        }
    }

    pub fn screen(&self) -> Screen {
        self.screen
    }

    pub fn focus(&self) -> MenuItem {
        self.focus
    }

    pub fn status(&self) -> ScanStatus {
        self.status
    }

    pub fn outcome(&self) -> Option<&ScanOutcome> {
        self.outcome.as_ref()
    }

    /// Process an event and return the side effect it requests, if any
    ///
    /// `scan_active` reports whether a scan worker is still running. It
    /// decides the status shown when the scan screen is re-entered.
    pub fn handle(&mut self, event: UiEvent, scan_active: bool) -> Option<Command> {
        match event {
            UiEvent::Button(button) => self.handle_button(button, scan_active),
            UiEvent::ScanCompleted(outcome) => {
                self.complete(outcome);
                None
            }
        }
    }

    fn handle_button(&mut self, button: ButtonEvent, scan_active: bool) -> Option<Command> {
        use ButtonEvent::*;

        let before = (self.screen, self.status);
        let command = match (self.screen, button) {
            (Screen::Menu, Up | Down) => {
                self.focus = self.focus.toggled();
                None
            }
            (Screen::Menu, Enter) => match self.focus {
                MenuItem::InitiateScan => {
                    self.screen = Screen::Scan;
                    // A worker from an earlier visit keeps the screen busy
                    self.status = if scan_active {
                        ScanStatus::Scanning
                    } else {
                        ScanStatus::Idle
                    };
                    None
                }
                MenuItem::SystemOff => Some(Command::PowerOff),
            },
            (Screen::Menu, Right) => None,

            (Screen::Scan, Enter) if self.status == ScanStatus::Scanning => None,
            (Screen::Scan, Enter) => {
                self.status = ScanStatus::Scanning;
                Some(Command::StartScan)
            }
            (Screen::Scan, Right) => {
                self.screen = Screen::Menu;
                None
            }
            (Screen::Scan, Up | Down) => None,
        };

        if before != (self.screen, self.status) {
            debug!(
                "UI {:?}/{} -> {:?}/{} on {}",
                before.0,
                before.1.name(),
                self.screen,
                self.status.name(),
                button.name()
            );
        }
        command
    }

    /// Record a published outcome
    ///
    /// Applied whatever screen is showing, so an outcome is never left
    /// waiting in the handoff slot.
    fn complete(&mut self, outcome: ScanOutcome) {
        self.status = ScanStatus::for_outcome(&outcome);
        debug!("Scan completed, status {}", self.status.name());
        self.outcome = Some(outcome);
    }

    /// Undo a `StartScan` the orchestrator refused
    ///
    /// Restores the status implied by the last published outcome.
    pub fn start_rejected(&mut self) {
        self.status = match &self.outcome {
            Some(outcome) => ScanStatus::for_outcome(outcome),
            None => ScanStatus::Idle,
        };
    }

    /// View to render for the current state
    pub fn view(&self) -> View<'_> {
        match self.screen {
            Screen::Menu => View::Menu { focus: self.focus },
            Screen::Scan => match (self.status, &self.outcome) {
                (ScanStatus::Scanning, _) => View::Scanning,
                (ScanStatus::Result, Some(outcome)) => View::ScanResult(outcome),
                (ScanStatus::Error, Some(ScanOutcome::Failed(e))) => View::ScanError(e),
                _ => View::ScanIdle,
            },
        }
    }
}
