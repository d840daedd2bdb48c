//! Events that drive the UI state machine

use crate::input::ButtonEvent;
use crate::scan::ScanOutcome;

/// Inputs to the UI state machine
#[derive(Debug, Clone, PartialEq)]
pub enum UiEvent {
    /// A debounced button press from the input poller
    Button(ButtonEvent),
    /// The scan worker published its outcome
    ScanCompleted(ScanOutcome),
}

impl UiEvent {
    /// Check if this event came from the user
    pub fn is_user_event(&self) -> bool {
        matches!(self, UiEvent::Button(_))
    }
}

impl From<ButtonEvent> for UiEvent {
    fn from(b: ButtonEvent) -> Self {
        UiEvent::Button(b)
    }
}

impl From<ScanOutcome> for UiEvent {
    fn from(o: ScanOutcome) -> Self {
        UiEvent::ScanCompleted(o)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_events() {
        assert!(UiEvent::from(ButtonEvent::Enter).is_user_event());
        assert!(!UiEvent::from(ScanOutcome::Undetected).is_user_event());
    }
}
