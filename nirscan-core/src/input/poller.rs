//! Press edge detection and the per-sample poller step
//!
//! The poller samples far slower than contact bounce settles, so
//! debouncing reduces to edge detection: an event fires only when the
//! decoded button differs from the previous sample's.

use tracing::trace;

use super::buttons::{ButtonEvent, ButtonMap};
use crate::traits::AdcReader;

/// Rising-edge detector over decoded samples
#[derive(Debug, Clone, Default)]
pub struct PressDetector {
    last: Option<ButtonEvent>,
}

impl PressDetector {
    pub const fn new() -> Self {
        Self { last: None }
    }

    /// Feed one decoded sample, returning an event on a new press
    ///
    /// Holding a button yields a single event; release (or a direct
    /// change to another button) re-arms detection.
    pub fn update(&mut self, sample: Option<ButtonEvent>) -> Option<ButtonEvent> {
        let edge = if sample != self.last { sample } else { None };
        self.last = sample;
        edge
    }

    /// Button decoded on the previous sample
    pub fn held(&self) -> Option<ButtonEvent> {
        self.last
    }
}

/// One-sample-at-a-time input poller
///
/// Owns the ADC and the edge detector. The periodic schedule and the
/// hand-off queue belong to the caller.
pub struct InputPoller<A> {
    adc: A,
    map: ButtonMap,
    detector: PressDetector,
}

impl<A: AdcReader> InputPoller<A> {
    pub fn new(adc: A, map: ButtonMap) -> Self {
        Self {
            adc,
            map,
            detector: PressDetector::new(),
        }
    }

    /// Take one sample and return a press event, if any
    pub fn poll_once(&mut self) -> Option<ButtonEvent> {
        let mv = self.adc.read_or_sentinel();
        let decoded = self.map.detect(mv);
        trace!("ADC {} mV -> {:?}", mv, decoded);
        self.detector.update(decoded)
    }

    /// Get the button mapping in use
    pub fn map(&self) -> &ButtonMap {
        &self.map
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::SENTINEL_MV;
    use crate::traits::SensorError;
    use proptest::prelude::*;

    /// Replays a fixed list of samples, then reports idle
    struct ScriptedAdc {
        samples: std::vec::IntoIter<Result<f32, SensorError>>,
    }

    impl ScriptedAdc {
        fn new(samples: Vec<Result<f32, SensorError>>) -> Self {
            Self {
                samples: samples.into_iter(),
            }
        }
    }

    impl AdcReader for ScriptedAdc {
        fn read_millivolts(&mut self) -> Result<f32, SensorError> {
            self.samples.next().unwrap_or(Ok(SENTINEL_MV))
        }
    }

    fn run(samples: Vec<Result<f32, SensorError>>) -> Vec<ButtonEvent> {
        let n = samples.len();
        let mut poller = InputPoller::new(ScriptedAdc::new(samples), ButtonMap::default());
        (0..n).filter_map(|_| poller.poll_once()).collect()
    }

    #[test]
    fn test_hold_emits_once() {
        let events = run(vec![Ok(100.0), Ok(100.0), Ok(110.0), Ok(120.0)]);
        assert_eq!(events, vec![ButtonEvent::Up]);
    }

    #[test]
    fn test_release_and_repress_emits_twice() {
        let events = run(vec![Ok(5.0), Ok(5.0), Ok(SENTINEL_MV), Ok(5.0)]);
        assert_eq!(events, vec![ButtonEvent::Enter, ButtonEvent::Enter]);
    }

    #[test]
    fn test_direct_change_emits_new_button() {
        let events = run(vec![Ok(100.0), Ok(300.0)]);
        assert_eq!(events, vec![ButtonEvent::Up, ButtonEvent::Down]);
    }

    #[test]
    fn test_bus_failure_reads_as_release() {
        let events = run(vec![
            Ok(500.0),
            Err(SensorError::Bus("nack".into())),
            Ok(500.0),
        ]);
        assert_eq!(events, vec![ButtonEvent::Right, ButtonEvent::Right]);
    }

    #[test]
    fn test_detector_tracks_held() {
        let mut detector = PressDetector::new();
        assert_eq!(detector.update(Some(ButtonEvent::Down)), Some(ButtonEvent::Down));
        assert_eq!(detector.held(), Some(ButtonEvent::Down));
        assert_eq!(detector.update(None), None);
        assert_eq!(detector.held(), None);
    }

    proptest! {
        #[test]
        fn prop_held_sequence_emits_exactly_one(idx in 0usize..4, len in 1usize..50) {
            let button = ButtonEvent::ALL[idx];
            let mut detector = PressDetector::new();
            let count = (0..len)
                .filter_map(|_| detector.update(Some(button)))
                .count();
            prop_assert_eq!(count, 1);
        }

        #[test]
        fn prop_press_release_press_emits_two(
            idx in 0usize..4,
            hold1 in 1usize..10,
            gap in 1usize..10,
            hold2 in 1usize..10,
        ) {
            let button = ButtonEvent::ALL[idx];
            let samples = core::iter::repeat(Some(button)).take(hold1)
                .chain(core::iter::repeat(None).take(gap))
                .chain(core::iter::repeat(Some(button)).take(hold2));
            let mut detector = PressDetector::new();
            let count = samples.filter_map(|s| detector.update(s)).count();
            prop_assert_eq!(count, 2);
        }
    }
}
