//! Resistor-ladder button decoding
//!
//! All four buttons share one ADC channel through a resistor ladder, so
//! each press shows up as a characteristic voltage. Decoding maps a
//! millivolt sample onto at most one button.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Millivolt value substituted for a failed bus read.
///
/// Sits above every button range so a read failure decodes as "no button".
pub const SENTINEL_MV: f32 = 9999.0;

/// Physical button identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ButtonEvent {
    /// Confirm / start scan
    Enter,
    /// Move focus up
    Up,
    /// Move focus down
    Down,
    /// Back to the menu
    Right,
}

impl ButtonEvent {
    /// All buttons in ladder order (lowest voltage first)
    pub const ALL: [ButtonEvent; 4] = [
        ButtonEvent::Enter,
        ButtonEvent::Up,
        ButtonEvent::Down,
        ButtonEvent::Right,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ButtonEvent::Enter => "ENTER",
            ButtonEvent::Up => "UP",
            ButtonEvent::Down => "DOWN",
            ButtonEvent::Right => "RIGHT",
        }
    }
}

/// Inclusive millivolt range
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MillivoltRange {
    pub min: i32,
    pub max: i32,
}

impl MillivoltRange {
    pub const fn new(min: i32, max: i32) -> Self {
        Self { min, max }
    }

    /// Check whether a sample falls inside the range (both ends inclusive)
    ///
    /// Samples keep their sub-millivolt fraction, so 160.125 is outside
    /// a range ending at 160.
    pub fn contains(&self, mv: f32) -> bool {
        self.min as f32 <= mv && mv <= self.max as f32
    }

    /// Check whether two ranges share at least one millivolt value
    pub fn overlaps(&self, other: &MillivoltRange) -> bool {
        self.min <= other.max && other.min <= self.max
    }

    /// Representative value inside the range (used to synthesize presses)
    pub fn midpoint(&self) -> f32 {
        (self.min as f32 + self.max as f32) / 2.0
    }
}

/// Voltage-to-button mapping
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ButtonMap {
    pub enter: MillivoltRange,
    pub up: MillivoltRange,
    pub down: MillivoltRange,
    pub right: MillivoltRange,
}

impl Default for ButtonMap {
    fn default() -> Self {
        Self {
            // Anything below 20 mV, including slightly negative readings
            enter: MillivoltRange::new(-4096, 19),
            up: MillivoltRange::new(70, 160),
            down: MillivoltRange::new(200, 350),
            right: MillivoltRange::new(450, 700),
        }
    }
}

impl ButtonMap {
    /// Range assigned to a button
    pub fn range(&self, button: ButtonEvent) -> MillivoltRange {
        match button {
            ButtonEvent::Enter => self.enter,
            ButtonEvent::Up => self.up,
            ButtonEvent::Down => self.down,
            ButtonEvent::Right => self.right,
        }
    }

    /// Map a millivolt sample to a button, or `None` outside every range
    pub fn detect(&self, mv: f32) -> Option<ButtonEvent> {
        ButtonEvent::ALL
            .into_iter()
            .find(|&button| self.range(button).contains(mv))
    }

    /// Find the first pair of overlapping ranges, if any
    ///
    /// Decoding is only well-defined when the ranges are disjoint.
    pub fn find_overlap(&self) -> Option<(ButtonEvent, ButtonEvent)> {
        for (i, &a) in ButtonEvent::ALL.iter().enumerate() {
            for &b in &ButtonEvent::ALL[i + 1..] {
                if self.range(a).overlaps(&self.range(b)) {
                    return Some((a, b));
                }
            }
        }
        None
    }
}

/// Map a millivolt sample to a button using the default ladder
pub fn detect_button(mv: f32) -> Option<ButtonEvent> {
    ButtonMap::default().detect(mv)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_default_ladder() {
        assert_eq!(detect_button(0.0), Some(ButtonEvent::Enter));
        assert_eq!(detect_button(-3.0), Some(ButtonEvent::Enter));
        assert_eq!(detect_button(19.0), Some(ButtonEvent::Enter));
        assert_eq!(detect_button(20.0), None);
        assert_eq!(detect_button(70.0), Some(ButtonEvent::Up));
        assert_eq!(detect_button(160.0), Some(ButtonEvent::Up));
        assert_eq!(detect_button(161.0), None);
        assert_eq!(detect_button(275.0), Some(ButtonEvent::Down));
        assert_eq!(detect_button(450.0), Some(ButtonEvent::Right));
        assert_eq!(detect_button(700.0), Some(ButtonEvent::Right));
        assert_eq!(detect_button(701.0), None);
    }

    #[test]
    fn test_fraction_past_range_end_is_none() {
        assert_eq!(detect_button(19.875), None);
        assert_eq!(detect_button(69.875), None);
        assert_eq!(detect_button(70.0), Some(ButtonEvent::Up));
        assert_eq!(detect_button(160.125), None);
        assert_eq!(detect_button(350.125), None);
        assert_eq!(detect_button(700.125), None);
    }

    #[test]
    fn test_sentinel_is_no_button() {
        assert_eq!(detect_button(SENTINEL_MV), None);
    }

    #[test]
    fn test_default_ranges_disjoint() {
        assert_eq!(ButtonMap::default().find_overlap(), None);
    }

    #[test]
    fn test_overlap_detected() {
        let map = ButtonMap {
            down: MillivoltRange::new(150, 350),
            ..ButtonMap::default()
        };
        assert_eq!(
            map.find_overlap(),
            Some((ButtonEvent::Up, ButtonEvent::Down))
        );
    }

    #[test]
    fn test_midpoint_decodes_to_same_button() {
        let map = ButtonMap::default();
        for button in ButtonEvent::ALL {
            assert_eq!(map.detect(map.range(button).midpoint()), Some(button));
        }
    }

    fn outside_every_range() -> impl Strategy<Value = i32> {
        prop_oneof![
            i32::MIN..=-4097,
            20..=69i32,
            161..=199i32,
            351..=449i32,
            701..=i32::MAX,
        ]
    }

    proptest! {
        #[test]
        fn prop_out_of_range_is_none(mv in outside_every_range()) {
            prop_assert_eq!(detect_button(mv as f32), None);
        }

        #[test]
        fn prop_in_range_matches_that_button(idx in 0usize..4, offset in 0i32..=90) {
            let map = ButtonMap::default();
            let button = ButtonEvent::ALL[idx];
            let range = map.range(button);
            let mv = (range.max - offset).max(range.min);
            prop_assert_eq!(map.detect(mv as f32), Some(button));
        }
    }
}
