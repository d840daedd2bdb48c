//! Configuration type definitions

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::classify::{ClassSet, CONFIDENCE_THRESHOLD};
use crate::input::{ButtonEvent, ButtonMap};
use crate::spectrum::MIN_POINTS;

/// Configuration validation failures
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// Two button ranges share a millivolt value
    #[error("button ranges {} and {} overlap", .0.name(), .1.name())]
    OverlappingRanges(ButtonEvent, ButtonEvent),
    /// A range with `min > max`
    #[error("button range {} is empty", .0.name())]
    EmptyRange(ButtonEvent),
    /// Class names unusable as labels
    #[error("invalid class list: {0}")]
    Classes(String),
    /// Any other out-of-bounds value
    #[error("{field}: {reason}")]
    Invalid {
        field: &'static str,
        reason: String,
    },
}

fn invalid(field: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        field,
        reason: reason.into(),
    }
}

/// Hardware/model capability selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Backend {
    /// ADS1115, external acquisition program, TFLite model, framebuffer
    #[default]
    Live,
    /// Keyboard input, synthesized scans, built-in model, no display
    Simulated,
}

/// Button ADC configuration
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct InputConfig {
    /// I2C bus device node
    pub i2c_bus: String,
    /// ADC 7-bit address
    pub address: u8,
    /// Sampling interval (ms)
    pub poll_interval_ms: u32,
    /// Delay between conversion start and readback (ms)
    pub settle_ms: u32,
    /// Voltage ladder ranges
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub buttons: ButtonMap,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            i2c_bus: "/dev/i2c-1".into(),
            address: 0x48,
            poll_interval_ms: 120,
            settle_ms: 10,
            buttons: ButtonMap::default(),
        }
    }
}

/// Render loop configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct UiConfig {
    /// Render ticks per second
    pub tick_hz: u32,
    /// Virtual canvas width (px)
    pub virtual_width: u32,
    /// Virtual canvas height (px)
    pub virtual_height: u32,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            tick_hz: 30,
            virtual_width: 320,
            virtual_height: 240,
        }
    }
}

impl UiConfig {
    /// Tick period in milliseconds
    pub fn tick_ms(&self) -> u64 {
        1000 / u64::from(self.tick_hz.max(1))
    }
}

/// Physical display configuration
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct DisplayConfig {
    /// Framebuffer device node
    pub device: String,
    /// Physical width (px)
    pub width: u32,
    /// Physical height (px)
    pub height: u32,
    /// 16 (RGB565) or 32 (XRGB8888)
    pub bits_per_pixel: u8,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            device: "/dev/fb0".into(),
            width: 480,
            height: 320,
            bits_per_pixel: 16,
        }
    }
}

/// Scan acquisition and artifact discovery
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ScanConfig {
    /// Directory the acquisition program writes artifacts into
    pub artifact_dir: String,
    /// Artifact file extension, without the dot
    pub artifact_extension: String,
    /// Minimum time between scan start and a visible outcome (ms)
    pub min_duration_ms: u32,
    /// Acquisition program
    pub program: String,
    /// Arguments, including the persist-artifact flag
    pub args: Vec<String>,
    /// Optional artifact name prefix passed to the program
    pub prefix: Option<String>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            artifact_dir: "~/Scans".into(),
            artifact_extension: "csv".into(),
            min_duration_ms: 1200,
            program: "nirscan-acquire".into(),
            args: vec!["--save-csv".into()],
            prefix: None,
        }
    }
}

/// Inference model configuration
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ModelConfig {
    /// Model file
    pub path: String,
    /// Class names in output order
    pub classes: Vec<String>,
    /// Minimum best-class score for a detection
    pub confidence_threshold: f32,
    /// Minimum absorbance points per scan
    pub min_points: usize,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            path: "~/models/nir_classifier.tflite".into(),
            classes: ClassSet::default().iter().map(String::from).collect(),
            confidence_threshold: CONFIDENCE_THRESHOLD,
            min_points: MIN_POINTS,
        }
    }
}

impl ModelConfig {
    /// Class set for the classifier
    pub fn class_set(&self) -> Result<ClassSet, ConfigError> {
        if self.classes.is_empty() {
            return Err(ConfigError::Classes("no classes".into()));
        }
        ClassSet::from_names(&self.classes)
            .ok_or_else(|| ConfigError::Classes(format!("{:?}", self.classes)))
    }
}

/// Complete device configuration
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct DeviceConfig {
    /// Capability set, chosen once at startup
    pub backend: Backend,
    pub input: InputConfig,
    pub ui: UiConfig,
    pub display: DisplayConfig,
    pub scan: ScanConfig,
    pub model: ModelConfig,
}

impl DeviceConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check cross-field constraints that deserialization cannot express
    pub fn validate(&self) -> Result<(), ConfigError> {
        for button in ButtonEvent::ALL {
            let range = self.input.buttons.range(button);
            if range.min > range.max {
                return Err(ConfigError::EmptyRange(button));
            }
        }
        if let Some((a, b)) = self.input.buttons.find_overlap() {
            return Err(ConfigError::OverlappingRanges(a, b));
        }
        if self.input.poll_interval_ms == 0 {
            return Err(invalid("input.poll_interval_ms", "must be positive"));
        }
        if self.ui.tick_hz == 0 || self.ui.tick_hz > 120 {
            return Err(invalid("ui.tick_hz", "must be 1-120"));
        }
        if self.ui.virtual_width == 0 || self.ui.virtual_height == 0 {
            return Err(invalid("ui", "virtual resolution must be non-zero"));
        }
        if self.display.width == 0 || self.display.height == 0 {
            return Err(invalid("display", "resolution must be non-zero"));
        }
        if !matches!(self.display.bits_per_pixel, 16 | 32) {
            return Err(invalid("display.bits_per_pixel", "must be 16 or 32"));
        }
        if self.scan.artifact_extension.is_empty() || self.scan.artifact_extension.contains('.') {
            return Err(invalid(
                "scan.artifact_extension",
                "must be a bare extension such as \"csv\"",
            ));
        }
        if self.backend == Backend::Live && self.scan.program.trim().is_empty() {
            return Err(invalid("scan.program", "required for the live backend"));
        }
        let threshold = self.model.confidence_threshold;
        if !(0.0..=1.0).contains(&threshold) {
            return Err(invalid("model.confidence_threshold", "must be 0.0-1.0"));
        }
        if self.model.min_points < 2 {
            return Err(invalid("model.min_points", "must be at least 2"));
        }
        self.model.class_set()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::MillivoltRange;

    #[test]
    fn test_default_is_valid() {
        assert_eq!(DeviceConfig::default().validate(), Ok(()));
    }

    #[test]
    fn test_defaults_match_device() {
        let config = DeviceConfig::default();
        assert_eq!(config.input.address, 0x48);
        assert_eq!(config.input.poll_interval_ms, 120);
        assert_eq!(config.ui.tick_hz, 30);
        assert_eq!(config.ui.tick_ms(), 33);
        assert_eq!(config.scan.min_duration_ms, 1200);
        assert_eq!(config.model.min_points, 228);
        assert_eq!(config.model.classes, vec!["MSG", "Salt", "Sugar"]);
    }

    #[test]
    fn test_overlap_rejected() {
        let mut config = DeviceConfig::default();
        config.input.buttons.right = MillivoltRange::new(300, 700);
        assert_eq!(
            config.validate(),
            Err(ConfigError::OverlappingRanges(
                ButtonEvent::Down,
                ButtonEvent::Right
            ))
        );
    }

    #[test]
    fn test_empty_range_rejected() {
        let mut config = DeviceConfig::default();
        config.input.buttons.up = MillivoltRange::new(160, 70);
        assert_eq!(
            config.validate(),
            Err(ConfigError::EmptyRange(ButtonEvent::Up))
        );
    }

    #[test]
    fn test_bad_values_rejected() {
        let mut config = DeviceConfig::default();
        config.display.bits_per_pixel = 24;
        assert!(config.validate().is_err());

        let mut config = DeviceConfig::default();
        config.model.confidence_threshold = 1.5;
        assert!(config.validate().is_err());

        let mut config = DeviceConfig::default();
        config.model.classes.clear();
        assert!(matches!(config.validate(), Err(ConfigError::Classes(_))));

        let mut config = DeviceConfig::default();
        config.scan.artifact_extension = ".csv".into();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_simulated_needs_no_program() {
        let mut config = DeviceConfig::default();
        config.backend = Backend::Simulated;
        config.scan.program.clear();
        assert_eq!(config.validate(), Ok(()));
    }
}
