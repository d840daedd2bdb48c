//! Analog button-ladder sensor trait

use tracing::warn;

use crate::input::SENTINEL_MV;

/// Errors that can occur while sampling the ADC
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SensorError {
    /// Bus transaction failed (NACK, arbitration loss, device unplugged)
    #[error("bus communication failed: {0}")]
    Bus(String),
    /// Conversion did not complete in time
    #[error("conversion timed out")]
    Timeout,
}

/// Trait for the voltage source behind the button ladder
///
/// Implementations return a reading in millivolts, keeping any
/// sub-millivolt fraction the converter resolves. Takes `&mut self`
/// because a conversion is a write-then-read bus sequence.
pub trait AdcReader {
    /// Read the current voltage in millivolts
    fn read_millivolts(&mut self) -> Result<f32, SensorError>;

    /// Read the current voltage, substituting [`SENTINEL_MV`] on failure
    ///
    /// Bus failures are recovered here and never propagated to the poller.
    fn read_or_sentinel(&mut self) -> f32 {
        match self.read_millivolts() {
            Ok(mv) => mv,
            Err(e) => {
                warn!("ADC read failed, substituting sentinel: {}", e);
                SENTINEL_MV
            }
        }
    }
}

impl<T: AdcReader + ?Sized> AdcReader for Box<T> {
    fn read_millivolts(&mut self) -> Result<f32, SensorError> {
        (**self).read_millivolts()
    }
}
