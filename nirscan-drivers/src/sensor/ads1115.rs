//! ADS1115 single-shot ADC driver
//!
//! Reads the button ladder voltage on AIN0.
//!
//! # Register protocol
//!
//! - Write the 16-bit config word (big-endian) to the config register;
//!   this starts a single-shot conversion
//! - Wait for the conversion to settle
//! - Read the 16-bit signed result from the conversion register
//!
//! With the ±4.096 V full-scale range one LSB is 0.125 mV.

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;
use nirscan_core::traits::{AdcReader, SensorError};
use tracing::trace;

/// Register pointers
pub mod reg {
    /// Conversion result
    pub const CONVERSION: u8 = 0x00;
    /// Configuration
    pub const CONFIG: u8 = 0x01;
}

/// AIN0 single-ended, ±4.096 V, single-shot, 128 SPS, comparator off
pub const CONFIG_AIN0: u16 = 0xC383;

/// Full-scale range in millivolts for the PGA setting above
pub const FULL_SCALE_MV: f32 = 4096.0;

/// Default 7-bit address (ADDR pin to GND)
pub const DEFAULT_ADDRESS: u8 = 0x48;

/// Driver configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ads1115Config {
    /// 7-bit I2C address
    pub address: u8,
    /// Config word written before each conversion
    pub config: u16,
    /// Wait between conversion start and readback (ms)
    pub settle_ms: u32,
}

impl Default for Ads1115Config {
    fn default() -> Self {
        Self {
            address: DEFAULT_ADDRESS,
            config: CONFIG_AIN0,
            settle_ms: 10,
        }
    }
}

/// Convert a raw conversion result to millivolts
///
/// One LSB is 0.125 mV at this gain; the result is exact in `f32`.
pub fn raw_to_millivolts(raw: i16) -> f32 {
    f32::from(raw) * FULL_SCALE_MV / 32768.0
}

/// ADS1115 on an `embedded-hal` I2C bus
pub struct Ads1115<I, D> {
    i2c: I,
    delay: D,
    config: Ads1115Config,
}

impl<I: I2c, D: DelayNs> Ads1115<I, D> {
    pub fn new(i2c: I, delay: D, config: Ads1115Config) -> Self {
        Self { i2c, delay, config }
    }

    /// Start a conversion and read the raw result
    pub fn read_raw(&mut self) -> Result<i16, SensorError> {
        let [hi, lo] = self.config.config.to_be_bytes();
        self.i2c
            .write(self.config.address, &[reg::CONFIG, hi, lo])
            .map_err(bus_error)?;

        self.delay.delay_ms(self.config.settle_ms);

        let mut buf = [0u8; 2];
        self.i2c
            .write_read(self.config.address, &[reg::CONVERSION], &mut buf)
            .map_err(bus_error)?;

        Ok(i16::from_be_bytes(buf))
    }

    /// Release the bus and delay
    pub fn release(self) -> (I, D) {
        (self.i2c, self.delay)
    }
}

fn bus_error<E: embedded_hal::i2c::Error>(e: E) -> SensorError {
    SensorError::Bus(format!("{:?}", e.kind()))
}

impl<I: I2c, D: DelayNs> AdcReader for Ads1115<I, D> {
    fn read_millivolts(&mut self) -> Result<f32, SensorError> {
        let raw = self.read_raw()?;
        let mv = raw_to_millivolts(raw);
        trace!("ADS1115 raw={} mv={}", raw, mv);
        Ok(mv)
    }
}
