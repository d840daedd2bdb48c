//! ADC readers

pub mod ads1115;

pub use ads1115::{raw_to_millivolts, Ads1115, Ads1115Config};
