//! Configuration loading
//!
//! Loads `device.toml` from the command line, the environment, or the
//! copy embedded at build time.

pub mod loader;

pub use loader::{load_config, ConfigSource, LoadError, CONFIG_ENV};
