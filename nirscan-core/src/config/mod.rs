//! Configuration types
//!
//! Device configuration deserialized from `device.toml`. Every field has
//! a default, so a partial file only overrides what it names.

pub mod types;

pub use types::*;
