//! Domain layer: plain configuration types with no I/O beyond reading a
//! config file the caller points at.

pub mod config;

pub use config::{ClientConfig, ConfigError, DEFAULT_DISCOVERY_URL};
