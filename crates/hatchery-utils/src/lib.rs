//! # Hatchery Utilities
//!
//! Logging and configuration helpers shared by the hatchery crates.
//!
//! `hatchery-core` only emits `tracing` events; binaries and tools built on
//! it call [`init_logging`] once at startup to decide where those events go.

pub mod logging;

// Re-export commonly used logging functions for convenience
pub use logging::{LogConfig, LogFormat, LogLevel, LoggingError, init_logging, init_logging_with_level};
pub use tracing::{debug, error, info, trace, warn};
