//! Logging infrastructure for the flatspec toolchain.
//!
//! This crate provides:
//! - Structured JSON or human-readable logging on stderr
//! - Standard event names for the flattening pipeline
//! - `log_*!` helper macros that stamp the event name onto each record
//!
//! # Usage
//!
//! ```ignore
//! use flatspec_telemetry::{LogFormat, TelemetryConfig};
//!
//! let config = TelemetryConfig::new()
//!     .with_log_level("debug")
//!     .with_log_format(LogFormat::Pretty);
//!
//! flatspec_telemetry::init(&config)?;
//! ```

pub mod config;
pub mod logging;

pub use config::{LogFormat, TelemetryConfig};
pub use logging::events;

use thiserror::Error;

/// Telemetry errors.
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// Failed to initialize logging.
    #[error("failed to initialize logging: {0}")]
    LoggingInit(String),

    /// The configured log level is not a valid filter directive.
    #[error("invalid log level '{0}'")]
    InvalidLevel(String),
}

/// Initialize logging with the given configuration.
///
/// Fails if a global subscriber is already installed.
pub fn init(config: &TelemetryConfig) -> Result<(), TelemetryError> {
    logging::init_logging(config)
}
