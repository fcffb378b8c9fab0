//! flatspec command-line library.
//!
//! Holds the configuration and checking logic behind the `flatspec` binary so
//! it can be tested without spawning a process.

pub mod check;
pub mod config;

pub use check::{check_spec, error_code, CheckIssue, CheckResult};
pub use config::{load_config, parse_key_value};
