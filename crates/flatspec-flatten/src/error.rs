use thiserror::Error;

/// Errors produced while configuring or running a flattening pass.
#[derive(Debug, Error)]
pub enum FlattenError {
    /// Spec parsing or writing failed.
    #[error(transparent)]
    Parse(#[from] flatspec_spec_parser::ParseError),

    /// E2001: A schema pointer does not resolve inside the document.
    #[error("E2001: unresolved reference: {0}")]
    UnresolvedRef(String),

    /// E2002: A schema registered during the pass can no longer be found.
    #[error("E2002: registered schema '{0}' is missing from components")]
    MissingRegistered(String),

    /// E2003: An inline schema option has a value of the wrong shape.
    #[error("E2003: invalid value '{value}' for option {key}")]
    InvalidOption { key: String, value: String },

    /// Configuration file parsing or loading error.
    #[error("config error: {0}")]
    ConfigError(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
