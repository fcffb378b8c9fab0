use thiserror::Error;

/// Errors produced while reading or writing a document (E1001–E1004).
#[derive(Debug, Error)]
pub enum ParseError {
    /// E1001: File is not an OpenAPI 3.x document.
    #[error("E1001: not a valid OpenAPI 3.x document")]
    UnknownFormat,

    /// E1002: YAML/JSON parse error.
    #[error("E1002: parse error: {0}")]
    ParseError(String),

    /// E1003: Serialization of the flattened document failed.
    #[error("E1003: write error: {0}")]
    WriteError(String),

    /// E1004: Structural error in the document.
    #[error("E1004: schema validation error: {0}")]
    SchemaError(String),

    /// I/O error reading the spec file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
