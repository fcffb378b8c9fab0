//! The `check` command: does a document still contain inline schemas?

use std::path::Path;

use flatspec_flatten::{find_inline_composites, flatten, FlattenConfig};
use flatspec_spec_parser::{parse_spec_file, ParseError};
use serde::Serialize;

/// Outcome of checking one spec file.
#[derive(Debug, Serialize)]
pub struct CheckResult {
    pub file: String,
    /// Parsed and a flattening pass would change nothing.
    pub flat: bool,
    /// Names a flattening pass would register.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub would_register: Vec<String>,
    /// Locations of inline schemas that would be extracted.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub inline_locations: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub unresolved: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<CheckIssue>,
}

#[derive(Debug, Serialize)]
pub struct CheckIssue {
    pub code: String,
    pub message: String,
}

/// Error code reported for a parse failure.
pub fn error_code(error: &ParseError) -> &'static str {
    match error {
        ParseError::UnknownFormat => "E1001",
        ParseError::ParseError(_) => "E1002",
        ParseError::WriteError(_) => "E1003",
        ParseError::SchemaError(_) => "E1004",
        ParseError::Io(_) => "E1000",
    }
}

/// Parse `path` and run a dry flattening pass on a copy of it.
pub fn check_spec(path: &Path, config: &FlattenConfig) -> CheckResult {
    let file = path.display().to_string();
    let failed = |code: &str, message: String| CheckResult {
        file: file.clone(),
        flat: false,
        would_register: Vec::new(),
        inline_locations: Vec::new(),
        unresolved: Vec::new(),
        errors: vec![CheckIssue {
            code: code.to_string(),
            message,
        }],
    };

    if !path.exists() {
        return failed("E1000", format!("file not found: {}", file));
    }

    let doc = match parse_spec_file(path) {
        Ok(doc) => doc,
        Err(e) => return failed(error_code(&e), e.to_string()),
    };

    let inline_locations = find_inline_composites(&doc);
    let mut dry_run = doc;
    match flatten(&mut dry_run, config) {
        Ok(report) => CheckResult {
            file: file.clone(),
            flat: report.is_noop(),
            would_register: report.registered,
            inline_locations,
            unresolved: report.unresolved,
            errors: Vec::new(),
        },
        Err(e) => failed("E2000", e.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn spec_file(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::with_suffix(".yaml").unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn flat_document() {
        let file = spec_file(
            "openapi: 3.0.3\npaths: {}\ncomponents:\n  schemas:\n    Id:\n      type: string\n",
        );
        let result = check_spec(file.path(), &FlattenConfig::default());
        assert!(result.flat);
        assert!(result.errors.is_empty());
    }

    #[test]
    fn document_with_inline_schema() {
        let file = spec_file(
            r#"openapi: 3.0.3
paths: {}
components:
  schemas:
    User:
      type: object
      properties:
        address:
          type: object
          properties:
            city:
              type: string
"#,
        );
        let result = check_spec(file.path(), &FlattenConfig::default());
        assert!(!result.flat);
        assert_eq!(result.would_register, ["User_address"]);
        assert_eq!(
            result.inline_locations,
            ["/components/schemas/User/properties/address"]
        );
    }

    #[test]
    fn unparseable_document() {
        let file = spec_file("swagger: \"2.0\"\npaths: {}\n");
        let result = check_spec(file.path(), &FlattenConfig::default());
        assert!(!result.flat);
        assert_eq!(result.errors[0].code, "E1001");
    }

    #[test]
    fn missing_file() {
        let result = check_spec(Path::new("does-not-exist.yaml"), &FlattenConfig::default());
        assert_eq!(result.errors[0].code, "E1000");
    }
}
