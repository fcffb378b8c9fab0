//! Project configuration file (`flatspec.yaml`) parser.
//!
//! ```yaml
//! inline_schema_options:
//!   ARRAY_ITEM_SUFFIX: _item
//!   RESOLVE_INLINE_ENUMS: true
//! inline_schema_name_mappings:
//!   createUser_request: NewUser
//! generate_metadata: true
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::FlattenError;
use crate::options::FlattenConfig;

/// A project configuration file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FlattenManifest {
    /// Inline schema options: key -> scalar value.
    #[serde(default)]
    pub inline_schema_options: BTreeMap<String, serde_yaml::Value>,

    /// Base name -> final name overrides.
    #[serde(default)]
    pub inline_schema_name_mappings: BTreeMap<String, String>,

    /// Forwarded to downstream generators.
    #[serde(default)]
    pub generate_metadata: bool,
}

impl FlattenManifest {
    /// Load a manifest from a YAML file.
    pub fn load(path: &Path) -> Result<Self, FlattenError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            FlattenError::ConfigError(format!("failed to read {}: {}", path.display(), e))
        })?;

        Self::parse(&content, path)
    }

    /// Parse a manifest from YAML content.
    pub fn parse(content: &str, path: &Path) -> Result<Self, FlattenError> {
        // An empty file is an empty manifest.
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content).map_err(|e| {
            FlattenError::ConfigError(format!("failed to parse {}: {}", path.display(), e))
        })
    }

    /// Layer command-line overrides on top of the file entries.
    pub fn with_overrides(
        mut self,
        options: impl IntoIterator<Item = (String, String)>,
        name_mappings: impl IntoIterator<Item = (String, String)>,
    ) -> Self {
        for (key, value) in options {
            self.inline_schema_options
                .insert(key, serde_yaml::Value::String(value));
        }
        self.inline_schema_name_mappings.extend(name_mappings);
        self
    }

    /// Parse the option values and build the pass configuration.
    pub fn to_config(&self) -> Result<FlattenConfig, FlattenError> {
        let options = self
            .inline_schema_options
            .iter()
            .map(|(key, value)| Ok((key.clone(), scalar_to_string(key, value)?)))
            .collect::<Result<BTreeMap<_, _>, FlattenError>>()?;

        Ok(
            FlattenConfig::from_maps(&options, self.inline_schema_name_mappings.clone())?
                .with_generate_metadata(self.generate_metadata),
        )
    }
}

/// Option values may be written as YAML booleans or numbers; they are read as text.
fn scalar_to_string(key: &str, value: &serde_yaml::Value) -> Result<String, FlattenError> {
    match value {
        serde_yaml::Value::String(s) => Ok(s.clone()),
        serde_yaml::Value::Bool(b) => Ok(b.to_string()),
        serde_yaml::Value::Number(n) => Ok(n.to_string()),
        serde_yaml::Value::Null => Ok(String::new()),
        other => Err(FlattenError::InvalidOption {
            key: key.to_string(),
            value: format!("{:?}", other),
        }),
    }
}
