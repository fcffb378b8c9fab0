//! Inline schema options and the per-pass configuration.
//!
//! Options arrive as a string map (from `flatspec.yaml` or `--option` flags)
//! and are parsed once into [`InlineSchemaOptions`].

use std::collections::BTreeMap;

use flatspec_telemetry::log_unknown_option;
use serde::Serialize;

use crate::error::FlattenError;

/// Suffix appended to the parent name for array items.
pub const ARRAY_ITEM_SUFFIX: &str = "ARRAY_ITEM_SUFFIX";
/// Suffix appended to the parent name for map values.
pub const MAP_ITEM_SUFFIX: &str = "MAP_ITEM_SUFFIX";
/// Register every extraction, even when an identical shape was seen before.
pub const SKIP_SCHEMA_REUSE: &str = "SKIP_SCHEMA_REUSE";
/// Extract inline enums found in parameters and form bodies.
pub const RESOLVE_INLINE_ENUMS: &str = "RESOLVE_INLINE_ENUMS";
/// Extract inline all-of members instead of keeping them in place.
pub const REFACTOR_ALLOF_INLINE_SCHEMAS: &str = "REFACTOR_ALLOF_INLINE_SCHEMAS";

/// Typed inline schema options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InlineSchemaOptions {
    pub array_item_suffix: String,
    pub map_item_suffix: String,
    pub skip_schema_reuse: bool,
    pub resolve_inline_enums: bool,
    pub refactor_allof_inline_schemas: bool,
}

impl Default for InlineSchemaOptions {
    fn default() -> Self {
        Self {
            array_item_suffix: "_inner".to_string(),
            map_item_suffix: "_value".to_string(),
            skip_schema_reuse: false,
            resolve_inline_enums: false,
            refactor_allof_inline_schemas: false,
        }
    }
}

impl InlineSchemaOptions {
    /// Parse options from a string map. Unknown keys are logged and ignored.
    pub fn from_map(map: &BTreeMap<String, String>) -> Result<Self, FlattenError> {
        let mut options = Self::default();
        for (key, value) in map {
            match key.as_str() {
                ARRAY_ITEM_SUFFIX => options.array_item_suffix = value.clone(),
                MAP_ITEM_SUFFIX => options.map_item_suffix = value.clone(),
                SKIP_SCHEMA_REUSE => options.skip_schema_reuse = parse_bool(key, value)?,
                RESOLVE_INLINE_ENUMS => options.resolve_inline_enums = parse_bool(key, value)?,
                REFACTOR_ALLOF_INLINE_SCHEMAS => {
                    options.refactor_allof_inline_schemas = parse_bool(key, value)?
                }
                _ => log_unknown_option!(key = %key, value = %value),
            }
        }
        Ok(options)
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool, FlattenError> {
    if value.eq_ignore_ascii_case("true") {
        Ok(true)
    } else if value.eq_ignore_ascii_case("false") {
        Ok(false)
    } else {
        Err(FlattenError::InvalidOption {
            key: key.to_string(),
            value: value.to_string(),
        })
    }
}

/// Everything a flattening pass needs besides the document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlattenConfig {
    pub options: InlineSchemaOptions,
    /// Base name → final name overrides.
    pub name_mappings: BTreeMap<String, String>,
    /// Forwarded to downstream generators; the pass itself ignores it.
    pub generate_metadata: bool,
}

impl FlattenConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a config from the dynamic option map and a name-mapping table.
    pub fn from_maps(
        options: &BTreeMap<String, String>,
        name_mappings: BTreeMap<String, String>,
    ) -> Result<Self, FlattenError> {
        Ok(Self {
            options: InlineSchemaOptions::from_map(options)?,
            name_mappings,
            generate_metadata: false,
        })
    }

    pub fn with_options(mut self, options: InlineSchemaOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_name_mapping(mut self, from: impl Into<String>, to: impl Into<String>) -> Self {
        self.name_mappings.insert(from.into(), to.into());
        self
    }

    pub fn with_generate_metadata(mut self, generate_metadata: bool) -> Self {
        self.generate_metadata = generate_metadata;
        self
    }
}
