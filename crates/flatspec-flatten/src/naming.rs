//! Name synthesis for extracted schemas.
//!
//! A name is picked in priority order: user override, usable title, then the
//! name derived from where the schema was found.

use std::collections::BTreeMap;

use flatspec_spec_parser::{HttpMethod, Schema};

use crate::options::InlineSchemaOptions;

/// Fallback when a derived name sanitizes to nothing.
const FALLBACK_NAME: &str = "inline_schema";

/// Derived name for untitled schemas of `components.responses` entries.
const COMPONENT_RESPONSE_NAME: &str = "inline_object";

/// Replace every character outside `[A-Za-z0-9_]` with `_`; prefix a leading digit with `_`.
pub fn sanitize_name(raw: &str) -> String {
    let mut name: String = raw
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    if name.starts_with(|c: char| c.is_ascii_digit()) {
        name.insert(0, '_');
    }
    name
}

/// A title can name a schema only if it is ASCII and has at least one letter or digit.
pub fn is_usable_title(title: &str) -> bool {
    title.is_ascii() && title.chars().any(|c| c.is_ascii_alphanumeric())
}

/// Base name of an operation: its operationId, or the path plus the method.
///
/// `/users/{id}` with `get` and no operationId gives `users_id_get`.
pub fn operation_base_name(operation_id: Option<&str>, path: &str, method: HttpMethod) -> String {
    match operation_id.filter(|id| !id.is_empty()) {
        Some(id) => id.to_string(),
        None => format!("{}_{}", path_base_name(path), method.as_str()),
    }
}

/// Path with the leading `/` removed, `/` turned into `_` and braces dropped.
pub fn path_base_name(path: &str) -> String {
    let trimmed = path.trim_start_matches('/');
    if trimmed.is_empty() {
        return "root".to_string();
    }
    trimmed
        .chars()
        .filter(|c| *c != '{' && *c != '}')
        .map(|c| if c == '/' { '_' } else { c })
        .collect()
}

/// The base name chosen for one extraction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub base: String,
    /// The base came from the override table.
    pub mapped: bool,
}

/// Naming rules bound to one pass configuration.
#[derive(Debug, Clone, Copy)]
pub struct Naming<'a> {
    options: &'a InlineSchemaOptions,
    mappings: &'a BTreeMap<String, String>,
}

impl<'a> Naming<'a> {
    pub fn new(options: &'a InlineSchemaOptions, mappings: &'a BTreeMap<String, String>) -> Self {
        Self { options, mappings }
    }

    /// Pick the base name for an inline node found at a slot with `derived` context name.
    pub fn base_name(&self, node: &Schema, derived: &str) -> Candidate {
        let synthesized = match node.title().filter(|t| is_usable_title(t)) {
            Some(title) => sanitize_name(title),
            None => sanitize_name(derived),
        };
        let synthesized = if synthesized.is_empty() {
            FALLBACK_NAME.to_string()
        } else {
            synthesized
        };

        match self.mappings.get(&synthesized) {
            Some(mapped) => Candidate {
                base: mapped.clone(),
                mapped: true,
            },
            None => Candidate {
                base: synthesized,
                mapped: false,
            },
        }
    }

    pub fn property(&self, parent: &str, property: &str) -> String {
        format!("{parent}_{property}")
    }

    pub fn array_item(&self, parent: &str) -> String {
        format!("{parent}{}", self.options.array_item_suffix)
    }

    pub fn map_value(&self, parent: &str) -> String {
        format!("{parent}{}", self.options.map_item_suffix)
    }

    pub fn request(&self, base: &str) -> String {
        format!("{base}_request")
    }

    pub fn response(&self, base: &str) -> String {
        format!("{base}_response")
    }

    /// A component response is shared between operations, so its schema is
    /// not named after any of them.
    pub fn component_response(&self) -> String {
        COMPONENT_RESPONSE_NAME.to_string()
    }

    pub fn parameter(&self, base: &str, parameter: &str) -> String {
        format!("{base}_{parameter}_parameter")
    }
}
