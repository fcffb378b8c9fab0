//! The component schema registry as seen by one flattening pass.

use std::collections::HashMap;

use indexmap::IndexMap;

use flatspec_spec_parser::Schema;

/// Wraps `components.schemas` with the bookkeeping needed for reuse and unique naming.
pub struct Registry<'a> {
    schemas: &'a mut IndexMap<String, Schema>,
    /// Pre-existing schemas as they were before the pass touched them.
    originals: IndexMap<String, Schema>,
    /// Base name -> (shape as first seen inline, registered name).
    generated: HashMap<String, Vec<(Schema, String)>>,
}

impl<'a> Registry<'a> {
    pub fn new(schemas: &'a mut IndexMap<String, Schema>) -> Self {
        let originals = schemas.clone();
        Self {
            schemas,
            originals,
            generated: HashMap::new(),
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.schemas.contains_key(name)
    }

    /// An already registered schema with the same base name and the same shape.
    pub fn find_reusable(&self, base: &str, candidate: &Schema) -> Option<&str> {
        if let Some(entries) = self.generated.get(base) {
            if let Some((_, name)) = entries.iter().find(|(shape, _)| shape == candidate) {
                return Some(name.as_str());
            }
        }
        match self.originals.get_key_value(base) {
            Some((name, original)) if original == candidate => Some(name.as_str()),
            _ => None,
        }
    }

    /// `base` if free, else `base_n` for the lowest free `n >= 1`.
    pub fn unique_name(&self, base: &str) -> String {
        if !self.contains(base) {
            return base.to_string();
        }
        (1..)
            .map(|n| format!("{base}_{n}"))
            .find(|name| !self.contains(name))
            .unwrap_or_else(|| base.to_string())
    }

    /// Insert an extracted schema under `name`, remembering its inline shape under `base`.
    pub fn register(&mut self, base: &str, name: &str, schema: Schema) {
        self.generated
            .entry(base.to_string())
            .or_default()
            .push((schema.clone(), name.to_string()));
        self.schemas.insert(name.to_string(), schema);
    }

    /// Move a schema out for in-place work, leaving a placeholder that keeps its position.
    pub fn take(&mut self, name: &str) -> Option<Schema> {
        self.schemas.get_mut(name).map(std::mem::take)
    }

    /// Put back a schema obtained from [`Registry::take`].
    pub fn restore(&mut self, name: &str, schema: Schema) {
        if let Some(slot) = self.schemas.get_mut(name) {
            *slot = schema;
        }
    }
}
