//! The extraction engine: name, dedup, register, rewrite.

use flatspec_spec_parser::{schema_ref, Reference, Schema};
use flatspec_telemetry::{log_name_conflict, log_schema_extracted, log_schema_reused};

use crate::classify::Policy;
use crate::error::FlattenError;
use crate::traverse::Flattener;

impl Flattener<'_> {
    /// Move an inline node into the registry and return the reference that replaces it.
    ///
    /// An identical shape extracted earlier under the same base name is reused
    /// instead of registered again. The registered schema's own children are
    /// flattened before this returns.
    pub(crate) fn extract(
        &mut self,
        node: Schema,
        derived: &str,
        policy: Policy,
    ) -> Result<Schema, FlattenError> {
        let candidate = self.naming.base_name(&node, derived);
        let base = candidate.base;
        let extensions = node
            .meta()
            .map(|meta| meta.extensions.clone())
            .unwrap_or_default();

        if !self.options.skip_schema_reuse {
            if let Some(existing) = self.registry.find_reusable(&base, &node) {
                let existing = existing.to_string();
                log_schema_reused!(name = %existing, derived = %derived);
                self.report.reused.push(existing.clone());
                return Ok(reference_to(&existing, extensions));
            }
        }

        let name = self.registry.unique_name(&base);
        if candidate.mapped && name != base {
            log_name_conflict!(requested = %base, assigned = %name);
        }
        self.registry.register(&base, &name, node);
        log_schema_extracted!(name = %name, derived = %derived);
        self.report.registered.push(name.clone());

        self.visit_registered(&name, policy)?;
        Ok(reference_to(&name, extensions))
    }
}

/// A reference to a component schema carrying the extracted node's `x-*` extensions.
fn reference_to(name: &str, extensions: flatspec_spec_parser::Extensions) -> Schema {
    Schema::Reference(Reference {
        pointer: schema_ref(name),
        siblings: extensions,
    })
}
