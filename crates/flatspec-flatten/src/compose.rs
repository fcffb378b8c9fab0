//! Composition handling for `allOf` / `anyOf` / `oneOf`.
//!
//! Inline all-of members keep their own data in place (the generators merge
//! them into the parent); only their children are flattened, named under
//! `<Parent>_allOf`. Any-of and one-of members become named schemas so each
//! alternative gets its own type.

use flatspec_spec_parser::{ComposedSchema, Schema};

use crate::classify::{is_extractable, is_member_extractable, Policy};
use crate::error::FlattenError;
use crate::traverse::Flattener;

/// Vendor extension carrying the discriminator value of a subtype.
pub const DISCRIMINATOR_VALUE_EXTENSION: &str = "x-discriminator-value";

impl Flattener<'_> {
    pub(crate) fn visit_composed(
        &mut self,
        composed: &mut ComposedSchema,
        parent: &str,
        policy: Policy,
    ) -> Result<(), FlattenError> {
        hoist_discriminator_value(composed);

        for (property, child) in composed.properties.iter_mut() {
            let derived = self.naming.property(parent, property);
            self.visit_slot(child, &derived, policy)?;
        }

        let all_of_name = format!("{parent}_allOf");
        let refactor = self.options.refactor_allof_inline_schemas;
        for member in composed.all_of.iter_mut() {
            if refactor && is_extractable(member, policy) {
                self.visit_slot(member, &all_of_name, policy)?;
            } else {
                self.visit_children(member, &all_of_name, policy)?;
            }
        }

        let any_of_name = format!("{parent}_anyOf");
        for member in composed.any_of.iter_mut() {
            self.visit_member(member, &any_of_name, policy)?;
        }

        let one_of_name = format!("{parent}_oneOf");
        for member in composed.one_of.iter_mut() {
            self.visit_member(member, &one_of_name, policy)?;
        }
        Ok(())
    }

    /// Any-of / one-of members: every composite alternative gets a name.
    fn visit_member(
        &mut self,
        member: &mut Schema,
        derived: &str,
        policy: Policy,
    ) -> Result<(), FlattenError> {
        if is_member_extractable(member, policy) {
            let node = std::mem::take(member);
            *member = self.extract(node, derived, policy)?;
            Ok(())
        } else {
            self.visit_slot(member, derived, policy)
        }
    }
}

/// Move `x-discriminator-value` from inline all-of members up to the combination.
///
/// The discriminator itself and its required marking stay on the member.
fn hoist_discriminator_value(composed: &mut ComposedSchema) {
    for member in composed.all_of.iter_mut() {
        if composed
            .meta
            .extensions
            .contains_key(DISCRIMINATOR_VALUE_EXTENSION)
        {
            return;
        }
        let Some(meta) = member.meta_mut() else {
            continue;
        };
        if let Some(value) = meta.extensions.shift_remove(DISCRIMINATOR_VALUE_EXTENSION) {
            composed
                .meta
                .extensions
                .insert(DISCRIMINATOR_VALUE_EXTENSION.to_string(), value);
        }
    }
}
