//! Read-only checks over a (flattened) document.
//!
//! `check` uses these to explain why a document is not flat; the test suites
//! use them to assert the post-conditions of a pass.

use flatspec_spec_parser::{
    AdditionalProperties, Document, MediaType, Operation, Parameter, PathItem, RefOr, Reference,
    Schema, SCHEMAS_PREFIX,
};
use indexmap::IndexMap;

use crate::classify::{is_extractable, is_member_extractable, Policy};
use crate::error::FlattenError;

/// Follow schema references until a concrete schema is reached.
pub fn resolve_schema<'d>(
    doc: &'d Document,
    schema: &'d Schema,
) -> Result<&'d Schema, FlattenError> {
    let mut current = schema;
    let mut seen: Vec<&str> = Vec::new();
    while let Schema::Reference(reference) = current {
        let name = reference
            .pointer
            .strip_prefix(SCHEMAS_PREFIX)
            .filter(|name| !name.contains('/'))
            .ok_or_else(|| FlattenError::UnresolvedRef(reference.pointer.clone()))?;
        if seen.contains(&name) {
            return Err(FlattenError::UnresolvedRef(format!(
                "{} (reference cycle)",
                reference.pointer
            )));
        }
        seen.push(name);
        current = doc
            .components
            .schemas
            .get(name)
            .ok_or_else(|| FlattenError::UnresolvedRef(reference.pointer.clone()))?;
    }
    Ok(current)
}

/// Locations (JSON-pointer style) of inline schemas that a pass would extract.
pub fn find_inline_composites(doc: &Document) -> Vec<String> {
    let mut walker = Walker::default();
    walker.walk_document(doc);
    walker.inline
}

/// Schema pointers that do not resolve to a component schema.
pub fn find_dangling_references(doc: &Document) -> Vec<String> {
    let mut walker = Walker::default();
    walker.walk_document(doc);
    walker
        .references
        .into_iter()
        .filter(|pointer| pointer.starts_with(SCHEMAS_PREFIX))
        .filter(|pointer| {
            let reference = Schema::Reference(Reference::new(pointer.as_str()));
            resolve_schema(doc, &reference).is_err()
        })
        .collect()
}

#[derive(Default)]
struct Walker {
    inline: Vec<String>,
    references: Vec<String>,
}

/// How a schema position treats an inline node.
#[derive(Clone, Copy, PartialEq, Eq)]
enum Role {
    Slot,
    Member,
    AllOfMember,
    Component,
}

impl Walker {
    fn walk_document(&mut self, doc: &Document) {
        for (path, item) in &doc.paths {
            self.walk_path_item(item, &format!("/paths/{}", escape(path)));
        }
        for (name, body) in &doc.components.request_bodies {
            if let RefOr::Item(body) = body {
                let at = format!("/components/requestBodies/{}", escape(name));
                self.walk_content(body.content.as_ref(), &at);
            }
        }
        for (name, response) in &doc.components.responses {
            if let RefOr::Item(response) = response {
                let at = format!("/components/responses/{}", escape(name));
                self.walk_content(response.content.as_ref(), &at);
            }
        }
        for (name, schema) in &doc.components.schemas {
            let at = format!("/components/schemas/{}", escape(name));
            self.walk_schema(schema, &at, Role::Component);
        }
    }

    fn walk_path_item(&mut self, item: &PathItem, at: &str) {
        self.walk_parameters(&item.parameters, at);
        for (method, op) in &item.operations {
            self.walk_operation(op, &format!("{at}/{method}"));
        }
    }

    fn walk_operation(&mut self, op: &Operation, at: &str) {
        self.walk_parameters(&op.parameters, at);
        if let Some(RefOr::Item(body)) = &op.request_body {
            self.walk_content(body.content.as_ref(), &format!("{at}/requestBody"));
        }
        for (status, response) in &op.responses {
            if let RefOr::Item(response) = response {
                let at = format!("{at}/responses/{}", escape(status));
                self.walk_content(response.content.as_ref(), &at);
            }
        }
        for (name, callback) in &op.callbacks {
            if let RefOr::Item(callback) = callback {
                for (expression, item) in &callback.expressions {
                    let at = format!("{at}/callbacks/{}/{}", escape(name), escape(expression));
                    self.walk_path_item(item, &at);
                }
            }
        }
    }

    fn walk_parameters(&mut self, parameters: &[RefOr<Parameter>], at: &str) {
        for (index, parameter) in parameters.iter().enumerate() {
            let RefOr::Item(parameter) = parameter else {
                continue;
            };
            let at = format!("{at}/parameters/{index}");
            if let Some(schema) = &parameter.schema {
                self.walk_schema(schema, &format!("{at}/schema"), Role::Slot);
            }
            self.walk_content(parameter.content.as_ref(), &at);
        }
    }

    fn walk_content(&mut self, content: Option<&IndexMap<String, MediaType>>, at: &str) {
        for (media_type, media) in content.into_iter().flatten() {
            if let Some(schema) = &media.schema {
                let at = format!("{at}/content/{}/schema", escape(media_type));
                self.walk_schema(schema, &at, Role::Slot);
            }
        }
    }

    fn walk_schema(&mut self, schema: &Schema, at: &str, role: Role) {
        let policy = Policy::default();
        let flagged = match role {
            Role::Slot => is_extractable(schema, policy),
            Role::Member => is_member_extractable(schema, policy),
            Role::AllOfMember | Role::Component => false,
        };
        if flagged {
            self.inline.push(at.to_string());
        }

        match schema {
            Schema::Reference(reference) => self.references.push(reference.pointer.clone()),
            Schema::Primitive(_) | Schema::Boolean(_) => {}
            Schema::Object(obj) => {
                for (name, child) in &obj.properties {
                    self.walk_schema(child, &format!("{at}/properties/{}", escape(name)), Role::Slot);
                }
                if let Some(AdditionalProperties::Schema(value)) = &obj.additional_properties {
                    self.walk_schema(value, &format!("{at}/additionalProperties"), Role::Slot);
                }
            }
            Schema::Array(array) => {
                if let Some(items) = &array.items {
                    self.walk_schema(items, &format!("{at}/items"), Role::Slot);
                }
            }
            Schema::Map(map) => {
                self.walk_schema(&map.value, &format!("{at}/additionalProperties"), Role::Slot)
            }
            Schema::Composed(composed) => {
                for (name, child) in &composed.properties {
                    self.walk_schema(child, &format!("{at}/properties/{}", escape(name)), Role::Slot);
                }
                for (index, member) in composed.all_of.iter().enumerate() {
                    self.walk_schema(member, &format!("{at}/allOf/{index}"), Role::AllOfMember);
                }
                for (index, member) in composed.any_of.iter().enumerate() {
                    self.walk_schema(member, &format!("{at}/anyOf/{index}"), Role::Member);
                }
                for (index, member) in composed.one_of.iter().enumerate() {
                    self.walk_schema(member, &format!("{at}/oneOf/{index}"), Role::Member);
                }
            }
        }
    }
}

/// JSON pointer escaping (`~` → `~0`, `/` → `~1`).
fn escape(segment: &str) -> String {
    segment.replace('~', "~0").replace('/', "~1")
}
