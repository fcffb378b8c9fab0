//! Schema classification and the extraction predicates.

use flatspec_spec_parser::{ComposedSchema, Schema, SchemaMeta};

/// Coarse kind of a schema node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    Reference,
    Primitive,
    Object,
    Array,
    Map,
    Composed,
}

/// What the current visiting context allows to be extracted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Policy {
    /// Inline enums become extractable (parameters and form bodies only).
    pub inline_enums: bool,
}

impl Policy {
    pub fn with_inline_enums(inline_enums: bool) -> Self {
        Self { inline_enums }
    }
}

pub fn classify(node: &Schema) -> Kind {
    match node {
        Schema::Reference(_) => Kind::Reference,
        Schema::Object(_) => Kind::Object,
        Schema::Array(_) => Kind::Array,
        Schema::Map(_) => Kind::Map,
        Schema::Composed(_) => Kind::Composed,
        Schema::Primitive(_) | Schema::Boolean(_) => Kind::Primitive,
    }
}

/// Whether an inline node at an ordinary slot must be moved into components.
pub fn is_extractable(node: &Schema, policy: Policy) -> bool {
    match node {
        Schema::Object(obj) => !obj.properties.is_empty(),
        Schema::Composed(composed) => !is_trivial_composed(composed),
        Schema::Primitive(p) => policy.inline_enums && !p.enum_values.is_empty(),
        Schema::Reference(_) | Schema::Array(_) | Schema::Map(_) | Schema::Boolean(_) => false,
    }
}

/// Whether an inline any-of / one-of member must be moved into components.
///
/// Every object member is extracted, even one without properties.
pub fn is_member_extractable(node: &Schema, policy: Policy) -> bool {
    matches!(node, Schema::Object(_)) || is_extractable(node, policy)
}

/// A combination that only re-labels a single referenced schema.
///
/// `{allOf: [$ref]}` stays where it is, also with a `description`, `readOnly`
/// or `nullable` next to it. An inline member or any other metadata makes the
/// wrapper a shape of its own.
pub fn is_trivial_composed(composed: &ComposedSchema) -> bool {
    if !composed.any_of.is_empty()
        || !composed.one_of.is_empty()
        || !composed.properties.is_empty()
        || !composed.required.is_empty()
        || composed.discriminator.is_some()
    {
        return false;
    }
    match composed.all_of.as_slice() {
        [] => true,
        [Schema::Reference(_)] => only_relabels(&composed.meta),
        _ => false,
    }
}

fn only_relabels(meta: &SchemaMeta) -> bool {
    let SchemaMeta {
        schema_type,
        title,
        description: _,
        nullable: _,
        read_only: _,
        write_only,
        deprecated,
        default,
        example,
        extensions,
        extra,
    } = meta;
    schema_type.is_none()
        && title.is_none()
        && write_only.is_none()
        && deprecated.is_none()
        && default.is_none()
        && example.is_none()
        && extensions.is_empty()
        && extra.is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;
    use flatspec_spec_parser::parse_schema;
    use serde_json::json;

    fn schema(value: serde_json::Value) -> Schema {
        parse_schema(&value).unwrap()
    }

    #[test]
    fn classify_every_kind() {
        assert_eq!(classify(&Schema::reference("Pet")), Kind::Reference);
        assert_eq!(classify(&Schema::string()), Kind::Primitive);
        assert_eq!(classify(&Schema::Boolean(true)), Kind::Primitive);
        assert_eq!(classify(&schema(json!({"type": "object"}))), Kind::Object);
        assert_eq!(classify(&schema(json!({"type": "array", "items": {}}))), Kind::Array);
        assert_eq!(
            classify(&schema(json!({"additionalProperties": {"type": "string"}}))),
            Kind::Map
        );
        assert_eq!(classify(&schema(json!({"oneOf": [{}]}))), Kind::Composed);
    }

    #[test]
    fn objects_need_properties() {
        let with_props = schema(json!({"type": "object", "properties": {"a": {"type": "string"}}}));
        let arbitrary = schema(json!({"type": "object", "description": "anything"}));
        assert!(is_extractable(&with_props, Policy::default()));
        assert!(!is_extractable(&arbitrary, Policy::default()));
        assert!(is_member_extractable(&arbitrary, Policy::default()));
    }

    #[test]
    fn containers_are_never_extracted() {
        let array = schema(json!({
            "type": "array",
            "items": {"type": "object", "properties": {"a": {"type": "string"}}}
        }));
        let map = schema(json!({
            "type": "object",
            "additionalProperties": {"type": "object", "properties": {"a": {"type": "string"}}}
        }));
        assert!(!is_extractable(&array, Policy::default()));
        assert!(!is_extractable(&map, Policy::default()));
        assert!(!is_member_extractable(&array, Policy::default()));
    }

    #[test]
    fn single_reference_wrapper_is_trivial() {
        for wrapper in [
            json!({"allOf": [{"$ref": "#/components/schemas/NumberRange"}]}),
            json!({"allOf": [{"$ref": "#/components/schemas/NumberRange"}], "description": "d"}),
            json!({"allOf": [{"$ref": "#/components/schemas/NumberRange"}], "readOnly": true}),
            json!({"allOf": [{"$ref": "#/components/schemas/NumberRange"}], "nullable": true}),
        ] {
            assert!(!is_extractable(&schema(wrapper), Policy::default()));
        }
    }

    #[test]
    fn single_member_wrapper_with_more_is_extractable() {
        for wrapper in [
            json!({"allOf": [{"type": "object", "properties": {"street": {"type": "string"}}}]}),
            json!({"allOf": [{"type": "string"}]}),
            json!({"allOf": [{"$ref": "#/components/schemas/NumberRange"}], "title": "Range"}),
            json!({"allOf": [{"$ref": "#/components/schemas/NumberRange"}], "type": "object"}),
            json!({"allOf": [{"$ref": "#/components/schemas/NumberRange"}], "x-internal": true}),
            json!({"allOf": [{"$ref": "#/components/schemas/NumberRange"}], "minProperties": 1}),
            json!({"allOf": [{"$ref": "#/components/schemas/NumberRange"}], "required": ["min"]}),
        ] {
            assert!(
                is_extractable(&schema(wrapper.clone()), Policy::default()),
                "{wrapper}"
            );
        }
    }

    #[test]
    fn real_combinations_are_extractable() {
        let two_all_of = schema(json!({
            "allOf": [
                {"$ref": "#/components/schemas/A"},
                {"type": "object", "properties": {"b": {"type": "string"}}}
            ]
        }));
        let one_of = schema(json!({"oneOf": [{"$ref": "#/components/schemas/A"}]}));
        let all_of_with_props = schema(json!({
            "allOf": [{"$ref": "#/components/schemas/A"}],
            "properties": {"extra": {"type": "integer"}}
        }));
        assert!(is_extractable(&two_all_of, Policy::default()));
        assert!(is_extractable(&one_of, Policy::default()));
        assert!(is_extractable(&all_of_with_props, Policy::default()));
    }

    #[test]
    fn enums_depend_on_policy() {
        let status = schema(json!({"type": "string", "enum": ["open", "closed"]}));
        assert!(!is_extractable(&status, Policy::default()));
        assert!(is_extractable(&status, Policy::with_inline_enums(true)));
        assert!(!is_extractable(&Schema::string(), Policy::with_inline_enums(true)));
    }
}
