use std::collections::BTreeMap;

use indexmap::IndexMap;
use serde_json::Value;

use crate::error::ParseError;
use crate::model::{
    AdditionalProperties, ArraySchema, Callback, Components, ComposedSchema, Discriminator,
    Document, HttpMethod, MapSchema, MediaType, ObjectSchema, Operation, Parameter, PathItem,
    PrimitiveSchema, RefOr, Reference, RequestBody, Response, Schema, SchemaMeta, SchemaType,
};

/// Member maps are moved into an `IndexMap` so removals keep document order.
type Object = IndexMap<String, Value>;

fn object(map: serde_json::Map<String, Value>) -> Object {
    map.into_iter().collect()
}

/// Parse an OpenAPI 3.x document from a YAML/JSON string.
pub fn parse_spec(input: &str) -> Result<Document, ParseError> {
    // Parse YAML (also handles JSON since JSON is valid YAML)
    let root: Value =
        serde_yaml::from_str(input).map_err(|e| ParseError::ParseError(e.to_string()))?;

    let mut root = match root {
        Value::Object(obj) => object(obj),
        _ => return Err(ParseError::ParseError("spec root must be an object".into())),
    };

    let openapi = detect_version(&root)?;
    root.shift_remove("openapi");

    let paths = match root.shift_remove("paths") {
        Some(Value::Object(paths)) => parse_paths(object(paths))?,
        Some(Value::Null) | None => IndexMap::new(),
        Some(_) => return Err(ParseError::SchemaError("'paths' must be an object".into())),
    };

    let components = match root.shift_remove("components") {
        Some(Value::Object(components)) => parse_components(object(components))?,
        Some(Value::Null) | None => Components::default(),
        Some(_) => {
            return Err(ParseError::SchemaError(
                "'components' must be an object".into(),
            ))
        }
    };

    Ok(Document {
        openapi,
        paths,
        components,
        extra: root.into_iter().collect(),
    })
}

/// Parse a document from a file path.
pub fn parse_spec_file(path: &std::path::Path) -> Result<Document, ParseError> {
    let content = std::fs::read_to_string(path)?;
    parse_spec(&content)
}

/// Parse a single schema node.
///
/// The variant is chosen from the node's keywords: `$ref` wins, then any of
/// `allOf`/`anyOf`/`oneOf`, then array, then object/map, then primitive.
pub fn parse_schema(value: &Value) -> Result<Schema, ParseError> {
    match value {
        Value::Bool(b) => Ok(Schema::Boolean(*b)),
        Value::Object(obj) => parse_schema_object(object(obj.clone())),
        other => Err(ParseError::SchemaError(format!(
            "schema must be an object or boolean, found {}",
            value_kind(other)
        ))),
    }
}

/// Check the `openapi` member and return the version string.
fn detect_version(root: &Object) -> Result<String, ParseError> {
    let version = match root.get("openapi") {
        Some(Value::String(v)) => v.clone(),
        // `openapi: 3.0` without quotes reads as a number
        Some(Value::Number(n)) => n.to_string(),
        _ => return Err(ParseError::UnknownFormat),
    };
    if !version.starts_with("3.") {
        return Err(ParseError::SchemaError(format!(
            "unsupported OpenAPI version: {} (only 3.x supported)",
            version
        )));
    }
    Ok(version)
}

fn parse_paths(paths: Object) -> Result<IndexMap<String, PathItem>, ParseError> {
    let mut parsed = IndexMap::with_capacity(paths.len());
    for (path, item) in paths {
        let item = match item {
            Value::Object(obj) => parse_path_item(object(obj), &path)?,
            _ => {
                return Err(ParseError::SchemaError(format!(
                    "path item for '{}' must be an object",
                    path
                )))
            }
        };
        parsed.insert(path, item);
    }
    Ok(parsed)
}

fn parse_path_item(mut obj: Object, path: &str) -> Result<PathItem, ParseError> {
    let parameters = parse_parameters(obj.shift_remove("parameters"))?;

    let mut operations = BTreeMap::new();
    for method in HttpMethod::ALL {
        let Some(op_value) = obj.shift_remove(method.as_str()) else {
            continue;
        };
        let Value::Object(op_obj) = op_value else {
            return Err(ParseError::SchemaError(format!(
                "operation {} {} must be an object",
                method.as_str().to_uppercase(),
                path
            )));
        };
        operations.insert(method, parse_operation(object(op_obj))?);
    }

    Ok(PathItem {
        parameters,
        operations,
        extra: obj.into_iter().collect(),
    })
}

fn parse_operation(mut obj: Object) -> Result<Operation, ParseError> {
    let operation_id = match obj.shift_remove("operationId") {
        Some(Value::String(id)) => Some(id),
        _ => None,
    };

    let parameters = parse_parameters(obj.shift_remove("parameters"))?;

    let request_body = obj
        .shift_remove("requestBody")
        .map(|v| parse_ref_or(v, "requestBody", parse_request_body))
        .transpose()?;

    let mut responses = IndexMap::new();
    if let Some(Value::Object(entries)) = obj.shift_remove("responses") {
        for (status, response) in entries {
            responses.insert(status, parse_ref_or(response, "response", parse_response)?);
        }
    }

    let mut callbacks = IndexMap::new();
    if let Some(Value::Object(entries)) = obj.shift_remove("callbacks") {
        for (name, callback) in entries {
            callbacks.insert(name, parse_ref_or(callback, "callback", parse_callback)?);
        }
    }

    Ok(Operation {
        operation_id,
        parameters,
        request_body,
        responses,
        callbacks,
        extra: obj.into_iter().collect(),
    })
}

fn parse_callback(obj: Object) -> Result<Callback, ParseError> {
    let mut expressions = IndexMap::with_capacity(obj.len());
    for (expression, item) in obj {
        let item = match item {
            Value::Object(item) => parse_path_item(object(item), &expression)?,
            _ => {
                return Err(ParseError::SchemaError(format!(
                    "callback path item for '{}' must be an object",
                    expression
                )))
            }
        };
        expressions.insert(expression, item);
    }
    Ok(Callback { expressions })
}

/// Parse parameters from a path item or operation object.
fn parse_parameters(value: Option<Value>) -> Result<Vec<RefOr<Parameter>>, ParseError> {
    match value {
        Some(Value::Array(items)) => items
            .into_iter()
            .map(|item| parse_ref_or(item, "parameter", parse_parameter))
            .collect(),
        Some(Value::Null) | None => Ok(Vec::new()),
        Some(_) => Err(ParseError::SchemaError(
            "'parameters' must be an array".into(),
        )),
    }
}

fn parse_parameter(mut obj: Object) -> Result<Parameter, ParseError> {
    let name = take_string(&mut obj, "name").unwrap_or_default();
    let location = take_string(&mut obj, "in").unwrap_or_default();
    let schema = obj.shift_remove("schema").map(|s| parse_schema(&s)).transpose()?;
    let content = parse_content(obj.shift_remove("content"))?;

    Ok(Parameter {
        name,
        location,
        schema,
        content,
        extra: obj.into_iter().collect(),
    })
}

fn parse_request_body(mut obj: Object) -> Result<RequestBody, ParseError> {
    let content = parse_content(obj.shift_remove("content"))?;
    Ok(RequestBody {
        content,
        extra: obj.into_iter().collect(),
    })
}

fn parse_response(mut obj: Object) -> Result<Response, ParseError> {
    let content = parse_content(obj.shift_remove("content"))?;
    Ok(Response {
        content,
        extra: obj.into_iter().collect(),
    })
}

fn parse_content(value: Option<Value>) -> Result<Option<IndexMap<String, MediaType>>, ParseError> {
    let entries = match value {
        Some(Value::Object(entries)) => entries,
        Some(Value::Null) | None => return Ok(None),
        Some(_) => return Err(ParseError::SchemaError("'content' must be an object".into())),
    };

    let mut content = IndexMap::with_capacity(entries.len());
    for (media_type, media) in entries {
        let mut media_obj = match media {
            Value::Object(obj) => object(obj),
            Value::Null => Object::new(),
            _ => {
                return Err(ParseError::SchemaError(format!(
                    "media type '{}' must be an object",
                    media_type
                )))
            }
        };
        let schema = media_obj
            .shift_remove("schema")
            .map(|s| parse_schema(&s))
            .transpose()?;
        content.insert(
            media_type,
            MediaType {
                schema,
                extra: media_obj.into_iter().collect(),
            },
        );
    }
    Ok(Some(content))
}

fn parse_components(mut obj: Object) -> Result<Components, ParseError> {
    let mut components = Components::default();

    if let Some(Value::Object(schemas)) = obj.shift_remove("schemas") {
        for (name, schema) in schemas {
            let parsed = parse_schema(&schema).map_err(|e| match e {
                ParseError::SchemaError(msg) => {
                    ParseError::SchemaError(format!("components.schemas.{}: {}", name, msg))
                }
                other => other,
            })?;
            components.schemas.insert(name, parsed);
        }
    }

    if let Some(Value::Object(bodies)) = obj.shift_remove("requestBodies") {
        for (name, body) in bodies {
            let parsed = parse_ref_or(body, "requestBody", parse_request_body)?;
            components.request_bodies.insert(name, parsed);
        }
    }

    if let Some(Value::Object(responses)) = obj.shift_remove("responses") {
        for (name, response) in responses {
            let parsed = parse_ref_or(response, "response", parse_response)?;
            components.responses.insert(name, parsed);
        }
    }

    components.extra = obj.into_iter().collect();
    Ok(components)
}

/// Parse an object that may be a `$ref` instead of the item itself.
fn parse_ref_or<T>(
    value: Value,
    what: &str,
    parse: impl FnOnce(Object) -> Result<T, ParseError>,
) -> Result<RefOr<T>, ParseError> {
    let obj = match value {
        Value::Object(obj) => object(obj),
        other => {
            return Err(ParseError::SchemaError(format!(
                "{} must be an object, found {}",
                what,
                value_kind(&other)
            )))
        }
    };
    match take_reference(obj) {
        Ok(reference) => Ok(RefOr::Ref(reference)),
        Err(obj) => parse(obj).map(RefOr::Item),
    }
}

/// Split a `$ref` object into pointer and siblings, or hand the object back.
fn take_reference(mut obj: Object) -> Result<Reference, Object> {
    match obj.shift_remove("$ref") {
        Some(Value::String(pointer)) => Ok(Reference {
            pointer,
            siblings: obj.into_iter().collect(),
        }),
        Some(other) => {
            // Non-string `$ref` is not a reference; keep it as an ordinary member.
            obj.insert("$ref".into(), other);
            Err(obj)
        }
        None => Err(obj),
    }
}

fn parse_schema_object(obj: Object) -> Result<Schema, ParseError> {
    let mut obj = match take_reference(obj) {
        Ok(reference) => return Ok(Schema::Reference(reference)),
        Err(obj) => obj,
    };

    if ["allOf", "anyOf", "oneOf"].iter().any(|k| obj.contains_key(*k)) {
        let all_of = parse_schema_list(obj.shift_remove("allOf"), "allOf")?;
        let any_of = parse_schema_list(obj.shift_remove("anyOf"), "anyOf")?;
        let one_of = parse_schema_list(obj.shift_remove("oneOf"), "oneOf")?;
        let properties = parse_properties(obj.shift_remove("properties"))?;
        let required = take_string_list(&mut obj, "required");
        let discriminator = parse_discriminator(obj.shift_remove("discriminator"))?;
        let meta = take_meta(obj)?;
        return Ok(Schema::Composed(ComposedSchema {
            all_of,
            any_of,
            one_of,
            properties,
            required,
            discriminator,
            meta,
        }));
    }

    let declared = declared_type(&obj)?;
    let has_type = |name: &str| declared.as_ref().is_some_and(|t| t.includes(name));

    if has_type("array") || obj.contains_key("items") {
        let items = obj
            .shift_remove("items")
            .map(|v| parse_schema(&v).map(Box::new))
            .transpose()?;
        let meta = take_meta(obj)?;
        return Ok(Schema::Array(ArraySchema { items, meta }));
    }

    if has_type("object") || obj.contains_key("properties") || obj.contains_key("additionalProperties")
    {
        let properties = parse_properties(obj.shift_remove("properties"))?;
        let additional_properties = match obj.shift_remove("additionalProperties") {
            Some(Value::Bool(b)) => Some(AdditionalProperties::Bool(b)),
            Some(value @ Value::Object(_)) => Some(AdditionalProperties::Schema(Box::new(
                parse_schema(&value)?,
            ))),
            Some(Value::Null) | None => None,
            Some(other) => {
                return Err(ParseError::SchemaError(format!(
                    "additionalProperties must be a boolean or schema, found {}",
                    value_kind(&other)
                )))
            }
        };

        // A schema-valued additionalProperties with nothing else to describe is a map.
        let additional_properties = match additional_properties {
            Some(AdditionalProperties::Schema(value))
                if properties.is_empty() && !obj.contains_key("discriminator") =>
            {
                let meta = take_meta(obj)?;
                return Ok(Schema::Map(MapSchema { value, meta }));
            }
            other => other,
        };

        let required = take_string_list(&mut obj, "required");
        let discriminator = parse_discriminator(obj.shift_remove("discriminator"))?;
        let meta = take_meta(obj)?;
        return Ok(Schema::Object(ObjectSchema {
            properties,
            required,
            additional_properties,
            discriminator,
            meta,
        }));
    }

    let format = take_string(&mut obj, "format");
    let enum_values = match obj.shift_remove("enum") {
        Some(Value::Array(values)) => values,
        Some(other) => {
            return Err(ParseError::SchemaError(format!(
                "enum must be an array, found {}",
                value_kind(&other)
            )))
        }
        None => Vec::new(),
    };
    let meta = take_meta(obj)?;
    Ok(Schema::Primitive(PrimitiveSchema {
        format,
        enum_values,
        meta,
    }))
}

fn parse_schema_list(value: Option<Value>, keyword: &str) -> Result<Vec<Schema>, ParseError> {
    match value {
        Some(Value::Array(items)) => items.iter().map(parse_schema).collect(),
        Some(Value::Null) | None => Ok(Vec::new()),
        Some(other) => Err(ParseError::SchemaError(format!(
            "{} must be an array, found {}",
            keyword,
            value_kind(&other)
        ))),
    }
}

fn parse_properties(value: Option<Value>) -> Result<IndexMap<String, Schema>, ParseError> {
    match value {
        Some(Value::Object(props)) => {
            let mut parsed = IndexMap::with_capacity(props.len());
            for (name, schema) in props {
                let schema = parse_schema(&schema).map_err(|e| match e {
                    ParseError::SchemaError(msg) => {
                        ParseError::SchemaError(format!("property '{}': {}", name, msg))
                    }
                    other => other,
                })?;
                parsed.insert(name, schema);
            }
            Ok(parsed)
        }
        Some(Value::Null) | None => Ok(IndexMap::new()),
        Some(other) => Err(ParseError::SchemaError(format!(
            "properties must be an object, found {}",
            value_kind(&other)
        ))),
    }
}

fn parse_discriminator(value: Option<Value>) -> Result<Option<Discriminator>, ParseError> {
    let mut obj = match value {
        Some(Value::Object(obj)) => object(obj),
        Some(Value::Null) | None => return Ok(None),
        Some(other) => {
            return Err(ParseError::SchemaError(format!(
                "discriminator must be an object, found {}",
                value_kind(&other)
            )))
        }
    };

    let property_name = take_string(&mut obj, "propertyName").ok_or_else(|| {
        ParseError::SchemaError("discriminator is missing 'propertyName'".into())
    })?;

    let mapping = match obj.shift_remove("mapping") {
        Some(Value::Object(entries)) => entries
            .into_iter()
            .filter_map(|(k, v)| v.as_str().map(|s| (k, s.to_string())))
            .collect(),
        _ => IndexMap::new(),
    };

    Ok(Some(Discriminator {
        property_name,
        mapping,
        extra: obj.into_iter().collect(),
    }))
}

fn declared_type(obj: &Object) -> Result<Option<SchemaType>, ParseError> {
    match obj.get("type") {
        Some(Value::String(t)) => Ok(Some(SchemaType::Single(t.clone()))),
        Some(Value::Array(types)) => {
            let types = types
                .iter()
                .map(|t| {
                    t.as_str().map(str::to_string).ok_or_else(|| {
                        ParseError::SchemaError("type array must contain strings".into())
                    })
                })
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Some(SchemaType::Multiple(types)))
        }
        Some(Value::Null) | None => Ok(None),
        Some(other) => Err(ParseError::SchemaError(format!(
            "type must be a string or array, found {}",
            value_kind(other)
        ))),
    }
}

/// Consume the shared metadata keywords; whatever remains lands in `extra`.
fn take_meta(mut obj: Object) -> Result<SchemaMeta, ParseError> {
    let schema_type = declared_type(&obj)?;
    obj.shift_remove("type");

    let mut meta = SchemaMeta {
        schema_type,
        title: take_string(&mut obj, "title"),
        description: take_string(&mut obj, "description"),
        nullable: take_bool(&mut obj, "nullable"),
        read_only: take_bool(&mut obj, "readOnly"),
        write_only: take_bool(&mut obj, "writeOnly"),
        deprecated: take_bool(&mut obj, "deprecated"),
        default: obj.shift_remove("default"),
        example: obj.shift_remove("example"),
        ..SchemaMeta::default()
    };

    for (key, value) in obj {
        if key.starts_with("x-") {
            meta.extensions.insert(key, value);
        } else {
            meta.extra.insert(key, value);
        }
    }
    Ok(meta)
}

/// Remove a string member. Non-string values are left in place.
fn take_string(obj: &mut Object, key: &str) -> Option<String> {
    match obj.get(key) {
        Some(Value::String(_)) => match obj.shift_remove(key) {
            Some(Value::String(s)) => Some(s),
            _ => None,
        },
        _ => None,
    }
}

/// Remove a boolean member. Non-boolean values are left in place.
fn take_bool(obj: &mut Object, key: &str) -> Option<bool> {
    let b = obj.get(key)?.as_bool()?;
    obj.shift_remove(key);
    Some(b)
}

fn take_string_list(obj: &mut Object, key: &str) -> Vec<String> {
    match obj.get(key) {
        Some(Value::Array(items)) if items.iter().all(Value::is_string) => {}
        _ => return Vec::new(),
    }
    match obj.shift_remove(key) {
        Some(Value::Array(items)) => items
            .into_iter()
            .filter_map(|i| i.as_str().map(str::to_string))
            .collect(),
        _ => Vec::new(),
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn schema(value: Value) -> Schema {
        parse_schema(&value).unwrap()
    }

    #[test]
    fn parse_minimal_openapi() {
        let yaml = r#"
openapi: "3.0.1"
info:
  title: Test API
  version: "1.0.0"
paths:
  /health:
    get:
      operationId: getHealth
      responses:
        "200":
          description: OK
"#;
        let doc = parse_spec(yaml).unwrap();
        assert_eq!(doc.openapi, "3.0.1");
        assert!(doc.extra.contains_key("info"));
        assert_eq!(doc.paths.len(), 1);

        let item = &doc.paths["/health"];
        let op = &item.operations[&HttpMethod::Get];
        assert_eq!(op.operation_id.as_deref(), Some("getHealth"));
        let response = op.responses["200"].as_item().unwrap();
        assert!(response.content.is_none());
        assert_eq!(response.extra["description"], json!("OK"));
    }

    #[test]
    fn reject_swagger_2() {
        let yaml = r#"
swagger: "2.0"
info:
  title: Old API
  version: "1.0.0"
"#;
        assert!(matches!(parse_spec(yaml), Err(ParseError::UnknownFormat)));
    }

    #[test]
    fn reject_openapi_2_version_string() {
        let yaml = "openapi: \"2.0\"\npaths: {}\n";
        assert!(matches!(parse_spec(yaml), Err(ParseError::SchemaError(_))));
    }

    #[test]
    fn reject_malformed_yaml() {
        let result = parse_spec("openapi: [unclosed");
        assert!(matches!(result, Err(ParseError::ParseError(_))));
    }

    #[test]
    fn parse_json_input() {
        let json = r#"{"openapi": "3.1.0", "info": {"title": "J", "version": "1"}, "paths": {}}"#;
        let doc = parse_spec(json).unwrap();
        assert_eq!(doc.openapi, "3.1.0");
        assert!(doc.paths.is_empty());
    }

    #[test]
    fn classify_reference_keeps_siblings() {
        let parsed = schema(json!({
            "$ref": "#/components/schemas/User",
            "description": "the owner",
            "x-internal": true
        }));
        let Schema::Reference(r) = parsed else {
            panic!("expected reference");
        };
        assert_eq!(r.pointer, "#/components/schemas/User");
        assert_eq!(r.target_name(), Some("User"));
        assert_eq!(r.siblings["x-internal"], json!(true));
        assert_eq!(r.siblings.len(), 2);
    }

    #[test]
    fn classify_object_with_properties() {
        let parsed = schema(json!({
            "type": "object",
            "title": "Address",
            "required": ["street"],
            "properties": {
                "street": {"type": "string"},
                "zip": {"type": "string", "maxLength": 10}
            },
            "x-tag": "a"
        }));
        let Schema::Object(obj) = parsed else {
            panic!("expected object");
        };
        assert_eq!(obj.properties.len(), 2);
        assert_eq!(obj.required, ["street"]);
        assert_eq!(obj.meta.title.as_deref(), Some("Address"));
        assert_eq!(obj.meta.extensions["x-tag"], json!("a"));

        let Schema::Primitive(zip) = &obj.properties["zip"] else {
            panic!("expected primitive");
        };
        assert_eq!(zip.meta.extra["maxLength"], json!(10));
    }

    #[test]
    fn classify_object_without_properties_as_arbitrary_object() {
        let parsed = schema(json!({"type": "object", "description": "free form"}));
        let Schema::Object(obj) = parsed else {
            panic!("expected object");
        };
        assert!(obj.properties.is_empty());
        assert!(obj.additional_properties.is_none());
    }

    #[test]
    fn classify_additional_properties_only_as_map() {
        let parsed = schema(json!({
            "type": "object",
            "additionalProperties": {
                "type": "object",
                "properties": {"name": {"type": "string"}}
            }
        }));
        let Schema::Map(map) = parsed else {
            panic!("expected map");
        };
        assert!(matches!(*map.value, Schema::Object(_)));
    }

    #[test]
    fn additional_properties_true_stays_object() {
        let parsed = schema(json!({"type": "object", "additionalProperties": true}));
        let Schema::Object(obj) = parsed else {
            panic!("expected object");
        };
        assert_eq!(obj.additional_properties, Some(AdditionalProperties::Bool(true)));
    }

    #[test]
    fn classify_array_and_items() {
        let parsed = schema(json!({"type": "array", "items": {"type": "integer"}}));
        let Schema::Array(arr) = parsed else {
            panic!("expected array");
        };
        assert!(matches!(arr.items.as_deref(), Some(Schema::Primitive(_))));

        // `items` alone marks an array even without a type
        assert!(matches!(schema(json!({"items": {}})), Schema::Array(_)));
    }

    #[test]
    fn classify_composed_with_discriminator() {
        let parsed = schema(json!({
            "oneOf": [
                {"$ref": "#/components/schemas/Cat"},
                {"type": "object", "properties": {"bark": {"type": "boolean"}}}
            ],
            "discriminator": {
                "propertyName": "petType",
                "mapping": {"cat": "#/components/schemas/Cat"}
            }
        }));
        let Schema::Composed(composed) = parsed else {
            panic!("expected composed");
        };
        assert_eq!(composed.one_of.len(), 2);
        assert!(composed.all_of.is_empty());
        let discriminator = composed.discriminator.unwrap();
        assert_eq!(discriminator.property_name, "petType");
        assert_eq!(discriminator.mapping["cat"], "#/components/schemas/Cat");
    }

    #[test]
    fn classify_primitive_with_enum() {
        let parsed = schema(json!({"type": "string", "enum": ["a", "b"], "nullable": true}));
        let Schema::Primitive(p) = parsed else {
            panic!("expected primitive");
        };
        assert_eq!(p.enum_values, vec![json!("a"), json!("b")]);
        assert_eq!(p.meta.nullable, Some(true));
    }

    #[test]
    fn classify_boolean_schema() {
        assert_eq!(schema(json!(true)), Schema::Boolean(true));
    }

    #[test]
    fn reject_non_object_schema() {
        assert!(matches!(
            parse_schema(&json!("string")),
            Err(ParseError::SchemaError(_))
        ));
    }

    #[test]
    fn parse_request_body_ref_and_callbacks() {
        let yaml = r##"
openapi: "3.0.1"
paths:
  /subscribe:
    post:
      operationId: subscribe
      requestBody:
        $ref: "#/components/requestBodies/Subscription"
      responses:
        "201":
          description: created
      callbacks:
        onEvent:
          "{$request.body#/url}":
            post:
              operationId: webhookNotify
              requestBody:
                content:
                  application/json:
                    schema:
                      type: object
                      properties:
                        message:
                          type: string
              responses:
                "200":
                  description: ok
components:
  requestBodies:
    Subscription:
      content:
        application/json:
          schema:
            type: object
            properties:
              url:
                type: string
"##;
        let doc = parse_spec(yaml).unwrap();
        let op = &doc.paths["/subscribe"].operations[&HttpMethod::Post];
        let Some(RefOr::Ref(body_ref)) = &op.request_body else {
            panic!("expected body reference");
        };
        assert_eq!(body_ref.target_name(), Some("Subscription"));

        let callback = op.callbacks["onEvent"].as_item().unwrap();
        let hook = &callback.expressions["{$request.body#/url}"];
        let hook_op = &hook.operations[&HttpMethod::Post];
        assert_eq!(hook_op.operation_id.as_deref(), Some("webhookNotify"));

        assert!(doc.components.request_bodies.contains_key("Subscription"));
    }

    #[test]
    fn parse_parameters_path_and_operation_level() {
        let yaml = r#"
openapi: "3.0.1"
paths:
  /users/{id}:
    parameters:
      - name: id
        in: path
        required: true
        schema:
          type: integer
    get:
      parameters:
        - name: filter
          in: query
          schema:
            type: object
            properties:
              q:
                type: string
      responses: {}
"#;
        let doc = parse_spec(yaml).unwrap();
        let item = &doc.paths["/users/{id}"];
        assert_eq!(item.parameters.len(), 1);
        let op = &item.operations[&HttpMethod::Get];
        let param = op.parameters[0].as_item().unwrap();
        assert_eq!(param.name, "filter");
        assert_eq!(param.location, "query");
        assert!(matches!(param.schema, Some(Schema::Object(_))));
    }

    #[test]
    fn component_schema_errors_name_the_schema() {
        let yaml = r#"
openapi: "3.0.1"
paths: {}
components:
  schemas:
    Broken:
      type: object
      properties:
        id: 12
"#;
        let err = parse_spec(yaml).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("Broken"), "{message}");
        assert!(message.contains("id"), "{message}");
    }
}
