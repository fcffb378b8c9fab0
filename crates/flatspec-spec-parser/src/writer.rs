use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::ParseError;
use crate::model::{
    AdditionalProperties, Callback, Components, Discriminator, Document, MediaType, Operation,
    Parameter, PathItem, RefOr, Reference, RequestBody, Response, Schema, SchemaMeta, SchemaType,
};

/// Serialization format of a written document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpecFormat {
    #[default]
    Yaml,
    Json,
}

impl SpecFormat {
    /// Pick the format from a file extension (`.json` → JSON, anything else → YAML).
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => SpecFormat::Json,
            _ => SpecFormat::Yaml,
        }
    }
}

impl std::str::FromStr for SpecFormat {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "yaml" | "yml" => Ok(SpecFormat::Yaml),
            "json" => Ok(SpecFormat::Json),
            other => Err(ParseError::WriteError(format!(
                "unknown output format '{}' (expected yaml or json)",
                other
            ))),
        }
    }
}

/// Serialize a document as YAML or pretty-printed JSON.
pub fn write_spec(doc: &Document, format: SpecFormat) -> Result<String, ParseError> {
    let value = document_to_value(doc);
    match format {
        SpecFormat::Yaml => {
            serde_yaml::to_string(&value).map_err(|e| ParseError::WriteError(e.to_string()))
        }
        SpecFormat::Json => serde_json::to_string_pretty(&value)
            .map(|mut s| {
                s.push('\n');
                s
            })
            .map_err(|e| ParseError::WriteError(e.to_string())),
    }
}

/// Convert a document back into a JSON value, root members first.
pub fn document_to_value(doc: &Document) -> Value {
    let mut root = Map::new();
    root.insert("openapi".into(), Value::String(doc.openapi.clone()));
    extend(&mut root, &doc.extra);

    let paths = doc
        .paths
        .iter()
        .map(|(path, item)| (path.clone(), path_item_to_value(item)))
        .collect();
    root.insert("paths".into(), Value::Object(paths));

    if let Some(components) = components_to_value(&doc.components) {
        root.insert("components".into(), components);
    }
    Value::Object(root)
}

/// Convert a single schema node back into its JSON form.
pub fn schema_to_value(schema: &Schema) -> Value {
    match schema {
        Schema::Reference(r) => reference_to_value(r),
        Schema::Boolean(b) => Value::Bool(*b),
        Schema::Object(obj) => {
            let mut out = Map::new();
            write_meta_head(&mut out, &obj.meta, None);
            if !obj.required.is_empty() {
                out.insert("required".into(), strings(&obj.required));
            }
            if !obj.properties.is_empty() {
                out.insert("properties".into(), schemas_map(&obj.properties));
            }
            match &obj.additional_properties {
                Some(AdditionalProperties::Bool(b)) => {
                    out.insert("additionalProperties".into(), Value::Bool(*b));
                }
                Some(AdditionalProperties::Schema(s)) => {
                    out.insert("additionalProperties".into(), schema_to_value(s));
                }
                None => {}
            }
            if let Some(d) = &obj.discriminator {
                out.insert("discriminator".into(), discriminator_to_value(d));
            }
            write_meta_tail(&mut out, &obj.meta);
            Value::Object(out)
        }
        Schema::Array(arr) => {
            let mut out = Map::new();
            write_meta_head(&mut out, &arr.meta, None);
            if let Some(items) = &arr.items {
                out.insert("items".into(), schema_to_value(items));
            }
            write_meta_tail(&mut out, &arr.meta);
            Value::Object(out)
        }
        Schema::Map(map) => {
            let mut out = Map::new();
            write_meta_head(&mut out, &map.meta, None);
            out.insert("additionalProperties".into(), schema_to_value(&map.value));
            write_meta_tail(&mut out, &map.meta);
            Value::Object(out)
        }
        Schema::Composed(c) => {
            let mut out = Map::new();
            write_meta_head(&mut out, &c.meta, None);
            if !c.required.is_empty() {
                out.insert("required".into(), strings(&c.required));
            }
            if !c.properties.is_empty() {
                out.insert("properties".into(), schemas_map(&c.properties));
            }
            for (keyword, members) in [("allOf", &c.all_of), ("anyOf", &c.any_of), ("oneOf", &c.one_of)] {
                if !members.is_empty() {
                    out.insert(
                        keyword.into(),
                        Value::Array(members.iter().map(schema_to_value).collect()),
                    );
                }
            }
            if let Some(d) = &c.discriminator {
                out.insert("discriminator".into(), discriminator_to_value(d));
            }
            write_meta_tail(&mut out, &c.meta);
            Value::Object(out)
        }
        Schema::Primitive(p) => {
            let mut out = Map::new();
            write_meta_head(&mut out, &p.meta, p.format.as_deref());
            if !p.enum_values.is_empty() {
                out.insert("enum".into(), Value::Array(p.enum_values.clone()));
            }
            write_meta_tail(&mut out, &p.meta);
            Value::Object(out)
        }
    }
}

fn write_meta_head(out: &mut Map<String, Value>, meta: &SchemaMeta, format: Option<&str>) {
    match &meta.schema_type {
        Some(SchemaType::Single(t)) => {
            out.insert("type".into(), Value::String(t.clone()));
        }
        Some(SchemaType::Multiple(types)) => {
            out.insert("type".into(), strings(types));
        }
        None => {}
    }
    if let Some(format) = format {
        out.insert("format".into(), Value::String(format.to_string()));
    }
    if let Some(title) = &meta.title {
        out.insert("title".into(), Value::String(title.clone()));
    }
    if let Some(description) = &meta.description {
        out.insert("description".into(), Value::String(description.clone()));
    }
}

fn write_meta_tail(out: &mut Map<String, Value>, meta: &SchemaMeta) {
    let flags = [
        ("nullable", meta.nullable),
        ("readOnly", meta.read_only),
        ("writeOnly", meta.write_only),
        ("deprecated", meta.deprecated),
    ];
    for (key, flag) in flags {
        if let Some(flag) = flag {
            out.insert(key.into(), Value::Bool(flag));
        }
    }
    if let Some(default) = &meta.default {
        out.insert("default".into(), default.clone());
    }
    if let Some(example) = &meta.example {
        out.insert("example".into(), example.clone());
    }
    extend(out, &meta.extra);
    extend(out, &meta.extensions);
}

fn reference_to_value(r: &Reference) -> Value {
    let mut out = Map::new();
    out.insert("$ref".into(), Value::String(r.pointer.clone()));
    extend(&mut out, &r.siblings);
    Value::Object(out)
}

fn discriminator_to_value(d: &Discriminator) -> Value {
    let mut out = Map::new();
    out.insert("propertyName".into(), Value::String(d.property_name.clone()));
    if !d.mapping.is_empty() {
        let mapping = d
            .mapping
            .iter()
            .map(|(k, v)| (k.clone(), Value::String(v.clone())))
            .collect();
        out.insert("mapping".into(), Value::Object(mapping));
    }
    extend(&mut out, &d.extra);
    Value::Object(out)
}

fn path_item_to_value(item: &PathItem) -> Value {
    let mut out = Map::new();
    extend(&mut out, &item.extra);
    if !item.parameters.is_empty() {
        out.insert("parameters".into(), parameters_to_value(&item.parameters));
    }
    for (method, op) in &item.operations {
        out.insert(method.as_str().into(), operation_to_value(op));
    }
    Value::Object(out)
}

fn operation_to_value(op: &Operation) -> Value {
    let mut out = Map::new();
    if let Some(id) = &op.operation_id {
        out.insert("operationId".into(), Value::String(id.clone()));
    }
    extend(&mut out, &op.extra);
    if !op.parameters.is_empty() {
        out.insert("parameters".into(), parameters_to_value(&op.parameters));
    }
    if let Some(body) = &op.request_body {
        out.insert("requestBody".into(), ref_or_to_value(body, request_body_to_value));
    }
    let responses = op
        .responses
        .iter()
        .map(|(status, r)| (status.clone(), ref_or_to_value(r, response_to_value)))
        .collect();
    out.insert("responses".into(), Value::Object(responses));
    if !op.callbacks.is_empty() {
        let callbacks = op
            .callbacks
            .iter()
            .map(|(name, cb)| (name.clone(), ref_or_to_value(cb, callback_to_value)))
            .collect();
        out.insert("callbacks".into(), Value::Object(callbacks));
    }
    Value::Object(out)
}

fn callback_to_value(cb: &Callback) -> Value {
    Value::Object(
        cb.expressions
            .iter()
            .map(|(expr, item)| (expr.clone(), path_item_to_value(item)))
            .collect(),
    )
}

fn parameters_to_value(params: &[RefOr<Parameter>]) -> Value {
    Value::Array(
        params
            .iter()
            .map(|p| ref_or_to_value(p, parameter_to_value))
            .collect(),
    )
}

fn parameter_to_value(p: &Parameter) -> Value {
    let mut out = Map::new();
    out.insert("name".into(), Value::String(p.name.clone()));
    out.insert("in".into(), Value::String(p.location.clone()));
    extend(&mut out, &p.extra);
    if let Some(schema) = &p.schema {
        out.insert("schema".into(), schema_to_value(schema));
    }
    if let Some(content) = &p.content {
        out.insert("content".into(), content_to_value(content));
    }
    Value::Object(out)
}

fn request_body_to_value(body: &RequestBody) -> Value {
    let mut out = Map::new();
    extend(&mut out, &body.extra);
    if let Some(content) = &body.content {
        out.insert("content".into(), content_to_value(content));
    }
    Value::Object(out)
}

fn response_to_value(response: &Response) -> Value {
    let mut out = Map::new();
    extend(&mut out, &response.extra);
    if let Some(content) = &response.content {
        out.insert("content".into(), content_to_value(content));
    }
    Value::Object(out)
}

fn content_to_value(content: &IndexMap<String, MediaType>) -> Value {
    Value::Object(
        content
            .iter()
            .map(|(media_type, media)| {
                let mut out = Map::new();
                if let Some(schema) = &media.schema {
                    out.insert("schema".into(), schema_to_value(schema));
                }
                extend(&mut out, &media.extra);
                (media_type.clone(), Value::Object(out))
            })
            .collect(),
    )
}

fn components_to_value(components: &Components) -> Option<Value> {
    let mut out = Map::new();
    if !components.schemas.is_empty() {
        out.insert("schemas".into(), schemas_map(&components.schemas));
    }
    if !components.responses.is_empty() {
        let responses = components
            .responses
            .iter()
            .map(|(name, r)| (name.clone(), ref_or_to_value(r, response_to_value)))
            .collect();
        out.insert("responses".into(), Value::Object(responses));
    }
    extend(&mut out, &components.extra);
    if !components.request_bodies.is_empty() {
        let bodies = components
            .request_bodies
            .iter()
            .map(|(name, b)| (name.clone(), ref_or_to_value(b, request_body_to_value)))
            .collect();
        out.insert("requestBodies".into(), Value::Object(bodies));
    }
    if out.is_empty() {
        None
    } else {
        Some(Value::Object(out))
    }
}

fn ref_or_to_value<T>(item: &RefOr<T>, convert: fn(&T) -> Value) -> Value {
    match item {
        RefOr::Ref(r) => reference_to_value(r),
        RefOr::Item(item) => convert(item),
    }
}

fn schemas_map(schemas: &IndexMap<String, Schema>) -> Value {
    Value::Object(
        schemas
            .iter()
            .map(|(name, schema)| (name.clone(), schema_to_value(schema)))
            .collect(),
    )
}

fn strings(values: &[String]) -> Value {
    Value::Array(values.iter().cloned().map(Value::String).collect())
}

fn extend(out: &mut Map<String, Value>, members: &IndexMap<String, Value>) {
    for (key, value) in members {
        out.insert(key.clone(), value.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{parse_schema, parse_spec};
    use serde_json::json;

    const PETSTORE: &str = r##"
openapi: "3.0.1"
info:
  title: Pets
  version: "1.0.0"
paths:
  /pets:
    get:
      operationId: listPets
      summary: List pets
      parameters:
        - name: limit
          in: query
          schema:
            type: integer
            format: int32
      responses:
        "200":
          description: A list of pets
          content:
            application/json:
              schema:
                type: array
                items:
                  $ref: "#/components/schemas/Pet"
components:
  schemas:
    Pet:
      type: object
      required:
        - id
      properties:
        id:
          type: integer
          format: int64
        tag:
          type: string
          nullable: true
      x-entity: pet
"##;

    #[test]
    fn rewritten_document_reads_back_identically() {
        let doc = parse_spec(PETSTORE).unwrap();
        let yaml = write_spec(&doc, SpecFormat::Yaml).unwrap();
        let reread = parse_spec(&yaml).unwrap();
        assert_eq!(doc, reread);

        let json = write_spec(&doc, SpecFormat::Json).unwrap();
        assert_eq!(doc, parse_spec(&json).unwrap());
    }

    #[test]
    fn root_member_order_is_openapi_info_paths_components() {
        let doc = parse_spec(PETSTORE).unwrap();
        let value = document_to_value(&doc);
        let keys: Vec<_> = value.as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys, ["openapi", "info", "paths", "components"]);
    }

    #[test]
    fn schema_values_keep_unknown_keywords_and_extensions() {
        let original = json!({
            "type": "string",
            "format": "email",
            "maxLength": 64,
            "x-order": 3
        });
        let schema = parse_schema(&original).unwrap();
        assert_eq!(schema_to_value(&schema), original);
    }

    #[test]
    fn map_schema_writes_additional_properties() {
        let original = json!({
            "type": "object",
            "additionalProperties": {"$ref": "#/components/schemas/Pet"}
        });
        let schema = parse_schema(&original).unwrap();
        assert!(matches!(schema, Schema::Map(_)));
        assert_eq!(schema_to_value(&schema), original);
    }

    #[test]
    fn empty_components_are_omitted() {
        let doc = parse_spec("openapi: \"3.0.0\"\npaths: {}\n").unwrap();
        let value = document_to_value(&doc);
        assert!(value.get("components").is_none());
    }

    #[test]
    fn format_from_path_and_name() {
        assert_eq!(SpecFormat::from_path(Path::new("out.json")), SpecFormat::Json);
        assert_eq!(SpecFormat::from_path(Path::new("out.yaml")), SpecFormat::Yaml);
        assert_eq!(SpecFormat::from_path(Path::new("out")), SpecFormat::Yaml);
        assert_eq!("JSON".parse::<SpecFormat>().unwrap(), SpecFormat::Json);
        assert!("toml".parse::<SpecFormat>().is_err());
    }
}
