use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Prefix of every pointer into the component schema registry.
pub const SCHEMAS_PREFIX: &str = "#/components/schemas/";

/// Ordered `x-*` vendor extensions.
pub type Extensions = IndexMap<String, Value>;

/// A parsed OpenAPI 3.x document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Document {
    /// The `openapi` version string (e.g. "3.0.3").
    pub openapi: String,
    /// Path items, in document order.
    pub paths: IndexMap<String, PathItem>,
    /// Reusable components.
    pub components: Components,
    /// Remaining root members (`info`, `servers`, `tags`, ...).
    pub extra: IndexMap<String, Value>,
}

/// The `components` registry.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Components {
    pub schemas: IndexMap<String, Schema>,
    pub request_bodies: IndexMap<String, RefOr<RequestBody>>,
    pub responses: IndexMap<String, RefOr<Response>>,
    /// Component categories the model does not interpret (parameters, headers, ...).
    pub extra: IndexMap<String, Value>,
}

/// HTTP methods recognized in path items, in visiting order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HttpMethod {
    Get,
    Put,
    Post,
    Delete,
    Options,
    Head,
    Patch,
    Trace,
}

impl HttpMethod {
    /// All methods, in the order operations are visited and written.
    pub const ALL: [HttpMethod; 8] = [
        HttpMethod::Get,
        HttpMethod::Put,
        HttpMethod::Post,
        HttpMethod::Delete,
        HttpMethod::Options,
        HttpMethod::Head,
        HttpMethod::Patch,
        HttpMethod::Trace,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "get",
            HttpMethod::Put => "put",
            HttpMethod::Post => "post",
            HttpMethod::Delete => "delete",
            HttpMethod::Options => "options",
            HttpMethod::Head => "head",
            HttpMethod::Patch => "patch",
            HttpMethod::Trace => "trace",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        HttpMethod::ALL.into_iter().find(|m| m.as_str() == s)
    }
}

impl std::fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Either a `$ref` to a component or the item itself.
#[derive(Debug, Clone, PartialEq)]
pub enum RefOr<T> {
    Ref(Reference),
    Item(T),
}

impl<T> RefOr<T> {
    /// The inline item, if this is not a reference.
    pub fn as_item(&self) -> Option<&T> {
        match self {
            RefOr::Item(item) => Some(item),
            RefOr::Ref(_) => None,
        }
    }

    pub fn as_item_mut(&mut self) -> Option<&mut T> {
        match self {
            RefOr::Item(item) => Some(item),
            RefOr::Ref(_) => None,
        }
    }
}

/// A `$ref` pointer plus whatever members sit next to it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Reference {
    /// The pointer string, kept verbatim (e.g. `#/components/schemas/User`).
    pub pointer: String,
    /// Sibling members (`description`, `x-*` extensions, ...).
    pub siblings: IndexMap<String, Value>,
}

impl Reference {
    pub fn new(pointer: impl Into<String>) -> Self {
        Self {
            pointer: pointer.into(),
            siblings: IndexMap::new(),
        }
    }

    /// The last segment of a local `#/components/<category>/<name>` pointer.
    pub fn target_name(&self) -> Option<&str> {
        ref_name(&self.pointer)
    }
}

/// Build the pointer for a named component schema.
pub fn schema_ref(name: &str) -> String {
    format!("{SCHEMAS_PREFIX}{name}")
}

/// Extract the component name from a local `#/components/<category>/<name>` pointer.
///
/// Returns `None` for external or non-component pointers.
pub fn ref_name(pointer: &str) -> Option<&str> {
    let rest = pointer.strip_prefix("#/components/")?;
    let (_category, name) = rest.split_once('/')?;
    if name.is_empty() || name.contains('/') {
        return None;
    }
    Some(name)
}

/// A path item: path-level parameters plus one operation per method.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PathItem {
    pub parameters: Vec<RefOr<Parameter>>,
    pub operations: std::collections::BTreeMap<HttpMethod, Operation>,
    /// Members the model does not interpret (`summary`, `servers`, `$ref`, ...).
    pub extra: IndexMap<String, Value>,
}

/// A single API operation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Operation {
    /// The OpenAPI operationId, if present.
    pub operation_id: Option<String>,
    pub parameters: Vec<RefOr<Parameter>>,
    pub request_body: Option<RefOr<RequestBody>>,
    /// Responses keyed by status code, in document order.
    pub responses: IndexMap<String, RefOr<Response>>,
    /// Callbacks keyed by name.
    pub callbacks: IndexMap<String, RefOr<Callback>>,
    pub extra: IndexMap<String, Value>,
}

/// A callback: runtime expression → path item.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Callback {
    pub expressions: IndexMap<String, PathItem>,
}

/// An operation or path-level parameter.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Parameter {
    pub name: String,
    /// The `in` member (path, query, header, cookie).
    pub location: String,
    pub schema: Option<Schema>,
    pub content: Option<IndexMap<String, MediaType>>,
    pub extra: IndexMap<String, Value>,
}

/// A request body definition.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestBody {
    pub content: Option<IndexMap<String, MediaType>>,
    /// `required`, `description`, extensions, ...
    pub extra: IndexMap<String, Value>,
}

/// A response definition.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Response {
    pub content: Option<IndexMap<String, MediaType>>,
    pub extra: IndexMap<String, Value>,
}

/// A media type entry of a content map.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MediaType {
    pub schema: Option<Schema>,
    pub extra: IndexMap<String, Value>,
}

/// A schema node.
///
/// The variant is decided once when the document is read; every consumer
/// dispatches on it with an exhaustive `match`.
#[derive(Debug, Clone, PartialEq)]
pub enum Schema {
    /// A `$ref` to another schema.
    Reference(Reference),
    /// An object, with or without declared properties.
    Object(ObjectSchema),
    /// An array with a single `items` child.
    Array(ArraySchema),
    /// An object whose only shape is its additional-properties value schema.
    Map(MapSchema),
    /// An `allOf` / `anyOf` / `oneOf` combination.
    Composed(ComposedSchema),
    /// A scalar leaf (string, integer, number, boolean, binary or untyped).
    Primitive(PrimitiveSchema),
    /// A JSON Schema boolean (`true` accepts anything, `false` nothing).
    Boolean(bool),
}

impl Default for Schema {
    fn default() -> Self {
        Schema::Primitive(PrimitiveSchema::default())
    }
}

impl Schema {
    /// Build a reference to the named component schema.
    pub fn reference(name: &str) -> Self {
        Schema::Reference(Reference::new(schema_ref(name)))
    }

    /// A `type: string` leaf.
    pub fn string() -> Self {
        Schema::Primitive(PrimitiveSchema::typed("string"))
    }

    /// A `type: integer` leaf.
    pub fn integer() -> Self {
        Schema::Primitive(PrimitiveSchema::typed("integer"))
    }

    pub fn as_reference(&self) -> Option<&Reference> {
        match self {
            Schema::Reference(r) => Some(r),
            _ => None,
        }
    }

    pub fn is_reference(&self) -> bool {
        matches!(self, Schema::Reference(_))
    }

    /// Shared metadata, absent for references and boolean schemas.
    pub fn meta(&self) -> Option<&SchemaMeta> {
        match self {
            Schema::Object(o) => Some(&o.meta),
            Schema::Array(a) => Some(&a.meta),
            Schema::Map(m) => Some(&m.meta),
            Schema::Composed(c) => Some(&c.meta),
            Schema::Primitive(p) => Some(&p.meta),
            Schema::Reference(_) | Schema::Boolean(_) => None,
        }
    }

    pub fn meta_mut(&mut self) -> Option<&mut SchemaMeta> {
        match self {
            Schema::Object(o) => Some(&mut o.meta),
            Schema::Array(a) => Some(&mut a.meta),
            Schema::Map(m) => Some(&mut m.meta),
            Schema::Composed(c) => Some(&mut c.meta),
            Schema::Primitive(p) => Some(&mut p.meta),
            Schema::Reference(_) | Schema::Boolean(_) => None,
        }
    }

    pub fn title(&self) -> Option<&str> {
        self.meta().and_then(|m| m.title.as_deref())
    }

    /// Properties of an object or composed schema.
    pub fn properties(&self) -> Option<&IndexMap<String, Schema>> {
        match self {
            Schema::Object(o) => Some(&o.properties),
            Schema::Composed(c) => Some(&c.properties),
            _ => None,
        }
    }

    pub fn property(&self, name: &str) -> Option<&Schema> {
        self.properties().and_then(|p| p.get(name))
    }

    /// The pointer of a reference schema.
    pub fn ref_pointer(&self) -> Option<&str> {
        self.as_reference().map(|r| r.pointer.as_str())
    }
}

/// Metadata shared by every non-reference schema kind.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SchemaMeta {
    /// The declared `type`, if any.
    pub schema_type: Option<SchemaType>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub nullable: Option<bool>,
    pub read_only: Option<bool>,
    pub write_only: Option<bool>,
    pub deprecated: Option<bool>,
    pub default: Option<Value>,
    pub example: Option<Value>,
    /// `x-*` vendor extensions.
    pub extensions: Extensions,
    /// Keywords the model does not interpret (validation keywords, `xml`, ...).
    pub extra: IndexMap<String, Value>,
}

/// Schema type can be a single type or an array of types (3.1 nullable).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaType {
    Single(String),
    Multiple(Vec<String>),
}

impl SchemaType {
    /// Whether `name` is one of the declared types.
    pub fn includes(&self, name: &str) -> bool {
        match self {
            SchemaType::Single(t) => t == name,
            SchemaType::Multiple(types) => types.iter().any(|t| t == name),
        }
    }
}

/// An object schema.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObjectSchema {
    pub properties: IndexMap<String, Schema>,
    pub required: Vec<String>,
    pub additional_properties: Option<AdditionalProperties>,
    pub discriminator: Option<Discriminator>,
    pub meta: SchemaMeta,
}

/// Additional properties can be a boolean or a schema.
#[derive(Debug, Clone, PartialEq)]
pub enum AdditionalProperties {
    Bool(bool),
    Schema(Box<Schema>),
}

/// Discriminator for polymorphic schemas.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Discriminator {
    /// The property name that contains the discriminator value.
    pub property_name: String,
    /// Discriminator values → schema pointers.
    pub mapping: IndexMap<String, String>,
    pub extra: IndexMap<String, Value>,
}

/// An array schema.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ArraySchema {
    pub items: Option<Box<Schema>>,
    pub meta: SchemaMeta,
}

/// An object whose only shape is its additional-properties schema.
#[derive(Debug, Clone, PartialEq)]
pub struct MapSchema {
    pub value: Box<Schema>,
    pub meta: SchemaMeta,
}

/// An `allOf` / `anyOf` / `oneOf` combination.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ComposedSchema {
    pub all_of: Vec<Schema>,
    pub any_of: Vec<Schema>,
    pub one_of: Vec<Schema>,
    /// Properties declared next to the combination keywords.
    pub properties: IndexMap<String, Schema>,
    pub required: Vec<String>,
    pub discriminator: Option<Discriminator>,
    pub meta: SchemaMeta,
}

/// A scalar leaf.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PrimitiveSchema {
    pub format: Option<String>,
    pub enum_values: Vec<Value>,
    pub meta: SchemaMeta,
}

impl PrimitiveSchema {
    /// A leaf of the given `type`.
    pub fn typed(schema_type: &str) -> Self {
        Self {
            meta: SchemaMeta {
                schema_type: Some(SchemaType::Single(schema_type.to_string())),
                ..SchemaMeta::default()
            },
            ..Self::default()
        }
    }
}
