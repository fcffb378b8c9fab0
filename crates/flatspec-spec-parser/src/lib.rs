//! OpenAPI 3.x document model, reader and writer.
//!
//! Reads YAML/JSON documents into a typed graph where every schema node is a
//! closed variant (reference, object, array, map, composed, primitive).
//! Members the model does not interpret are carried through untouched so the
//! document can be written back without loss.

pub mod error;
pub mod model;
pub mod parser;
pub mod writer;

pub use error::ParseError;
pub use model::{
    ref_name, schema_ref, AdditionalProperties, ArraySchema, Callback, Components,
    ComposedSchema, Discriminator, Document, Extensions, HttpMethod, MapSchema, MediaType,
    ObjectSchema, Operation, Parameter, PathItem, PrimitiveSchema, RefOr, Reference, RequestBody,
    Response, Schema, SchemaMeta, SchemaType, SCHEMAS_PREFIX,
};
pub use parser::{parse_schema, parse_spec, parse_spec_file};
pub use writer::{document_to_value, schema_to_value, write_spec, SpecFormat};
