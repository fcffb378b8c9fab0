//! Inline schema flattening for OpenAPI 3.x documents.
//!
//! Every composite schema written inline (request and response bodies,
//! parameters, properties, array items, map values, any-of / one-of
//! alternatives) is moved into `components.schemas` under a deterministic
//! name and replaced by a `$ref`. Structurally identical extractions that
//! share a base name are registered once.
//!
//! # Example
//!
//! ```ignore
//! use flatspec_flatten::{flatten, FlattenConfig};
//! use flatspec_spec_parser::parse_spec;
//!
//! let mut doc = parse_spec(&std::fs::read_to_string("api.yaml")?)?;
//! let report = flatten(&mut doc, &FlattenConfig::default())?;
//! println!("registered {} schemas", report.registered.len());
//! ```

pub mod classify;
pub mod compose;
pub mod error;
mod extract;
pub mod manifest;
pub mod naming;
pub mod options;
pub mod registry;
pub mod report;
mod traverse;
pub mod verify;

pub use classify::{
    classify, is_extractable, is_member_extractable, is_trivial_composed, Kind, Policy,
};
pub use compose::DISCRIMINATOR_VALUE_EXTENSION;
pub use error::FlattenError;
pub use manifest::FlattenManifest;
pub use naming::{operation_base_name, path_base_name, sanitize_name, Naming};
pub use options::{
    FlattenConfig, InlineSchemaOptions, ARRAY_ITEM_SUFFIX, MAP_ITEM_SUFFIX,
    REFACTOR_ALLOF_INLINE_SCHEMAS, RESOLVE_INLINE_ENUMS, SKIP_SCHEMA_REUSE,
};
pub use report::FlattenReport;
pub use traverse::flatten;
pub use verify::{find_dangling_references, find_inline_composites, resolve_schema};
