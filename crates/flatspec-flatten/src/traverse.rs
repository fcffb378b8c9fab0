//! The traversal driver.
//!
//! Visits every schema-bearing location of a document in a fixed order:
//! path items (path parameters, then operations by method; per operation:
//! parameters, request body, responses, callbacks), then component request
//! bodies and responses, then the component schemas that existed before the
//! pass started.

use indexmap::IndexMap;

use flatspec_spec_parser::{
    AdditionalProperties, Components, Document, MediaType, Operation, Parameter, PathItem, RefOr,
    Reference, RequestBody, Response, Schema, SCHEMAS_PREFIX,
};
use flatspec_telemetry::{log_flatten_completed, log_flatten_started, log_unresolved_reference};

use crate::classify::{is_extractable, Policy};
use crate::error::FlattenError;
use crate::naming::{operation_base_name, path_base_name, Naming};
use crate::options::{FlattenConfig, InlineSchemaOptions};
use crate::registry::Registry;
use crate::report::FlattenReport;

const REQUEST_BODIES_PREFIX: &str = "#/components/requestBodies/";
const RESPONSES_PREFIX: &str = "#/components/responses/";

/// Request-body `$ref` chains longer than this are treated as unresolvable.
const MAX_REF_HOPS: usize = 32;

/// Media types whose bodies are treated like parameter lists.
const FORM_MEDIA_TYPES: &[&str] = &["application/x-www-form-urlencoded", "multipart/form-data"];

/// Flatten every inline composite schema of `doc` into `components.schemas`.
///
/// The document is rewritten in place; the report lists what was registered,
/// what was reused and which pointers could not be resolved.
pub fn flatten(doc: &mut Document, config: &FlattenConfig) -> Result<FlattenReport, FlattenError> {
    log_flatten_started!(
        paths = doc.paths.len(),
        schemas = doc.components.schemas.len()
    );

    let Document {
        paths, components, ..
    } = doc;
    let Components {
        schemas,
        request_bodies,
        responses,
        ..
    } = components;

    // Snapshot: schemas registered during the pass are recursed into when registered.
    let pre_existing: Vec<String> = schemas.keys().cloned().collect();

    let mut flattener = Flattener::new(schemas, request_bodies, responses, config);

    for (path, item) in paths.iter_mut() {
        flattener.visit_path_item(path, item)?;
    }
    flattener.visit_component_request_bodies()?;
    flattener.visit_component_responses()?;
    for name in &pre_existing {
        flattener.visit_component_schema(name)?;
    }

    let report = flattener.finish();
    log_flatten_completed!(
        registered = report.registered.len(),
        reused = report.reused.len(),
        unresolved = report.unresolved.len()
    );
    Ok(report)
}

/// State of one flattening pass.
pub(crate) struct Flattener<'a> {
    pub(crate) registry: Registry<'a>,
    request_bodies: &'a mut IndexMap<String, RefOr<RequestBody>>,
    responses: &'a mut IndexMap<String, RefOr<Response>>,
    pub(crate) naming: Naming<'a>,
    pub(crate) options: &'a InlineSchemaOptions,
    pub(crate) report: FlattenReport,
}

impl<'a> Flattener<'a> {
    fn new(
        schemas: &'a mut IndexMap<String, Schema>,
        request_bodies: &'a mut IndexMap<String, RefOr<RequestBody>>,
        responses: &'a mut IndexMap<String, RefOr<Response>>,
        config: &'a FlattenConfig,
    ) -> Self {
        Self {
            registry: Registry::new(schemas),
            request_bodies,
            responses,
            naming: Naming::new(&config.options, &config.name_mappings),
            options: &config.options,
            report: FlattenReport {
                generate_metadata: config.generate_metadata,
                ..FlattenReport::default()
            },
        }
    }

    fn finish(self) -> FlattenReport {
        self.report
    }

    fn enum_policy(&self) -> Policy {
        Policy::with_inline_enums(self.options.resolve_inline_enums)
    }

    // =========================================================================
    // Paths and operations
    // =========================================================================

    fn visit_path_item(&mut self, path: &str, item: &mut PathItem) -> Result<(), FlattenError> {
        let path_base = path_base_name(path);
        self.visit_parameters(&mut item.parameters, &path_base)?;

        for (method, op) in item.operations.iter_mut() {
            let base = operation_base_name(op.operation_id.as_deref(), path, *method);
            self.visit_operation(op, &base)?;
        }
        Ok(())
    }

    fn visit_operation(&mut self, op: &mut Operation, base: &str) -> Result<(), FlattenError> {
        self.visit_parameters(&mut op.parameters, base)?;

        match &mut op.request_body {
            Some(RefOr::Item(body)) => self.visit_request_body(body, base)?,
            Some(RefOr::Ref(reference)) => self.visit_request_body_ref(reference, base)?,
            None => {}
        }

        for (status, response) in op.responses.iter_mut() {
            match response {
                RefOr::Item(response) => {
                    let derived = self.naming.response(&format!("{base}_{status}"));
                    self.visit_response(response, &derived)?
                }
                RefOr::Ref(reference) => self.check_component_ref(reference, RESPONSES_PREFIX),
            }
        }

        for callback in op.callbacks.values_mut() {
            if let RefOr::Item(callback) = callback {
                for (expression, item) in callback.expressions.iter_mut() {
                    self.visit_path_item(expression, item)?;
                }
            }
        }
        Ok(())
    }

    fn visit_parameters(
        &mut self,
        parameters: &mut [RefOr<Parameter>],
        base: &str,
    ) -> Result<(), FlattenError> {
        let policy = self.enum_policy();
        for parameter in parameters.iter_mut() {
            // Component parameters are not flattened in place.
            let RefOr::Item(parameter) = parameter else {
                continue;
            };
            let derived = self.naming.parameter(base, &parameter.name);
            if let Some(schema) = &mut parameter.schema {
                self.visit_slot(schema, &derived, policy)?;
            }
            if let Some(content) = &mut parameter.content {
                for media in content.values_mut() {
                    self.visit_media(media, &derived, policy)?;
                }
            }
        }
        Ok(())
    }

    fn visit_request_body(&mut self, body: &mut RequestBody, base: &str) -> Result<(), FlattenError> {
        let derived = self.naming.request(base);
        if let Some(content) = &mut body.content {
            for (media_type, media) in content.iter_mut() {
                let form = FORM_MEDIA_TYPES
                    .iter()
                    .any(|f| media_type.eq_ignore_ascii_case(f));
                let policy = Policy::with_inline_enums(form && self.options.resolve_inline_enums);
                self.visit_media(media, &derived, policy)?;
            }
        }
        Ok(())
    }

    /// Flatten the component body a `$ref` points to, named after the operation.
    fn visit_request_body_ref(&mut self, reference: &Reference, base: &str) -> Result<(), FlattenError> {
        let mut pointer = reference.pointer.clone();
        for _ in 0..MAX_REF_HOPS {
            let target = pointer
                .strip_prefix(REQUEST_BODIES_PREFIX)
                .and_then(|name| self.request_bodies.get(name).map(|b| (name.to_string(), b)));
            match target {
                Some((name, RefOr::Item(body))) => {
                    let mut body = body.clone();
                    self.visit_request_body(&mut body, base)?;
                    self.request_bodies.insert(name, RefOr::Item(body));
                    return Ok(());
                }
                Some((_, RefOr::Ref(next))) => pointer = next.pointer.clone(),
                None => break,
            }
        }
        self.record_unresolved(&reference.pointer);
        Ok(())
    }

    fn visit_response(&mut self, response: &mut Response, derived: &str) -> Result<(), FlattenError> {
        let policy = Policy::default();
        if let Some(content) = &mut response.content {
            for media in content.values_mut() {
                self.visit_media(media, derived, policy)?;
            }
        }
        Ok(())
    }

    fn visit_media(
        &mut self,
        media: &mut MediaType,
        derived: &str,
        policy: Policy,
    ) -> Result<(), FlattenError> {
        match &mut media.schema {
            Some(schema) => self.visit_slot(schema, derived, policy),
            None => Ok(()),
        }
    }

    // =========================================================================
    // Components
    // =========================================================================

    fn visit_component_request_bodies(&mut self) -> Result<(), FlattenError> {
        let names: Vec<String> = self.request_bodies.keys().cloned().collect();
        for name in names {
            match self.request_bodies.get(&name).cloned() {
                Some(RefOr::Item(mut body)) => {
                    self.visit_request_body(&mut body, &name)?;
                    self.request_bodies.insert(name, RefOr::Item(body));
                }
                Some(RefOr::Ref(reference)) => {
                    self.check_component_ref(&reference, REQUEST_BODIES_PREFIX)
                }
                None => {}
            }
        }
        Ok(())
    }

    fn visit_component_responses(&mut self) -> Result<(), FlattenError> {
        let names: Vec<String> = self.responses.keys().cloned().collect();
        for name in names {
            match self.responses.get(&name).cloned() {
                Some(RefOr::Item(mut response)) => {
                    let derived = self.naming.component_response();
                    self.visit_response(&mut response, &derived)?;
                    self.responses.insert(name, RefOr::Item(response));
                }
                Some(RefOr::Ref(reference)) => self.check_component_ref(&reference, RESPONSES_PREFIX),
                None => {}
            }
        }
        Ok(())
    }

    /// Flatten the inside of a component schema. The component itself stays where it is.
    fn visit_component_schema(&mut self, name: &str) -> Result<(), FlattenError> {
        self.visit_registered(name, Policy::default())
    }

    // =========================================================================
    // Schema slots
    // =========================================================================

    /// Visit one schema position: extract it, or walk into it in place.
    pub(crate) fn visit_slot(
        &mut self,
        slot: &mut Schema,
        derived: &str,
        policy: Policy,
    ) -> Result<(), FlattenError> {
        if is_extractable(slot, policy) {
            let node = std::mem::take(slot);
            *slot = self.extract(node, derived, policy)?;
            Ok(())
        } else {
            self.visit_children(slot, derived, policy)
        }
    }

    /// Visit the child slots of a node that stays where it is. `parent` names the node.
    pub(crate) fn visit_children(
        &mut self,
        node: &mut Schema,
        parent: &str,
        policy: Policy,
    ) -> Result<(), FlattenError> {
        match node {
            Schema::Reference(reference) => {
                self.check_schema_ref(reference);
                Ok(())
            }
            Schema::Primitive(_) | Schema::Boolean(_) => Ok(()),
            Schema::Object(obj) => {
                for (property, child) in obj.properties.iter_mut() {
                    let derived = self.naming.property(parent, property);
                    self.visit_slot(child, &derived, policy)?;
                }
                if let Some(AdditionalProperties::Schema(value)) = &mut obj.additional_properties {
                    let derived = self.naming.map_value(parent);
                    self.visit_slot(value, &derived, policy)?;
                }
                Ok(())
            }
            Schema::Array(array) => match &mut array.items {
                Some(items) => {
                    let derived = self.naming.array_item(parent);
                    self.visit_slot(items, &derived, policy)
                }
                None => Ok(()),
            },
            Schema::Map(map) => {
                let derived = self.naming.map_value(parent);
                self.visit_slot(&mut map.value, &derived, policy)
            }
            Schema::Composed(composed) => self.visit_composed(composed, parent, policy),
        }
    }

    /// Walk into a schema that lives in the registry under `name`.
    pub(crate) fn visit_registered(&mut self, name: &str, policy: Policy) -> Result<(), FlattenError> {
        let mut schema = self
            .registry
            .take(name)
            .ok_or_else(|| FlattenError::MissingRegistered(name.to_string()))?;
        let result = self.visit_children(&mut schema, name, policy);
        self.registry.restore(name, schema);
        result
    }

    // =========================================================================
    // References
    // =========================================================================

    fn check_schema_ref(&mut self, reference: &Reference) {
        if let Some(name) = reference.pointer.strip_prefix(SCHEMAS_PREFIX) {
            if !self.registry.contains(name) {
                self.record_unresolved(&reference.pointer);
            }
        }
    }

    fn check_component_ref(&mut self, reference: &Reference, prefix: &str) {
        let Some(name) = reference.pointer.strip_prefix(prefix) else {
            return;
        };
        let known = if prefix == REQUEST_BODIES_PREFIX {
            self.request_bodies.contains_key(name)
        } else {
            self.responses.contains_key(name)
        };
        if !known {
            self.record_unresolved(&reference.pointer);
        }
    }

    fn record_unresolved(&mut self, pointer: &str) {
        if self.report.record_unresolved(pointer) {
            log_unresolved_reference!(pointer = %pointer);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flatspec_spec_parser::{parse_spec, HttpMethod};

    fn flatten_yaml(yaml: &str, config: &FlattenConfig) -> (Document, FlattenReport) {
        let mut doc = parse_spec(yaml).unwrap();
        let report = flatten(&mut doc, config).unwrap();
        (doc, report)
    }

    fn body_schema<'d>(doc: &'d Document, path: &str, method: HttpMethod) -> &'d Schema {
        let op = &doc.paths[path].operations[&method];
        let body = op.request_body.as_ref().unwrap().as_item().unwrap();
        body.content.as_ref().unwrap().values().next().unwrap().schema.as_ref().unwrap()
    }

    #[test]
    fn registration_follows_visiting_order() {
        let yaml = r#"
openapi: "3.0.1"
paths:
  /b:
    post:
      operationId: second
      parameters:
        - name: filter
          in: query
          schema:
            type: object
            properties:
              q:
                type: string
      requestBody:
        content:
          application/json:
            schema:
              type: object
              properties:
                name:
                  type: string
      responses:
        "200":
          description: ok
          content:
            application/json:
              schema:
                type: object
                properties:
                  id:
                    type: integer
    get:
      operationId: first
      responses:
        "200":
          description: ok
          content:
            application/json:
              schema:
                type: object
                properties:
                  id:
                    type: string
components:
  requestBodies:
    Shared:
      content:
        application/json:
          schema:
            type: object
            properties:
              s:
                type: string
  responses:
    Problem:
      description: problem
      content:
        application/json:
          schema:
            type: object
            properties:
              detail:
                type: string
  schemas:
    Pet:
      type: object
      properties:
        owner:
          type: object
          properties:
            name:
              type: string
"#;
        let (_, report) = flatten_yaml(yaml, &FlattenConfig::default());
        assert_eq!(
            report.registered,
            [
                "first_200_response",
                "second_filter_parameter",
                "second_request",
                "second_200_response",
                "Shared_request",
                "inline_object",
                "Pet_owner",
            ]
        );
    }

    #[test]
    fn operations_without_id_use_path_and_method() {
        let yaml = r#"
openapi: "3.0.1"
paths:
  /users/{id}/pets:
    put:
      requestBody:
        content:
          application/json:
            schema:
              type: object
              properties:
                name:
                  type: string
      responses: {}
"#;
        let (doc, report) = flatten_yaml(yaml, &FlattenConfig::default());
        assert_eq!(report.registered, ["users_id_pets_put_request"]);
        assert_eq!(
            body_schema(&doc, "/users/{id}/pets", HttpMethod::Put).ref_pointer(),
            Some("#/components/schemas/users_id_pets_put_request")
        );
    }

    #[test]
    fn body_reference_is_flattened_with_operation_name() {
        let yaml = r##"
openapi: "3.0.1"
paths:
  /subscribe:
    post:
      operationId: subscribe
      requestBody:
        $ref: "#/components/requestBodies/Subscription"
      responses: {}
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
        let (doc, report) = flatten_yaml(yaml, &FlattenConfig::default());
        assert_eq!(report.registered, ["subscribe_request"]);

        let body = doc.components.request_bodies["Subscription"].as_item().unwrap();
        let schema = body.content.as_ref().unwrap()["application/json"]
            .schema
            .as_ref()
            .unwrap();
        assert_eq!(
            schema.ref_pointer(),
            Some("#/components/schemas/subscribe_request")
        );
    }

    #[test]
    fn dangling_references_are_reported_not_fatal() {
        let yaml = r##"
openapi: "3.0.1"
paths:
  /broken:
    post:
      operationId: broken
      requestBody:
        $ref: "#/components/requestBodies/Missing"
      responses:
        "200":
          description: ok
          content:
            application/json:
              schema:
                type: object
                properties:
                  pet:
                    $ref: "#/components/schemas/Gone"
        "404":
          $ref: "#/components/responses/NotFound"
"##;
        let (_, report) = flatten_yaml(yaml, &FlattenConfig::default());
        assert_eq!(report.registered, ["broken_200_response"]);
        assert_eq!(
            report.unresolved,
            [
                "#/components/requestBodies/Missing",
                "#/components/schemas/Gone",
                "#/components/responses/NotFound",
            ]
        );
    }

    #[test]
    fn component_aliases_resolve_against_components() {
        let yaml = r##"
openapi: "3.0.1"
paths: {}
components:
  requestBodies:
    Alias:
      $ref: "#/components/requestBodies/Real"
    Real:
      content:
        application/json:
          schema:
            type: object
            properties:
              id:
                type: string
  responses:
    Gone:
      $ref: "#/components/responses/Nowhere"
"##;
        let (_, report) = flatten_yaml(yaml, &FlattenConfig::default());
        assert_eq!(report.registered, ["Real_request"]);
        assert_eq!(report.unresolved, ["#/components/responses/Nowhere"]);
    }

    #[test]
    fn responses_without_content_are_skipped() {
        let yaml = r#"
openapi: "3.0.1"
paths:
  /ping:
    get:
      operationId: ping
      responses:
        "204":
          description: no content
"#;
        let (_, report) = flatten_yaml(yaml, &FlattenConfig::default());
        assert!(report.is_noop());
        assert!(report.unresolved.is_empty());
    }

    #[test]
    fn generate_metadata_is_forwarded() {
        let config = FlattenConfig::default().with_generate_metadata(true);
        let (_, report) = flatten_yaml("openapi: \"3.0.1\"\npaths: {}\n", &config);
        assert!(report.generate_metadata);
    }
}
