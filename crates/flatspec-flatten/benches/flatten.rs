//! Flattening benchmarks.
//!
//! Measures parsing plus a full flattening pass over generated OpenAPI
//! documents with varying numbers of operations. Every operation carries an
//! inline parameter object, a nested request body and an array response.
//!
//! Run with: cargo bench -p flatspec-flatten --bench flatten

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use flatspec_flatten::{flatten, FlattenConfig};
use flatspec_spec_parser::parse_spec;

/// Generate an OpenAPI 3.0 spec YAML with N operations full of inline schemas.
fn generate_spec(operation_count: usize) -> String {
    let mut yaml = String::from(
        r#"openapi: "3.0.3"
info:
  title: Benchmark API
  version: "1.0.0"
paths:
"#,
    );

    for i in 0..operation_count {
        let resource = format!("resource{}", i);
        yaml.push_str(&format!(
            r#"  /{resource}/{{id}}:
    post:
      operationId: update_{resource}
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
                address:
                  type: object
                  properties:
                    street:
                      type: string
                    city:
                      type: string
                tags:
                  type: array
                  items:
                    type: object
                    properties:
                      label:
                        type: string
      responses:
        "200":
          description: OK
          content:
            application/json:
              schema:
                type: array
                items:
                  oneOf:
                    - type: object
                      properties:
                        id:
                          type: string
                    - type: object
                      properties:
                        code:
                          type: integer
"#,
            resource = resource,
        ));
    }

    yaml
}

fn bench_flatten(c: &mut Criterion) {
    let mut group = c.benchmark_group("flatten");
    let config = FlattenConfig::default();

    for op_count in [10, 50, 100] {
        let spec_yaml = generate_spec(op_count);

        group.bench_with_input(
            BenchmarkId::new("parse_and_flatten", format!("{}_ops", op_count)),
            &spec_yaml,
            |b, spec_yaml| {
                b.iter(|| {
                    let mut doc = parse_spec(black_box(spec_yaml)).unwrap();
                    black_box(flatten(&mut doc, &config).unwrap());
                });
            },
        );

        // Setup parses once; only the pass is measured.
        let parsed = parse_spec(&spec_yaml).unwrap();
        group.bench_with_input(
            BenchmarkId::new("flatten_only", format!("{}_ops", op_count)),
            &parsed,
            |b, parsed| {
                b.iter_batched(
                    || parsed.clone(),
                    |mut doc| black_box(flatten(&mut doc, &config).unwrap()),
                    criterion::BatchSize::SmallInput,
                );
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_flatten);
criterion_main!(benches);
