//! Criterion benchmarks for the binding generator.
//!
//! Run with:
//! ```bash
//! cargo bench --package devtools-codegen --bench codegen_bench
//! ```

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use devtools_codegen::{generate, GeneratorOptions};
use devtools_core::naming::{domain_to_attr_name, rust_ident};
use devtools_core::Schema;

/// Builds a synthetic schema with `domains` domains of 20 commands each.
fn synthetic_schema(domains: usize) -> Schema {
    let mut text = String::from(r#"{"version":{"major":"1","minor":"3"},"domains":["#);
    for d in 0..domains {
        if d > 0 {
            text.push(',');
        }
        text.push_str(&format!(r#"{{"domain":"Domain{d}","commands":["#));
        for c in 0..20 {
            if c > 0 {
                text.push(',');
            }
            text.push_str(&format!(
                r#"{{"name":"command{c}","description":"Command {c}.","parameters":[
                    {{"name":"objectId","type":"string"}},
                    {{"name":"depth","type":"integer","optional":true}},
                    {{"name":"pierce","type":"boolean","optional":true}}
                ]}}"#
            ));
        }
        text.push_str("]}");
    }
    text.push_str("]}");
    Schema::from_json_str(&text).unwrap_or_else(|e| panic!("synthetic schema: {e}"))
}

fn bench_generate(c: &mut Criterion) {
    let mut group = c.benchmark_group("generate");
    for domains in [1usize, 10, 50] {
        let schema = synthetic_schema(domains);
        let options = GeneratorOptions::default();
        group.bench_with_input(BenchmarkId::from_parameter(domains), &schema, |b, s| {
            b.iter(|| generate(black_box(s), &options))
        });
    }
    group.finish();
}

fn bench_naming(c: &mut Criterion) {
    let names = [
        "CSS",
        "DOMDebugger",
        "IndexedDB",
        "Page",
        "ServiceWorker",
        "HeadlessExperimental",
    ];
    c.bench_function("domain_to_attr_name", |b| {
        b.iter(|| {
            for name in names {
                black_box(domain_to_attr_name(black_box(name)));
            }
        })
    });
    c.bench_function("rust_ident", |b| {
        b.iter(|| black_box(rust_ident(black_box("setDOMStorageItem"))))
    });
}

criterion_group!(benches, bench_generate, bench_naming);
criterion_main!(benches);
