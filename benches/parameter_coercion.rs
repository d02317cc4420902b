//! Benchmarks for parameter coercion
//!
//! This benchmark measures:
//! - Flat token pairing, dot-notation expansion and scalar coercion
//! - Flattening nested parameters back into query fields

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use c2client::params::{flatten, ListStyle, ParameterCoercer};

fn filter_tokens(filters: usize, values: usize) -> Vec<String> {
    let mut tokens = vec!["MaxResults".to_string(), "100".to_string()];
    for f in 1..=filters {
        tokens.push(format!("Filter.{}.Name", f));
        tokens.push(format!("tag:key-{}", f));
        for v in 1..=values {
            tokens.push(format!("Filter.{}.Value.{}", f, v));
            tokens.push(format!("value-{}-{}", f, v));
        }
    }
    tokens
}

fn bench_coerce_flat(c: &mut Criterion) {
    let coercer = ParameterCoercer::new();
    let mut group = c.benchmark_group("coerce_flat");
    for filters in [1usize, 10, 50] {
        let tokens = filter_tokens(filters, 5);
        group.throughput(Throughput::Elements(tokens.len() as u64 / 2));
        group.bench_with_input(BenchmarkId::from_parameter(filters), &tokens, |b, tokens| {
            b.iter(|| coercer.coerce_flat(black_box(tokens)).unwrap())
        });
    }
    group.finish();
}

fn bench_flatten(c: &mut Criterion) {
    let value = ParameterCoercer::new()
        .coerce_flat(&filter_tokens(50, 5))
        .unwrap();
    c.bench_function("flatten_indexed", |b| {
        b.iter(|| flatten(black_box(&value), ListStyle::Indexed))
    });
    c.bench_function("flatten_member", |b| {
        b.iter(|| flatten(black_box(&value), ListStyle::Member))
    });
}

criterion_group!(benches, bench_coerce_flat, bench_flatten);
criterion_main!(benches);
