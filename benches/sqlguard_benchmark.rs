//! SQL Guard Performance Benchmarks
//!
//! Measures normalization and skeleton comparison across the built-in attack
//! catalog and growing query sizes.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use zentinel_sqlguard::catalog::{DEFAULT_NORMAL_QUERY, DEFAULT_TEMPLATE};
use zentinel_sqlguard::{is_injection, normalize, AttackCatalog, QueryGuard};

/// Generate a query with `clauses` quoted and numeric predicates
fn generate_wide_query(clauses: usize) -> String {
    let mut query = String::from("SELECT * FROM events WHERE 1=1");
    for i in 0..clauses {
        query.push_str(&format!(" AND tag_{i}='value number {i}' AND score_{i}>={i}"));
    }
    query.push(';');
    query
}

/// Benchmark normalization of the sample queries
fn benchmark_normalize(c: &mut Criterion) {
    let mut group = c.benchmark_group("normalize");

    let mut payloads = vec![
        ("template".to_string(), DEFAULT_TEMPLATE.to_string()),
        ("normal".to_string(), DEFAULT_NORMAL_QUERY.to_string()),
    ];
    payloads.extend(
        AttackCatalog::default()
            .iter()
            .map(|case| (case.name.clone(), case.query.clone())),
    );

    for (name, query) in &payloads {
        group.throughput(Throughput::Bytes(query.len() as u64));
        group.bench_with_input(BenchmarkId::new("query", name), query, |b, input| {
            b.iter(|| normalize(black_box(input)))
        });
    }

    group.finish();
}

/// Benchmark the free comparator against the attack catalog
fn benchmark_is_injection(c: &mut Criterion) {
    let catalog = AttackCatalog::default();
    let mut group = c.benchmark_group("is_injection");

    group.bench_function("normal", |b| {
        b.iter(|| is_injection(black_box(DEFAULT_TEMPLATE), black_box(DEFAULT_NORMAL_QUERY)))
    });

    for case in &catalog {
        group.bench_with_input(BenchmarkId::new("attack", &case.name), &case.query, |b, input| {
            b.iter(|| is_injection(black_box(DEFAULT_TEMPLATE), black_box(input)))
        });
    }

    group.finish();
}

/// Benchmark a guard with a precomputed template skeleton
fn benchmark_guard(c: &mut Criterion) {
    let guard = QueryGuard::new(DEFAULT_TEMPLATE);
    let mut group = c.benchmark_group("guard");
    group.throughput(Throughput::Elements(1));

    group.bench_function("checks_per_sec", |b| {
        b.iter(|| guard.is_injection(black_box(DEFAULT_NORMAL_QUERY)))
    });

    group.finish();
}

/// Benchmark normalization with growing query width
fn benchmark_query_sizes(c: &mut Criterion) {
    let mut group = c.benchmark_group("query_sizes");

    for clauses in [1, 10, 100, 1000] {
        let query = generate_wide_query(clauses);

        group.throughput(Throughput::Bytes(query.len() as u64));
        group.bench_with_input(BenchmarkId::new("clauses", clauses), &query, |b, input| {
            b.iter(|| is_injection(black_box(input), black_box(input)))
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    benchmark_normalize,
    benchmark_is_injection,
    benchmark_guard,
    benchmark_query_sizes,
);

criterion_main!(benches);
