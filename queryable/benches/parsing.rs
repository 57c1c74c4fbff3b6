//! Benchmarks for query string parsing and SQL rendering.
//!
//! Run with: cargo bench -p queryable

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use queryable::{
    AllowedFieldSet, QueryParser, log, sql::postgres, to_snake_case, tokenize, url_decode,
};
use std::hint::black_box;

fn parser() -> QueryParser {
    QueryParser::new(AllowedFieldSet::new().with_fields([
        "name",
        "age",
        "status",
        "created_at",
        "deleted_at",
        "order_by",
    ]))
}

// =============================================================================
// Tokenizer Benchmarks
// =============================================================================

fn bench_tokenize(c: &mut Criterion) {
    let mut group = c.benchmark_group("tokenize");

    let fragments = [
        ("simple", "age=30"),
        ("two_char_op", "age>=30"),
        ("list", "status!~banned,deleted,suspended"),
        ("malformed", "no_operator_here"),
    ];

    for (name, fragment) in fragments {
        group.bench_with_input(BenchmarkId::new("fragment", name), fragment, |b, s| {
            b.iter(|| tokenize(black_box(s)));
        });
    }

    group.finish();
}

fn bench_snake_case(c: &mut Criterion) {
    let mut group = c.benchmark_group("snake_case");

    let keys = [
        ("already", "created_at"),
        ("camel", "createdAt"),
        ("acronym", "HTTPStatusCode"),
    ];

    for (name, key) in keys {
        group.bench_with_input(BenchmarkId::new("key", name), key, |b, s| {
            b.iter(|| to_snake_case(black_box(s)));
        });
    }

    group.finish();
}

// =============================================================================
// Parser Benchmarks
// =============================================================================

fn bench_parse(c: &mut Criterion) {
    log::set_enabled(false);
    let parser = parser();
    let mut group = c.benchmark_group("parse");

    let queries = [
        ("single", "age>=18".to_string()),
        (
            "mixed",
            "name=*son&age<65&status~active,pending&deletedAt=null&order_by=createdAt,desc"
                .to_string(),
        ),
        ("unauthorized", "password=x&token=y&secret=z".to_string()),
        (
            "many_fragments",
            (0..50).map(|i| format!("age>{i}")).collect::<Vec<_>>().join("&"),
        ),
    ];

    for (name, query) in &queries {
        group.bench_with_input(BenchmarkId::new("query", name), query, |b, q| {
            b.iter(|| parser.parse(black_box(q)));
        });
    }

    group.finish();
}

fn bench_encoded(c: &mut Criterion) {
    log::set_enabled(false);
    let parser = parser();
    let raw = "name=%2Ajohn%2A&age%3E%3D18&status~a%2Cb%2Cc&order_by=name%2Cdesc";

    c.bench_function("url_decode", |b| {
        b.iter(|| url_decode(black_box(raw), 65_536));
    });
    c.bench_function("parse_encoded", |b| {
        b.iter(|| parser.parse_encoded(black_box(Some(raw))));
    });
}

fn bench_to_sql(c: &mut Criterion) {
    log::set_enabled(false);
    let parser = parser();
    let result = parser.parse("name=*son&age<65&status~active,pending&order_by=created_at,desc");

    c.bench_function("apply_to_postgres", |b| {
        b.iter(|| black_box(&result).apply_to(postgres("users")).build());
    });
}

criterion_group!(
    benches,
    bench_tokenize,
    bench_snake_case,
    bench_parse,
    bench_encoded,
    bench_to_sql
);
criterion_main!(benches);
