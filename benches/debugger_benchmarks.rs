//! Debugger Benchmarks
//!
//! Measures each stage of a debug session against the in-memory oracle:
//!
//! - **Front end**: lexing and parsing queries of growing size
//! - **Extraction**: walking the AST for names, conditions and patterns
//! - **Suggestions**: fuzzy matching against large schemas
//! - **Sessions**: full debug runs against graphs of growing size
//!
//! ```bash
//! cargo bench
//! cargo bench sessions
//! ```

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use cypher_debugger::debugger::{extract, fuzzy};
use cypher_debugger::{Debugger, InMemoryGraph, parse, tokenize};

const QUERIES: &[(&str, &str)] = &[
    ("minimal", "MATCH (n) RETURN n"),
    (
        "typo",
        "MATCH (p:Persn)-[:ACTED_IM]->(m:Movie) RETURN m.titel",
    ),
    (
        "conditions",
        "MATCH (p:Person)-[:ACTED_IN]->(m:Movie) WHERE p.born > 1960 AND m.year = '1999' RETURN p.name",
    ),
    (
        "long_path",
        "MATCH (a:Person)-[:KNOWS]->(b:Person)-[:WORKS_AT]->(c:Company)<-[:OWNS]-(d:Person) RETURN a, d",
    ),
];

/// Persons acting in movies, with movie-to-person edges, plus unrelated studios.
fn graph_of(size: usize) -> InMemoryGraph {
    let mut graph = InMemoryGraph::new();
    let mut people = Vec::with_capacity(size);
    for i in 0..size {
        people.push(graph.add_node(
            &["Person"],
            [("name", format!("person {i}").into()), ("born", (1940 + (i % 60) as i64).into())],
        ));
    }
    for i in 0..size / 4 {
        let movie = graph.add_node(
            &["Movie"],
            [("title", format!("movie {i}").into()), ("year", "1999".into())],
        );
        for person in people.iter().skip(i * 4).take(4) {
            graph.add_relationship(movie, "ACTED_IN", *person);
        }
    }
    graph.add_node(&["Studio"], [("name", "studio".into())]);
    graph
}

// ============================================================================
// Front End
// ============================================================================

fn bench_front_end(c: &mut Criterion) {
    let mut group = c.benchmark_group("front_end");

    for (name, query) in QUERIES {
        group.throughput(Throughput::Bytes(query.len() as u64));
        group.bench_with_input(BenchmarkId::new("lex", name), query, |b, q| {
            b.iter(|| tokenize(black_box(q)));
        });
        group.bench_with_input(BenchmarkId::new("parse", name), query, |b, q| {
            b.iter(|| parse(black_box(q)));
        });
    }

    group.finish();
}

fn bench_wide_where(c: &mut Criterion) {
    let mut group = c.benchmark_group("wide_where");

    for width in [10, 50, 200] {
        let conditions: Vec<String> = (0..width).map(|i| format!("n.p{i} > {i}")).collect();
        let query = format!("MATCH (n:Node) WHERE {} RETURN n", conditions.join(" AND "));
        let program = parse(&query).unwrap();

        group.bench_with_input(BenchmarkId::new("parse", width), &query, |b, q| {
            b.iter(|| parse(black_box(q)));
        });
        group.bench_with_input(BenchmarkId::new("extract", width), &program, |b, p| {
            b.iter(|| extract(black_box(p)));
        });
    }

    group.finish();
}

// ============================================================================
// Suggestions
// ============================================================================

fn bench_suggestions(c: &mut Criterion) {
    let mut group = c.benchmark_group("suggestions");

    for size in [10, 100, 1000] {
        let names: Vec<String> = (0..size).map(|i| format!("PropertyKey{i:04}")).collect();
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::new("near_miss", size), &names, |b, names| {
            b.iter(|| fuzzy::suggest(black_box("PropertyKye0500"), names.iter().map(String::as_str)));
        });
        group.bench_with_input(BenchmarkId::new("no_match", size), &names, |b, names| {
            b.iter(|| fuzzy::suggest(black_box("zzz"), names.iter().map(String::as_str)));
        });
    }

    group.finish();
}

// ============================================================================
// Sessions
// ============================================================================

fn bench_sessions(c: &mut Criterion) {
    let mut group = c.benchmark_group("sessions");
    let debugger = Debugger::new();

    for size in [100, 1_000, 10_000] {
        let mut graph = graph_of(size);
        for (name, query) in QUERIES {
            group.bench_function(BenchmarkId::new(*name, size), |b| {
                b.iter(|| debugger.debug(black_box(query), &mut graph));
            });
        }
    }

    group.finish();
}

// ============================================================================
// Criterion Configuration
// ============================================================================

criterion_group!(
    benches,
    bench_front_end,
    bench_wide_where,
    bench_suggestions,
    bench_sessions,
);

criterion_main!(benches);
