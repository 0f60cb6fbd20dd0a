//! SSA construction benchmarks
//!
//! - branch-heavy functions (phi synthesis)
//! - nested loops (incomplete phis on unsealed headers)
//! - class chains (deferred member builders, parent linking)
//! - many independent units (rayon)

use codegraph_ssa::config::BuildConfig;
use codegraph_ssa::features::syntax::parse_typescript;
use codegraph_ssa::{build_from_ast, build_from_source, build_units};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

// ============================================================================
// Source generators
// ============================================================================

fn generate_branches(count: usize) -> String {
    let mut src = String::from("let x = 0;\nlet y = 0;\n");
    for i in 0..count {
        src.push_str(&format!(
            "if (x > {i}) {{ x = x + {i}; }} else {{ y = y - {i}; x = {i}; }}\n"
        ));
    }
    src.push_str("export const total = x + y;\n");
    src
}

fn generate_loops(depth: usize) -> String {
    let mut src = String::from("let acc = 0;\n");
    for d in 0..depth {
        src.push_str(&format!("for (let i{d} = 0; i{d} < 10; i{d}++) {{\n"));
    }
    src.push_str("acc = acc + 1;\n");
    for _ in 0..depth {
        src.push_str("}\n");
    }
    src
}

fn generate_class_chain(length: usize) -> String {
    let mut src = String::from("class C0 { base = 0; m0() { return this.base; } }\n");
    for i in 1..length {
        let parent = i - 1;
        src.push_str(&format!(
            "class C{i} extends C{parent} {{ f{i} = {i}; m{i}() {{ return this.f{i}; }} }}\n"
        ));
    }
    src.push_str(&format!("const leaf = new C{}();\nleaf.m0();\n", length - 1));
    src
}

// ============================================================================
// Benchmarks
// ============================================================================

fn bench_branches(c: &mut Criterion) {
    let mut group = c.benchmark_group("branches");
    let config = BuildConfig::default();

    for size in [10, 100, 500] {
        let source = generate_branches(size);
        let parsed = match parse_typescript(&source) {
            Ok(parsed) => parsed,
            Err(_) => continue,
        };
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &parsed.program, |b, tree| {
            b.iter(|| black_box(build_from_ast(black_box(tree), &config)));
        });
    }

    group.finish();
}

fn bench_nested_loops(c: &mut Criterion) {
    let mut group = c.benchmark_group("nested_loops");
    let config = BuildConfig::default();

    for depth in [1, 4, 8] {
        let source = generate_loops(depth);
        group.bench_with_input(BenchmarkId::from_parameter(depth), &source, |b, src| {
            b.iter(|| black_box(build_from_source(black_box(src), &config)));
        });
    }

    group.finish();
}

fn bench_class_chain(c: &mut Criterion) {
    let mut group = c.benchmark_group("class_chain");
    let config = BuildConfig::default();

    for length in [5, 20, 60] {
        let source = generate_class_chain(length);
        group.throughput(Throughput::Elements(length as u64));
        group.bench_with_input(BenchmarkId::from_parameter(length), &source, |b, src| {
            b.iter(|| black_box(build_from_source(black_box(src), &config)));
        });
    }

    group.finish();
}

fn bench_parallel_units(c: &mut Criterion) {
    let config = BuildConfig::default();
    let units: Vec<(String, String)> = (0..64)
        .map(|i| (format!("unit{i}.ts"), generate_branches(50)))
        .collect();

    c.bench_function("parallel_units_64", |b| {
        b.iter(|| black_box(build_units(black_box(&units), &config)));
    });
}

criterion_group!(
    benches,
    bench_branches,
    bench_nested_loops,
    bench_class_chain,
    bench_parallel_units
);
criterion_main!(benches);
