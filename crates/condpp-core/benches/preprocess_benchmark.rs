use condpp_core::{predicate, Environment, Preprocessor};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

fn bench_env() -> Environment {
    Environment::from_pairs([("MODE", "release"), ("TARGET", "linux"), ("LEVEL", "3")])
}

/// `blocks` sibling if/elif/else chains, each with `depth` nested blocks
fn generate_source(blocks: usize, depth: usize) -> String {
    let mut source = String::new();
    for i in 0..blocks {
        source.push_str(&format!("const header{i} = {i};\n"));
        source.push_str("//#if MODE == \"debug\"\n");
        source.push_str(&format!("debugOnly({i});\n"));
        source.push_str("//#elif TARGET == \"linux\" && LEVEL >= 2\n");
        for d in 0..depth {
            source.push_str(&format!("//#if LEVEL > {d}\n"));
            source.push_str(&format!("level{d}({i});\n"));
        }
        for _ in 0..depth {
            source.push_str("//#endif\n");
        }
        source.push_str("//#else\n");
        source.push_str(&format!("fallback({i});\n"));
        source.push_str("//#endif\n");
    }
    source
}

fn benchmark_preprocess(c: &mut Criterion) {
    let preprocessor = Preprocessor::new(bench_env());
    let mut group = c.benchmark_group("preprocess");

    for blocks in [10, 100, 1000] {
        let source = generate_source(blocks, 4);
        group.throughput(Throughput::Bytes(source.len() as u64));
        group.bench_with_input(BenchmarkId::new("nested", blocks), &source, |b, source| {
            b.iter(|| preprocessor.preprocess(black_box(source)).unwrap())
        });
    }

    group.finish();
}

fn benchmark_plain_text(c: &mut Criterion) {
    let preprocessor = Preprocessor::new(bench_env());
    let source = "let x = compute();\n".repeat(10_000);

    c.bench_function("no_directives", |b| {
        b.iter(|| preprocessor.preprocess(black_box(&source)).unwrap())
    });
}

fn benchmark_predicate(c: &mut Criterion) {
    let env = bench_env();
    let mut group = c.benchmark_group("predicate");

    group.bench_function("literal", |b| {
        b.iter(|| predicate::evaluate(black_box("true"), &env).unwrap())
    });
    group.bench_function("compound", |b| {
        b.iter(|| {
            predicate::evaluate(
                black_box("(MODE == \"release\" || MODE === \"profile\") && !(LEVEL < 2)"),
                &env,
            )
            .unwrap()
        })
    });

    group.finish();
}

fn benchmark_source_map(c: &mut Criterion) {
    let preprocessor = Preprocessor::new(bench_env());
    let source = generate_source(100, 4);
    let out = preprocessor.preprocess(&source).unwrap();

    c.bench_function("source_map", |b| {
        b.iter(|| {
            out.source_map(black_box(&source), Some("out.js"), "in.js", false)
                .to_json()
                .unwrap()
        })
    });
}

criterion_group!(
    benches,
    benchmark_preprocess,
    benchmark_plain_text,
    benchmark_predicate,
    benchmark_source_map
);
criterion_main!(benches);
