//! Lexer benchmarks using Criterion

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use moonveil_core::{lex, render};

fn generate_script(blocks: usize) -> String {
    let mut out = String::new();
    for i in 0..blocks {
        out.push_str(&format!("local value{i} = {}\n", i * 7 + 1));
        out.push_str(&format!("print(\"value\", value{i})\n"));
    }
    out
}

fn lexer_benchmarks(c: &mut Criterion) {
    let mut group = c.benchmark_group("lexer");

    let source = generate_script(500);
    group.throughput(Throughput::Bytes(source.len() as u64));
    group.bench_function("lex_large_script", |b| b.iter(|| black_box(lex(&source))));

    let tokens = lex(&source);
    group.bench_function("render_token_stream", |b| b.iter(|| black_box(render(&tokens))));

    group.finish();
}

criterion_group!(benches, lexer_benchmarks);
criterion_main!(benches);
