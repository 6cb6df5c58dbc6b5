//! Lexer benchmarks

use crate::{Bench, Measurement};
use moonveil_core::{lex, render};

use super::generate_script;

pub fn run_all() -> Vec<Measurement> {
    vec![
        bench_lex_small_script(),
        bench_lex_large_script(),
        bench_render_tokens(),
    ]
}

fn bench_lex_small_script() -> Measurement {
    let source = generate_script(20);
    Bench::new("lexer", 200).measure_bytes(
        "lex small script (20 blocks)",
        source.len() as u64,
        || {
            std::hint::black_box(lex(&source));
        },
    )
}

fn bench_lex_large_script() -> Measurement {
    let source = generate_script(500);
    Bench::new("lexer", 20).measure_bytes(
        "lex large script (500 blocks)",
        source.len() as u64,
        || {
            std::hint::black_box(lex(&source));
        },
    )
}

fn bench_render_tokens() -> Measurement {
    let tokens = lex(&generate_script(100));
    Bench::new("lexer", 200).measure("render token stream (100 blocks)", || {
        std::hint::black_box(render(&tokens));
    })
}
