//! Benchmark suites

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub mod lexer;
pub mod pipeline;

/// Deterministic synthetic Luau input. One block is a comment, a counting
/// loop and a guarded print, so every pass has something to chew on.
pub fn generate_script(blocks: usize) -> String {
    let mut rng = StdRng::seed_from_u64(42);
    let mut out = String::new();
    for i in 0..blocks {
        let bound: u32 = rng.gen_range(10..100);
        let threshold: u32 = rng.gen_range(50..5000);
        out.push_str(&format!("-- block {i}\n"));
        out.push_str(&format!("local total{i} = 0\n"));
        out.push_str(&format!("for step{i} = 1, {bound} do\n"));
        out.push_str(&format!("    total{i} = total{i} + step{i}\n"));
        out.push_str("end\n");
        out.push_str(&format!("if total{i} > {threshold} then\n"));
        out.push_str(&format!("    print(\"block {i} done\")\n"));
        out.push_str("end\n");
    }
    out
}
