//! Inert statement synthesis for dead branches and decoy blocks.
//!
//! Junk must be self-contained: fresh local names only, no reads of user
//! state, no string literals that the encryption pass would then bloat, and
//! nothing that blocks. The loop shape sleeps briefly so a decompiled decoy
//! still looks like scheduler-aware game code.

use rand::rngs::StdRng;
use rand::Rng;

use crate::sample;

const NAME_LEN: usize = 7;

/// One synthesized statement sequence, single line.
pub(crate) fn statement(rng: &mut StdRng) -> String {
    match rng.gen_range(0..3) {
        0 => counter_loop(rng),
        1 => table_churn(rng),
        _ => arithmetic_temp(rng),
    }
}

fn counter_loop(rng: &mut StdRng) -> String {
    let acc = sample::identifier(rng, NAME_LEN);
    let idx = sample::identifier(rng, NAME_LEN);
    let bound = rng.gen_range(2..=6);
    format!("local {acc}=0 for {idx}=1,{bound} do {acc}={acc}+{idx} task.wait(0.001) end")
}

fn table_churn(rng: &mut StdRng) -> String {
    let table = sample::identifier(rng, NAME_LEN);
    let value = rng.gen_range(1..=1_000);
    format!("local {table}={{}} {table}[1]={value} {table}[2]={table}[1]*2")
}

fn arithmetic_temp(rng: &mut StdRng) -> String {
    let name = sample::identifier(rng, NAME_LEN);
    let lhs = rng.gen_range(1..=500);
    let rhs = rng.gen_range(1..=500);
    let op = ["+", "-", "*"][rng.gen_range(0..3)];
    format!("local {name}={lhs}{op}{rhs}")
}
