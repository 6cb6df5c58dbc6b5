//! Control-flow flattening.
//!
//! The whole unit is moved into a dispatch loop driven by a mutable state
//! variable. The real body becomes one dispatch arm among sampled decoys;
//! its transition subtracts the block's own id, driving the state to zero,
//! which ends the loop after exactly one iteration. Decoy arms transition
//! the same way but their guard can never be entered: the state variable
//! only ever holds the real id or zero.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::Rng;

use crate::junk;
use crate::passes::{Pass, PassContext};
use crate::sample;

const STATE_ID_MIN: u32 = 100_000;
const STATE_ID_MAX: u32 = 999_999;
const STATE_NAME_LEN: usize = 6;

/// One arm of the dispatch ladder.
#[derive(Debug, Clone)]
pub(crate) struct DispatchBlock {
    pub state_id: u32,
    pub body: String,
    pub is_real: bool,
}

/// Build the shuffled arm list: the real body plus `decoys` junk arms, all
/// with distinct fresh state ids.
pub(crate) fn dispatch_blocks(
    body: String,
    decoys: usize,
    rng: &mut StdRng,
) -> Vec<DispatchBlock> {
    let mut ids: Vec<u32> = Vec::with_capacity(decoys + 1);
    while ids.len() < decoys + 1 {
        let id = rng.gen_range(STATE_ID_MIN..=STATE_ID_MAX);
        if !ids.contains(&id) {
            ids.push(id);
        }
    }

    let mut blocks = Vec::with_capacity(decoys + 1);
    blocks.push(DispatchBlock {
        state_id: ids[0],
        body,
        is_real: true,
    });
    for &id in &ids[1..] {
        blocks.push(DispatchBlock {
            state_id: id,
            body: junk::statement(rng),
            is_real: false,
        });
    }
    blocks.shuffle(rng);
    blocks
}

pub(crate) struct ControlFlowFlatten;

impl Pass for ControlFlowFlatten {
    fn name(&self) -> &'static str {
        "flatten-control-flow"
    }

    fn enabled(&self, config: &crate::config::ObfuscatorConfig) -> bool {
        config.passes.flatten_control_flow
    }

    fn apply(&self, source: String, cx: &mut PassContext<'_>) -> String {
        let body = source.trim();
        if body.is_empty() {
            return source;
        }

        let state = sample::identifier(cx.rng, STATE_NAME_LEN);
        let blocks = dispatch_blocks(body.to_string(), cx.config.decoy_blocks, cx.rng);
        let real = blocks
            .iter()
            .find(|b| b.is_real)
            .map(|b| b.state_id)
            .unwrap_or(0);
        tracing::debug!(
            arms = blocks.len(),
            decoys = blocks.iter().filter(|b| !b.is_real).count(),
            "flattening unit"
        );

        let mut out = String::with_capacity(source.len() + 256);
        out.push_str(&format!("local {state}={real}\n"));
        out.push_str(&format!("while {state}~=0 do\n"));
        for (index, block) in blocks.iter().enumerate() {
            let keyword = if index == 0 { "if" } else { "elseif" };
            out.push_str(&format!("{keyword} {state}=={} then\n", block.state_id));
            out.push_str(&block.body);
            out.push('\n');
            out.push_str(&format!("{state}={state}+(0-{})\n", block.state_id));
        }
        out.push_str("end\ntask.wait(0.01)\nend\n");
        cx.stats.units_flattened += 1;
        out
    }
}
