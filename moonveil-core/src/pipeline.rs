//! Pass ordering and the public obfuscation entry point.
//!
//! The order is load-bearing and lives only here:
//!   1. comment stripping, so later passes never see comment text;
//!   2. conditional inversion, then predicate injection, both of which work
//!      line-by-line and need the original layout;
//!   3. control-flow flattening, which swallows the whole unit;
//!   4. boolean mangling, then the numeric sweep. Booleans synthesize
//!      integers and the flattener synthesizes state ids, so the sweep runs
//!      after both and splits everything in one pass;
//!   5. string encryption, then global virtualization. Both emit ciphertext
//!      and keys that nothing afterwards may rewrite.
//! The preamble is prepended after the last pass for the same reason: its
//! own literals must never be mangled or the decryptor breaks.

use std::path::Path;

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;

use crate::config::ObfuscatorConfig;
use crate::passes::{booleans, comments, flatten, globals, inject, invert, numbers, strings};
use crate::passes::{Pass, PassContext};
use crate::preamble;

/// Counters for one run, one per pass.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ObfuscationStats {
    pub comments_removed: usize,
    pub conditionals_inverted: usize,
    pub statements_wrapped: usize,
    pub units_flattened: usize,
    pub booleans_rewritten: usize,
    pub numbers_mangled: usize,
    pub strings_encrypted: usize,
    pub globals_virtualized: usize,
}

impl ObfuscationStats {
    pub fn total_transforms(&self) -> usize {
        self.comments_removed
            + self.conditionals_inverted
            + self.statements_wrapped
            + self.units_flattened
            + self.booleans_rewritten
            + self.numbers_mangled
            + self.strings_encrypted
            + self.globals_virtualized
    }
}

/// Transformed source plus the run's counters.
#[derive(Debug, Clone)]
pub struct ObfuscationResult {
    pub source: String,
    pub stats: ObfuscationStats,
}

pub struct Obfuscator {
    config: ObfuscatorConfig,
}

impl Obfuscator {
    pub fn new(config: ObfuscatorConfig) -> Self {
        Self { config }
    }

    pub fn with_defaults() -> Self {
        Self::new(ObfuscatorConfig::default())
    }

    /// Build an obfuscator from a `moonveil.toml` file.
    pub fn from_config_file(path: &Path) -> anyhow::Result<Self> {
        Ok(Self::new(ObfuscatorConfig::load(path)?))
    }

    pub fn config(&self) -> &ObfuscatorConfig {
        &self.config
    }

    /// Run every enabled pass, in order, over `source`.
    pub fn obfuscate(&self, source: &str) -> ObfuscationResult {
        let mut rng = match self.config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let mut stats = ObfuscationStats::default();
        let mut text = source.to_string();

        for pass in passes() {
            if !pass.enabled(&self.config) {
                tracing::debug!(pass = pass.name(), "pass disabled, skipping");
                continue;
            }
            let bytes_in = text.len();
            let mut cx = PassContext {
                config: &self.config,
                rng: &mut rng,
                stats: &mut stats,
            };
            text = pass.apply(text, &mut cx);
            tracing::debug!(
                pass = pass.name(),
                bytes_in,
                bytes_out = text.len(),
                "pass complete"
            );
        }

        // The body only calls into the preamble when one of these two ran.
        if self.config.passes.encrypt_strings || self.config.passes.virtualize_globals {
            text = format!("{}{}", preamble::render(), text);
        }

        tracing::info!(
            transforms = stats.total_transforms(),
            bytes = text.len(),
            "obfuscation complete"
        );
        ObfuscationResult {
            source: text,
            stats,
        }
    }
}

/// The fixed pass sequence. Disabled passes are filtered at run time so the
/// relative order can never vary.
fn passes() -> Vec<Box<dyn Pass>> {
    vec![
        Box::new(comments::CommentStrip),
        Box::new(invert::LogicInversion),
        Box::new(inject::PredicateInjection::new()),
        Box::new(flatten::ControlFlowFlatten),
        Box::new(booleans::BooleanMangle),
        Box::new(numbers::NumberMangle),
        Box::new(strings::StringEncrypt),
        Box::new(globals::GlobalVirtualize),
    ]
}
