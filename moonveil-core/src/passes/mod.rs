//! Source-to-source transform passes.
//!
//! Each pass consumes the full script text and produces the next version of
//! it. Passes never fail: anything a pass cannot prove safe to rewrite is
//! emitted unchanged, and the reason is logged at debug level.

pub(crate) mod booleans;
pub(crate) mod comments;
pub(crate) mod flatten;
pub(crate) mod globals;
pub(crate) mod inject;
pub(crate) mod invert;
pub(crate) mod numbers;
pub(crate) mod strings;

use rand::rngs::StdRng;

use crate::config::ObfuscatorConfig;
use crate::pipeline::ObfuscationStats;

/// Shared state threaded through a run: the caller's config, the run's
/// seeded random stream, and the counters for the final report.
pub(crate) struct PassContext<'a> {
    pub config: &'a ObfuscatorConfig,
    pub rng: &'a mut StdRng,
    pub stats: &'a mut ObfuscationStats,
}

pub(crate) trait Pass {
    fn name(&self) -> &'static str;
    fn enabled(&self, config: &ObfuscatorConfig) -> bool;
    fn apply(&self, source: String, cx: &mut PassContext<'_>) -> String;
}
