//! Boolean literal mangling.
//!
//! `true` and `false` become parenthesized logic-gate expressions over
//! freshly sampled integers. Runs on the token stream, so the words inside
//! strings and comments are never candidates. Must run before the numeric
//! sweep: the integers sampled here are themselves literals the sweep will
//! split.

use rand::rngs::StdRng;
use rand::Rng;

use crate::lexer::{self, Token, TokenKind};
use crate::passes::{Pass, PassContext};

pub(crate) struct BooleanMangle;

impl Pass for BooleanMangle {
    fn name(&self) -> &'static str {
        "mangle-booleans"
    }

    fn enabled(&self, config: &crate::config::ObfuscatorConfig) -> bool {
        config.passes.mangle_booleans
    }

    fn apply(&self, source: String, cx: &mut PassContext<'_>) -> String {
        let mut tokens = lexer::lex(&source);
        for token in &mut tokens {
            if token.kind != TokenKind::Identifier {
                continue;
            }
            let replacement = match token.text.as_str() {
                "true" => rewrite_true(cx.rng),
                "false" => rewrite_false(cx.rng),
                _ => continue,
            };
            *token = Token::new(TokenKind::Other, replacement);
            cx.stats.booleans_rewritten += 1;
        }
        lexer::render(&tokens)
    }
}

/// Nonzero numbers are truthy, so `not(not N)` collapses any of them to
/// `true`; the comparison form samples a strictly ordered pair.
fn rewrite_true(rng: &mut StdRng) -> String {
    if rng.gen_bool(0.5) {
        let n = rng.gen_range(2..=255);
        format!("(not(not {n}))")
    } else {
        let smaller = rng.gen_range(1..=100);
        let larger = smaller + rng.gen_range(1..=100);
        format!("({larger}>{smaller})")
    }
}

fn rewrite_false(rng: &mut StdRng) -> String {
    let n = rng.gen_range(2..=255);
    format!("(not({n}))")
}
