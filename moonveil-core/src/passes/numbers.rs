//! Numeric literal sweep.
//!
//! Applies the arithmetic split from [`crate::numeric`] to every number
//! token in the stream. This pass runs after every pass that synthesizes
//! literals (predicate operands, state ids, transition deltas, gate
//! integers), so those constants are swept up together with the user's own.
//! Hex literals and anything the splitter rejects pass through unchanged.

use crate::lexer::{self, Token, TokenKind};
use crate::numeric;
use crate::passes::{Pass, PassContext};

pub(crate) struct NumberMangle;

impl Pass for NumberMangle {
    fn name(&self) -> &'static str {
        "mangle-numbers"
    }

    fn enabled(&self, config: &crate::config::ObfuscatorConfig) -> bool {
        config.passes.mangle_numbers
    }

    fn apply(&self, source: String, cx: &mut PassContext<'_>) -> String {
        let mut tokens = lexer::lex(&source);
        for token in &mut tokens {
            if token.kind != TokenKind::Number {
                continue;
            }
            if token.text.starts_with("0x") || token.text.starts_with("0X") {
                continue;
            }
            let Ok(value) = token.text.parse::<f64>() else {
                continue;
            };
            match numeric::mangle(value, cx.rng) {
                Ok(expr) => {
                    *token = Token::new(TokenKind::Other, expr);
                    cx.stats.numbers_mangled += 1;
                }
                Err(reason) => {
                    tracing::debug!(literal = %token.text, %reason, "literal left unchanged");
                }
            }
        }
        lexer::render(&tokens)
    }
}
