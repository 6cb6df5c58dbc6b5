//! Conditional inversion.
//!
//! `if C then B end` becomes `if not (C) then J else B end` with `J` a junk
//! statement, so the real body moves into the else arm behind a negated
//! condition. Only single-branch conditionals are touched; the block scanner
//! refuses `else`/`elseif` chains and anything unbalanced, and those blocks
//! are spliced through byte-identical. Replacements stay on the block's own
//! line, which keeps the line layout intact for the predicate injector that
//! runs next.

use std::ops::Range;

use crate::junk;
use crate::lexer::{self, Token, TokenKind};
use crate::passes::{Pass, PassContext};
use crate::scanner;

pub(crate) struct LogicInversion;

impl Pass for LogicInversion {
    fn name(&self) -> &'static str {
        "invert-conditionals"
    }

    fn enabled(&self, config: &crate::config::ObfuscatorConfig) -> bool {
        config.passes.invert_conditionals
    }

    fn apply(&self, source: String, cx: &mut PassContext<'_>) -> String {
        let (tokens, spans): (Vec<Token>, Vec<Range<usize>>) =
            lexer::lex_spanned(&source).into_iter().unzip();

        let mut out = String::with_capacity(source.len());
        let mut copied = 0;
        let mut i = 0;
        while i < tokens.len() {
            if tokens[i].is(TokenKind::Keyword, "if") {
                if let Some(block) = scanner::match_if(&tokens, i) {
                    let condition = slice(&source, &spans, &block.condition);
                    let body = slice(&source, &spans, &block.body);
                    let junk = junk::statement(cx.rng);
                    out.push_str(&source[copied..spans[i].start]);
                    out.push_str(&format!(
                        "if not ({condition}) then {junk} else {body} end"
                    ));
                    copied = spans[block.end_index].end;
                    cx.stats.conditionals_inverted += 1;
                    // Nested conditionals moved into the else arm are left
                    // for a future run; rescanning spliced text would
                    // re-invert what this pass just emitted.
                    i = block.end_index + 1;
                    continue;
                }
                tracing::debug!("conditional left unchanged: multi-branch or unbalanced");
            }
            i += 1;
        }
        out.push_str(&source[copied..]);
        out
    }
}

fn slice<'a>(source: &'a str, spans: &[Range<usize>], range: &Range<usize>) -> &'a str {
    if range.is_empty() {
        ""
    } else {
        &source[spans[range.start].start..spans[range.end - 1].end]
    }
}
