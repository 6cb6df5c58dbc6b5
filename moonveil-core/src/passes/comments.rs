//! Comment stripping.
//!
//! Runs first so no later pass ever sees a comment token. The lexer already
//! knows the difference between a comment and a comment-like sequence inside
//! a string, so this pass just drops `Comment` tokens and splices everything
//! else back byte-for-byte. Bracketed comments leave a single space behind;
//! removing them outright could fuse the tokens on either side.

use crate::lexer::{self, TokenKind};
use crate::passes::{Pass, PassContext};

pub(crate) struct CommentStrip;

impl Pass for CommentStrip {
    fn name(&self) -> &'static str {
        "strip-comments"
    }

    fn enabled(&self, config: &crate::config::ObfuscatorConfig) -> bool {
        config.passes.strip_comments
    }

    fn apply(&self, source: String, cx: &mut PassContext<'_>) -> String {
        let mut out = String::with_capacity(source.len());
        let mut copied = 0;
        for (token, span) in lexer::lex_spanned(&source) {
            if token.kind != TokenKind::Comment {
                continue;
            }
            out.push_str(&source[copied..span.start]);
            if is_bracketed(&token.text) {
                out.push(' ');
            }
            copied = span.end;
            cx.stats.comments_removed += 1;
        }
        out.push_str(&source[copied..]);
        out
    }
}

/// Mirrors the lexer's own decision: a comment is bracketed when `--` is
/// followed by a complete long-bracket opener.
fn is_bracketed(text: &str) -> bool {
    let bytes = text.as_bytes();
    bytes.get(2) == Some(&b'[') && lexer::long_bracket_end(bytes, 2).is_some()
}
