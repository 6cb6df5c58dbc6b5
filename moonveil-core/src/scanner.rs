//! Balanced-block scanning over the token stream.
//!
//! The scanner finds the extent of a single-branch `if <cond> then <body>
//! end` without parsing: openers (`if`, `do`, `function`, `repeat`) bump a
//! depth counter, closers (`end`, `until`) drop it. It is conservative by
//! contract. Any `else`/`elseif` arm at the block's own level, or a stream
//! that never closes the block, yields no match and the caller leaves the
//! original text alone.

use std::ops::Range;

use crate::lexer::{Token, TokenKind};

/// Extent of one matched conditional, as token index ranges.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Block {
    /// Tokens between `if` and its `then`.
    pub condition: Range<usize>,
    /// Tokens between `then` and the closing `end`.
    pub body: Range<usize>,
    /// Index of the closing `end` itself.
    pub end_index: usize,
}

fn opens_block(text: &str) -> bool {
    matches!(text, "if" | "do" | "function" | "repeat")
}

fn closes_block(text: &str) -> bool {
    matches!(text, "end" | "until")
}

/// Match the conditional whose `if` sits at token index `at`.
pub(crate) fn match_if(tokens: &[Token], at: usize) -> Option<Block> {
    debug_assert!(tokens[at].is(TokenKind::Keyword, "if"));

    // Find the `then` that belongs to this `if`. The condition itself may
    // contain whole nested blocks (an inline function, `x and (function()
    // ... end)()` and so on).
    let cond_start = at + 1;
    let mut depth = 0usize;
    let mut i = cond_start;
    let then_index = loop {
        let token = tokens.get(i)?;
        if token.kind == TokenKind::Keyword {
            match token.text.as_str() {
                "then" if depth == 0 => break i,
                t if opens_block(t) => depth += 1,
                t if closes_block(t) => depth = depth.checked_sub(1)?,
                _ => {}
            }
        }
        i += 1;
    };

    let body_start = then_index + 1;
    let mut depth = 1usize;
    let mut i = body_start;
    loop {
        let token = tokens.get(i)?;
        if token.kind == TokenKind::Keyword {
            match token.text.as_str() {
                "else" | "elseif" if depth == 1 => return None,
                t if opens_block(t) => depth += 1,
                t if closes_block(t) => {
                    depth -= 1;
                    if depth == 0 {
                        // Only a real `end` closes an `if`; an `until`
                        // landing here means the stream is malformed.
                        return (token.text == "end").then_some(Block {
                            condition: cond_start..then_index,
                            body: body_start..i,
                            end_index: i,
                        });
                    }
                }
                _ => {}
            }
        }
        i += 1;
    }
}
