//! Global virtualization.
//!
//! Bare references to protected globals become lookups through the
//! environment proxy, keyed by an encrypted name: `print` turns into
//! `Ma[Ea('\..','key')]`. Skipped occurrences:
//!   - property and method accesses (`a.print`, `obj:wait()`), where the
//!     name is not a global at all;
//!   - declaration positions (`local wait`, `for game in ...`, parameters),
//!     which must stay plain names;
//!   - under the default shadowing policy, every occurrence of a name the
//!     script also declares locally somewhere.
//! Runs last in the pipeline so its ciphertext and keys are not rewritten
//! by the literal passes.

use std::collections::HashSet;

use crate::config::VirtualizeMode;
use crate::crypt;
use crate::lexer::{self, Token, TokenKind};
use crate::passes::{Pass, PassContext};
use crate::preamble;

pub(crate) struct GlobalVirtualize;

impl Pass for GlobalVirtualize {
    fn name(&self) -> &'static str {
        "virtualize-globals"
    }

    fn enabled(&self, config: &crate::config::ObfuscatorConfig) -> bool {
        config.passes.virtualize_globals
    }

    fn apply(&self, source: String, cx: &mut PassContext<'_>) -> String {
        let tokens = lexer::lex(&source);
        let shadowed = declared_names(&tokens);
        let protected = cx.config.globals.ordered_protected();

        let mut out = Vec::with_capacity(tokens.len());
        for (i, token) in tokens.iter().enumerate() {
            if token.kind == TokenKind::Identifier
                && protected.iter().any(|name| *name == token.text)
                && !is_property_access(&tokens, i)
                && !in_declaration(&tokens, i)
                && !is_table_key(&tokens, i)
                && !(cx.config.globals.mode_for(&token.text) == VirtualizeMode::SkipWhenShadowed
                    && shadowed.contains(&token.text))
            {
                let call = crypt::decrypt_call(token.text.as_bytes(), cx.rng);
                out.push(Token::new(
                    TokenKind::Identifier,
                    format!("{}[{call}]", preamble::ENV_PROXY),
                ));
                cx.stats.globals_virtualized += 1;
                continue;
            }
            out.push(token.clone());
        }
        lexer::render(&out)
    }
}

fn is_property_access(tokens: &[Token], i: usize) -> bool {
    i > 0
        && tokens[i - 1].kind == TokenKind::Operator
        && (tokens[i - 1].text == "." || tokens[i - 1].text == ":")
}

/// `{ wait = 5 }` keys the field with the plain word; an index expression
/// there is a syntax error, so the name must stay. Also catches the same
/// shape after a comma, which conservatively skips one multi-assignment
/// form too.
fn is_table_key(tokens: &[Token], i: usize) -> bool {
    let keyed = tokens.get(i + 1).is_some_and(|t| t.is(TokenKind::Operator, "="));
    keyed
        && i > 0
        && tokens[i - 1].kind == TokenKind::Operator
        && (tokens[i - 1].text == "{" || tokens[i - 1].text == ",")
}

/// Is token `i` a name being declared rather than used? Covers `local a, b`,
/// both `for` forms, and function parameter lists (the name list between the
/// parens of a `function` header).
fn in_declaration(tokens: &[Token], i: usize) -> bool {
    let mut at = i;
    // Walk left over `name ,` pairs to the start of a possible name list.
    loop {
        if at == 0 {
            return false;
        }
        let prev = &tokens[at - 1];
        if prev.is(TokenKind::Keyword, "local") || prev.is(TokenKind::Keyword, "for") {
            return true;
        }
        if prev.is(TokenKind::Operator, "(") {
            return is_function_header(tokens, at - 1);
        }
        if prev.is(TokenKind::Operator, ",") && at >= 2 && tokens[at - 2].kind == TokenKind::Identifier
        {
            at -= 2;
            continue;
        }
        return false;
    }
}

/// Does the `(` at index `open` open a `function` parameter list? The name
/// between `function` and `(` may be dotted or a method.
fn is_function_header(tokens: &[Token], open: usize) -> bool {
    let mut at = open;
    while at > 0 {
        let prev = &tokens[at - 1];
        if prev.is(TokenKind::Keyword, "function") {
            return true;
        }
        let name_part = prev.kind == TokenKind::Identifier
            || (prev.kind == TokenKind::Operator && (prev.text == "." || prev.text == ":"));
        if !name_part {
            return false;
        }
        at -= 1;
    }
    false
}

/// Every name the script declares locally: `local` lists, `local function`,
/// `for` variables, and function parameters.
fn declared_names(tokens: &[Token]) -> HashSet<String> {
    let mut found = HashSet::new();
    for (i, token) in tokens.iter().enumerate() {
        if token.kind != TokenKind::Identifier {
            continue;
        }
        if in_declaration(tokens, i) {
            found.insert(token.text.clone());
        }
        // `local function NAME` declares NAME without a following list.
        if i >= 2
            && tokens[i - 1].is(TokenKind::Keyword, "function")
            && tokens[i - 2].is(TokenKind::Keyword, "local")
        {
            found.insert(token.text.clone());
        }
    }
    found
}
