//! Luau token stream.
//!
//! The lexer is deliberately permissive: it never rejects input. Anything it
//! cannot classify becomes a single-character `Other` token, and unterminated
//! strings or bracketed comments extend to the end of the buffer. Downstream
//! passes treat the stream as approximate and skip what they cannot prove
//! safe, so a lexing oddity degrades into a missed transform rather than a
//! broken script.

use std::ops::Range;

/// Closed set of token classes. Classification happens once, here; passes
/// match on the kind exhaustively instead of re-inspecting raw text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Comment,
    String,
    Keyword,
    Identifier,
    Operator,
    Number,
    Other,
}

/// A single lexed token: classification plus the exact source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
        }
    }

    pub fn is(&self, kind: TokenKind, text: &str) -> bool {
        self.kind == kind && self.text == text
    }
}

/// Block-structuring keywords. `true`/`false`/`and`/`or`/`not` are left as
/// identifiers so literal-rewriting passes can match them directly.
const KEYWORDS: [&str; 12] = [
    "if", "then", "else", "elseif", "end", "do", "function", "repeat", "until", "while", "for",
    "local",
];

// Multi-character operators come first so the longest form wins. `[` is
// absent: the lexer routes it through the long-bracket check before falling
// back to a plain operator token.
const OPERATORS: [&str; 25] = [
    "...", "..", "==", "~=", "<=", ">=", "+", "-", "*", "/", "%", "^", "#", "<", ">", "=", "(",
    ")", "{", "}", "]", ";", ":", ",", ".",
];

pub fn is_keyword(word: &str) -> bool {
    KEYWORDS.contains(&word)
}

/// Tokenize, dropping whitespace. Whitespace and comments carry no meaning
/// for the rewriting passes; callers that need exact byte positions use
/// [`lex_spanned`] instead.
pub fn lex(source: &str) -> Vec<Token> {
    lex_spanned(source).into_iter().map(|(t, _)| t).collect()
}

/// Tokenize with byte ranges. Structural passes use the ranges to splice
/// rewrites back into the original text without disturbing anything else,
/// including the line layout between tokens.
pub fn lex_spanned(source: &str) -> Vec<(Token, Range<usize>)> {
    let bytes = source.as_bytes();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        let b = bytes[i];
        if b.is_ascii_whitespace() {
            i += 1;
            continue;
        }

        let start = i;
        let token = if b == b'-' && bytes.get(i + 1) == Some(&b'-') {
            i = comment_end(source, i);
            Token::new(TokenKind::Comment, &source[start..i])
        } else if b == b'"' || b == b'\'' {
            i = quoted_end(bytes, i);
            Token::new(TokenKind::String, &source[start..i])
        } else if b == b'[' {
            if let Some(end) = long_bracket_end(bytes, i) {
                i = end;
                Token::new(TokenKind::String, &source[start..i])
            } else {
                i += 1;
                Token::new(TokenKind::Operator, "[")
            }
        } else if b.is_ascii_digit() || (b == b'.' && next_is_digit(bytes, i)) {
            i = number_end(bytes, i);
            Token::new(TokenKind::Number, &source[start..i])
        } else if b == b'_' || b.is_ascii_alphabetic() {
            i = word_end(bytes, i);
            let word = &source[start..i];
            let kind = if is_keyword(word) {
                TokenKind::Keyword
            } else {
                TokenKind::Identifier
            };
            Token::new(kind, word)
        } else if let Some(op) = operator_at(bytes, i) {
            i += op.len();
            Token::new(TokenKind::Operator, op)
        } else {
            // Catch-all: one whole UTF-8 scalar, so slicing stays on a
            // character boundary.
            let len = source[i..].chars().next().map_or(1, char::len_utf8);
            i += len;
            Token::new(TokenKind::Other, &source[start..i])
        };

        tokens.push((token, start..i));
    }

    tokens
}

/// Concatenate token text back into source. A space is inserted only where
/// two word-like tokens would otherwise fuse into one, plus a short list of
/// re-lexing hazards.
pub fn render(tokens: &[Token]) -> String {
    let mut out = String::new();
    let mut prev: Option<&Token> = None;
    for token in tokens {
        if let Some(p) = prev {
            if needs_gap(p, token) {
                out.push(' ');
            }
        }
        out.push_str(&token.text);
        prev = Some(token);
    }
    out
}

fn wordy(kind: TokenKind) -> bool {
    matches!(
        kind,
        TokenKind::Keyword | TokenKind::Identifier | TokenKind::Number
    )
}

fn needs_gap(prev: &Token, next: &Token) -> bool {
    if wordy(prev.kind) && wordy(next.kind) {
        return true;
    }
    // Re-lexing hazards: `- -` fuses into a comment opener, `[ [` into a
    // long-bracket opener, and a number directly before `..` swallows the
    // first dot as a malformed decimal point.
    if prev.text.ends_with('-') && next.text.starts_with('-') {
        return true;
    }
    if prev.text.ends_with('[') && next.text.starts_with('[') {
        return true;
    }
    if prev.kind == TokenKind::Number && next.text.starts_with('.') {
        return true;
    }
    false
}

fn next_is_digit(bytes: &[u8], i: usize) -> bool {
    bytes.get(i + 1).is_some_and(|b| b.is_ascii_digit())
}

fn word_end(bytes: &[u8], start: usize) -> usize {
    let mut i = start;
    while i < bytes.len() && (bytes[i] == b'_' || bytes[i].is_ascii_alphanumeric()) {
        i += 1;
    }
    i
}

fn number_end(bytes: &[u8], start: usize) -> usize {
    let mut i = start;
    if bytes[i] == b'0' && matches!(bytes.get(i + 1), Some(&b'x') | Some(&b'X')) {
        i += 2;
        while i < bytes.len() && bytes[i].is_ascii_hexdigit() {
            i += 1;
        }
        return i;
    }
    while i < bytes.len() && bytes[i].is_ascii_digit() {
        i += 1;
    }
    // A decimal point counts when a digit follows, or as a trailing dot on
    // digits already consumed (`5.`), but never when it starts `..` concat,
    // so `1..2` still lexes as number, concat, number.
    if i < bytes.len()
        && bytes[i] == b'.'
        && (next_is_digit(bytes, i) || (i > start && bytes.get(i + 1) != Some(&b'.')))
    {
        i += 1;
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
    }
    if i < bytes.len() && matches!(bytes[i], b'e' | b'E') {
        let mut j = i + 1;
        if j < bytes.len() && matches!(bytes[j], b'+' | b'-') {
            j += 1;
        }
        if j < bytes.len() && bytes[j].is_ascii_digit() {
            i = j;
            while i < bytes.len() && bytes[i].is_ascii_digit() {
                i += 1;
            }
        }
    }
    i
}

fn quoted_end(bytes: &[u8], start: usize) -> usize {
    let quote = bytes[start];
    let mut i = start + 1;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b'\n' => return i,
            b if b == quote => return i + 1,
            _ => i += 1,
        }
    }
    bytes.len()
}

/// Extent of a `[=*[ ... ]=*]` bracket opening at `start`, or None when the
/// opener is not actually a long bracket. An unterminated bracket runs to
/// the end of the buffer.
pub(crate) fn long_bracket_end(bytes: &[u8], start: usize) -> Option<usize> {
    let mut level = 0;
    let mut i = start + 1;
    while i < bytes.len() && bytes[i] == b'=' {
        level += 1;
        i += 1;
    }
    if i >= bytes.len() || bytes[i] != b'[' {
        return None;
    }
    i += 1;
    while i < bytes.len() {
        if bytes[i] == b']' {
            let mut j = i + 1;
            let mut eq = 0;
            while j < bytes.len() && bytes[j] == b'=' {
                eq += 1;
                j += 1;
            }
            if eq == level && j < bytes.len() && bytes[j] == b']' {
                return Some(j + 1);
            }
        }
        i += 1;
    }
    Some(bytes.len())
}

fn comment_end(source: &str, start: usize) -> usize {
    let bytes = source.as_bytes();
    let after = start + 2;
    if bytes.get(after) == Some(&b'[') {
        if let Some(end) = long_bracket_end(bytes, after) {
            return end;
        }
    }
    // Line comment: up to, not including, the newline.
    match bytes[after..].iter().position(|&b| b == b'\n') {
        Some(offset) => after + offset,
        None => bytes.len(),
    }
}

fn operator_at(bytes: &[u8], i: usize) -> Option<&'static str> {
    OPERATORS
        .iter()
        .find(|op| bytes[i..].starts_with(op.as_bytes()))
        .copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        lex(source).into_iter().map(|t| t.kind).collect()
    }

    fn texts(source: &str) -> Vec<String> {
        lex(source).into_iter().map(|t| t.text).collect()
    }

    #[test]
    fn test_classifies_basic_statement() {
        let tokens = lex("local x = 42");
        assert_eq!(tokens.len(), 4);
        assert!(tokens[0].is(TokenKind::Keyword, "local"));
        assert!(tokens[1].is(TokenKind::Identifier, "x"));
        assert!(tokens[2].is(TokenKind::Operator, "="));
        assert!(tokens[3].is(TokenKind::Number, "42"));
    }

    #[test]
    fn test_booleans_lex_as_identifiers() {
        let tokens = lex("true false and or not");
        assert!(tokens.iter().all(|t| t.kind == TokenKind::Identifier));
    }

    #[test]
    fn test_elseif_is_one_keyword() {
        assert_eq!(texts("elseif"), vec!["elseif"]);
        assert_eq!(kinds("elseif"), vec![TokenKind::Keyword]);
    }

    #[test]
    fn test_line_comment_stops_at_newline() {
        let tokens = lex("x = 1 -- note\ny = 2");
        let comment = tokens.iter().find(|t| t.kind == TokenKind::Comment).unwrap();
        assert_eq!(comment.text, "-- note");
    }

    #[test]
    fn test_block_comment_spans_lines() {
        let tokens = lex("--[[ first\nsecond ]] x");
        assert_eq!(tokens[0].kind, TokenKind::Comment);
        assert_eq!(tokens[0].text, "--[[ first\nsecond ]]");
        assert!(tokens[1].is(TokenKind::Identifier, "x"));
    }

    #[test]
    fn test_leveled_block_comment() {
        let tokens = lex("--[==[ has ]] inside ]==] y");
        assert_eq!(tokens[0].kind, TokenKind::Comment);
        assert!(tokens[1].is(TokenKind::Identifier, "y"));
    }

    #[test]
    fn test_dashes_in_string_are_not_comments() {
        let tokens = lex("s = \"a -- b\"");
        assert_eq!(tokens[2].kind, TokenKind::String);
        assert_eq!(tokens[2].text, "\"a -- b\"");
    }

    #[test]
    fn test_escaped_quote_stays_inside_string() {
        let tokens = lex(r#"s = "he said \"hi\"" + 1"#);
        assert_eq!(tokens[2].kind, TokenKind::String);
        assert_eq!(tokens[2].text, r#""he said \"hi\"""#);
        assert!(tokens[4].is(TokenKind::Number, "1"));
    }

    #[test]
    fn test_long_string_literal() {
        let tokens = lex("s = [[raw\ntext]]");
        assert_eq!(tokens[2].kind, TokenKind::String);
        assert_eq!(tokens[2].text, "[[raw\ntext]]");
    }

    #[test]
    fn test_lone_bracket_is_operator() {
        let tokens = lex("t[1]");
        assert!(tokens[1].is(TokenKind::Operator, "["));
        assert!(tokens[3].is(TokenKind::Operator, "]"));
    }

    #[test]
    fn test_number_forms() {
        for (src, expect) in [
            ("42", "42"),
            ("3.14", "3.14"),
            ("0xFF", "0xFF"),
            ("1e5", "1e5"),
            ("2.5e-3", "2.5e-3"),
            (".5", ".5"),
            ("5.", "5."),
        ] {
            let tokens = lex(src);
            assert_eq!(tokens.len(), 1, "lexing {src:?}");
            assert!(tokens[0].is(TokenKind::Number, expect), "lexing {src:?}");
        }
    }

    #[test]
    fn test_concat_after_number_keeps_both_dots() {
        assert_eq!(texts("1 .. 2"), vec!["1", "..", "2"]);
    }

    #[test]
    fn test_longest_operator_wins() {
        assert_eq!(texts("a ~= b <= c .. ..."), vec!["a", "~=", "b", "<=", "c", "..", "..."]);
    }

    #[test]
    fn test_unclassifiable_byte_is_other() {
        let tokens = lex("a @ b");
        assert!(tokens[1].is(TokenKind::Other, "@"));
    }

    #[test]
    fn test_unterminated_string_stops_at_line_end() {
        let tokens = lex("s = \"oops\nx = 1");
        assert_eq!(tokens[2].kind, TokenKind::String);
        assert_eq!(tokens[2].text, "\"oops");
        assert!(tokens[3].is(TokenKind::Identifier, "x"));
    }

    #[test]
    fn test_spans_cover_everything_but_whitespace() {
        let source = "local x = 1 -- done\nprint(\"ok\")";
        let mut cursor = 0;
        for (token, span) in lex_spanned(source) {
            assert!(span.start >= cursor);
            assert!(
                source[cursor..span.start].chars().all(char::is_whitespace),
                "gap {:?} is not whitespace",
                &source[cursor..span.start]
            );
            assert_eq!(&source[span.clone()], token.text);
            cursor = span.end;
        }
        assert!(source[cursor..].chars().all(char::is_whitespace));
    }

    #[test]
    fn test_render_separates_word_tokens() {
        let rendered = render(&lex("local x = 10 return x"));
        assert_eq!(rendered, "local x=10 return x");
    }

    #[test]
    fn test_render_keeps_unary_minus_pair_apart() {
        let rendered = render(&lex("a - -b"));
        assert_eq!(rendered, "a- -b");
        assert!(!rendered.contains("--"));
    }

    #[test]
    fn test_render_keeps_bracket_pair_apart() {
        let rendered = render(&lex("t[ [[s]] ]"));
        assert_eq!(rendered, "t[ [[s]]]");
        assert_eq!(lex(&rendered), lex("t[ [[s]] ]"));
    }

    #[test]
    fn test_render_keeps_concat_off_numbers() {
        let rendered = render(&lex("x = 1 .. 2"));
        assert_eq!(rendered, "x=1 ..2");
    }

    #[test]
    fn test_render_round_trips_token_stream() {
        let source = "for i=1,10 do print(t[i] .. \"!\") end";
        let once = lex(source);
        let again = lex(&render(&once));
        assert_eq!(once, again);
    }
}
