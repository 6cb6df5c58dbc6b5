//! String literal encryption.
//!
//! Each string token is decoded to its runtime bytes, XORed under a fresh
//! key, and replaced by a call to the preamble's decryptor. The replacement
//! is wrapped in parens so it stays valid where Luau allows call-sugar
//! (`print"hi"` becomes `print(Ea(...))`). A literal whose escapes cannot
//! be decoded is left alone; encrypting a guess would corrupt it at runtime.

use crate::crypt;
use crate::error::SkipReason;
use crate::lexer::{self, Token, TokenKind};
use crate::passes::{Pass, PassContext};

pub(crate) struct StringEncrypt;

impl Pass for StringEncrypt {
    fn name(&self) -> &'static str {
        "encrypt-strings"
    }

    fn enabled(&self, config: &crate::config::ObfuscatorConfig) -> bool {
        config.passes.encrypt_strings
    }

    fn apply(&self, source: String, cx: &mut PassContext<'_>) -> String {
        let mut tokens = lexer::lex(&source);
        for token in &mut tokens {
            if token.kind != TokenKind::String {
                continue;
            }
            match decode_literal(&token.text) {
                Ok(plain) => {
                    let call = crypt::decrypt_call(&plain, cx.rng);
                    *token = Token::new(TokenKind::Other, format!("({call})"));
                    cx.stats.strings_encrypted += 1;
                }
                Err(reason) => {
                    tracing::debug!(%reason, "string literal left unchanged");
                }
            }
        }
        lexer::render(&tokens)
    }
}

/// Runtime bytes of a string literal, or the reason they can't be known.
fn decode_literal(text: &str) -> Result<Vec<u8>, SkipReason> {
    match text.as_bytes().first() {
        Some(b'"') | Some(b'\'') => decode_quoted(text),
        Some(b'[') => decode_long_bracket(text),
        _ => Err(SkipReason::UndecodableString(text.to_string())),
    }
}

fn decode_quoted(text: &str) -> Result<Vec<u8>, SkipReason> {
    let bytes = text.as_bytes();
    let quote = bytes[0];
    if bytes.len() < 2 || bytes[bytes.len() - 1] != quote {
        return Err(SkipReason::UndecodableString(text.to_string()));
    }
    let inner = &bytes[1..bytes.len() - 1];
    let mut out = Vec::with_capacity(inner.len());
    let mut i = 0;
    while i < inner.len() {
        let b = inner[i];
        if b != b'\\' {
            out.push(b);
            i += 1;
            continue;
        }
        i += 1;
        let &escape = inner
            .get(i)
            .ok_or_else(|| SkipReason::UndecodableString(text.to_string()))?;
        i += 1;
        match escape {
            b'n' => out.push(b'\n'),
            b't' => out.push(b'\t'),
            b'r' => out.push(b'\r'),
            b'a' => out.push(7),
            b'b' => out.push(8),
            b'f' => out.push(12),
            b'v' => out.push(11),
            b'\\' => out.push(b'\\'),
            b'"' => out.push(b'"'),
            b'\'' => out.push(b'\''),
            b'\n' => out.push(b'\n'),
            b'0'..=b'9' => {
                let mut value: u32 = u32::from(escape - b'0');
                for _ in 0..2 {
                    match inner.get(i) {
                        Some(d) if d.is_ascii_digit() => {
                            value = value * 10 + u32::from(d - b'0');
                            i += 1;
                        }
                        _ => break,
                    }
                }
                if value > 255 {
                    return Err(SkipReason::UndecodableString(text.to_string()));
                }
                out.push(value as u8);
            }
            b'x' | b'X' => {
                let hex = inner
                    .get(i..i + 2)
                    .ok_or_else(|| SkipReason::UndecodableString(text.to_string()))?;
                let hex = std::str::from_utf8(hex)
                    .ok()
                    .and_then(|h| u8::from_str_radix(h, 16).ok())
                    .ok_or_else(|| SkipReason::UndecodableString(text.to_string()))?;
                out.push(hex);
                i += 2;
            }
            other => {
                return Err(SkipReason::UndecodableString(format!(
                    "\\{} in {}",
                    other as char, text
                )));
            }
        }
    }
    Ok(out)
}

fn decode_long_bracket(text: &str) -> Result<Vec<u8>, SkipReason> {
    let bytes = text.as_bytes();
    let mut level = 0;
    let mut i = 1;
    while i < bytes.len() && bytes[i] == b'=' {
        level += 1;
        i += 1;
    }
    let open_len = i + 1;
    let close_len = level + 2;
    if i >= bytes.len() || bytes[i] != b'[' || bytes.len() < open_len + close_len {
        return Err(SkipReason::UndecodableString(text.to_string()));
    }
    let tail = &bytes[bytes.len() - close_len..];
    let tail_ok = tail[0] == b']'
        && tail[close_len - 1] == b']'
        && tail[1..close_len - 1].iter().all(|&b| b == b'=');
    if !tail_ok {
        return Err(SkipReason::UndecodableString(text.to_string()));
    }
    let mut inner = &bytes[open_len..bytes.len() - close_len];
    // Lua drops a newline that directly follows the opening bracket.
    if inner.first() == Some(&b'\r') {
        inner = &inner[1..];
    }
    if inner.first() == Some(&b'\n') {
        inner = &inner[1..];
    }
    Ok(inner.to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ObfuscatorConfig;
    use crate::pipeline::ObfuscationStats;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use regex::Regex;

    fn run(source: &str) -> (String, usize) {
        let config = ObfuscatorConfig::default();
        let mut rng = StdRng::seed_from_u64(8);
        let mut stats = ObfuscationStats::default();
        let mut cx = PassContext {
            config: &config,
            rng: &mut rng,
            stats: &mut stats,
        };
        let out = StringEncrypt.apply(source.to_string(), &mut cx);
        (out, stats.strings_encrypted)
    }

    /// All `Ea('<cipher>','<key>')` calls in the output, decrypted back to
    /// plaintext bytes with the test-side inverse.
    fn recovered_plaintexts(output: &str) -> Vec<Vec<u8>> {
        let call = Regex::new(r"Ea\('((?:\\\d+)*)','([A-Za-z]+)'\)").unwrap();
        call.captures_iter(output)
            .map(|c| crypt::reference_decrypt(&c[1], &c[2]))
            .collect()
    }

    #[test]
    fn test_plain_string_round_trips() {
        let (out, count) = run("local s = \"abc\"");
        assert_eq!(count, 1);
        assert_eq!(recovered_plaintexts(&out), vec![b"abc".to_vec()], "{out}");
    }

    #[test]
    fn test_escapes_round_trip_as_runtime_bytes() {
        let (out, _) = run(r#"s = "line\nnext\t\"q\" \065 \x41""#);
        let plain = recovered_plaintexts(&out).remove(0);
        assert_eq!(plain, b"line\nnext\t\"q\" A A".to_vec());
    }

    #[test]
    fn test_long_bracket_string_round_trips() {
        let (out, count) = run("s = [[raw ]not done] text]]");
        assert_eq!(count, 1);
        assert_eq!(
            recovered_plaintexts(&out),
            vec![b"raw ]not done] text".to_vec()],
            "{out}"
        );
    }

    #[test]
    fn test_long_bracket_leading_newline_is_dropped() {
        let (out, _) = run("s = [[\nbody]]");
        assert_eq!(recovered_plaintexts(&out), vec![b"body".to_vec()]);
    }

    #[test]
    fn test_empty_string_encrypts_to_empty_call() {
        let (out, count) = run("s = ''");
        assert_eq!(count, 1);
        assert!(out.contains("(Ea('','"), "{out}");
    }

    #[test]
    fn test_unknown_escape_is_left_alone() {
        let source = r#"s = "\q oops""#;
        let (out, count) = run(source);
        assert_eq!(count, 0);
        assert_eq!(out, "s=\"\\q oops\"");
    }

    #[test]
    fn test_call_sugar_form_gains_argument_parens() {
        let (out, _) = run("print\"hi\"");
        assert!(out.starts_with("print(Ea('"), "{out}");
    }

    #[test]
    fn test_decimal_escape_overflow_is_left_alone() {
        let (out, count) = run(r#"s = "\300""#);
        assert_eq!(count, 0);
        assert!(out.contains("\\300"), "{out}");
    }

    #[test]
    fn test_every_string_in_mixed_code_is_encrypted() {
        let (out, count) = run("f(\"a\", 'b', [[c]])");
        assert_eq!(count, 3);
        assert_eq!(
            recovered_plaintexts(&out),
            vec![b"a".to_vec(), b"b".to_vec(), b"c".to_vec()]
        );
    }
}
