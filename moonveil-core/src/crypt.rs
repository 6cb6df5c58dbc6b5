//! XOR keystream for emitted literals.
//!
//! The key byte paired with 1-based plaintext position `i` is
//! `key[((i - 1) mod #key) + 1]`. The runtime decryptor in the preamble
//! walks ciphertext positions with the same index expression, which makes
//! the transform an involution: one routine serves both directions. Keys
//! are plain ASCII letters so they can sit in a single-quoted literal with
//! no escaping.

use rand::rngs::StdRng;
use rand::Rng;

use crate::preamble;

const KEY_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";
const KEY_MIN_LEN: usize = 4;
const KEY_MAX_LEN: usize = 8;

pub(crate) fn random_key(rng: &mut StdRng) -> String {
    let len = rng.gen_range(KEY_MIN_LEN..=KEY_MAX_LEN);
    (0..len)
        .map(|_| KEY_ALPHABET[rng.gen_range(0..KEY_ALPHABET.len())] as char)
        .collect()
}

/// Ciphertext rendered as `\ddd` decimal escapes, one per plaintext byte.
pub(crate) fn xor_escapes(plain: &[u8], key: &str) -> String {
    let key_bytes = key.as_bytes();
    let mut out = String::with_capacity(plain.len() * 4);
    for (i, &byte) in plain.iter().enumerate() {
        out.push('\\');
        out.push_str(&(byte ^ key_bytes[i % key_bytes.len()]).to_string());
    }
    out
}

/// A complete decryptor invocation for one literal, under a fresh key.
pub(crate) fn decrypt_call(plain: &[u8], rng: &mut StdRng) -> String {
    let key = random_key(rng);
    format!(
        "{}('{}','{}')",
        preamble::DECRYPT_FN,
        xor_escapes(plain, &key),
        key
    )
}

/// Test-side inverse: parse `\ddd` escapes back to bytes and XOR them with
/// the key, mirroring what the emitted preamble does at runtime.
#[cfg(test)]
pub(crate) fn reference_decrypt(cipher_escapes: &str, key: &str) -> Vec<u8> {
    let key_bytes = key.as_bytes();
    cipher_escapes
        .split('\\')
        .filter(|part| !part.is_empty())
        .enumerate()
        .map(|(i, part)| {
            let value: u8 = part.parse().expect("escape is a decimal byte");
            value ^ key_bytes[i % key_bytes.len()]
        })
        .collect()
}
