//! Fresh-name sampling for generated code.

use rand::rngs::StdRng;
use rand::Rng;

const FIRST: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz_";
const REST: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789_";

/// A syntactically valid Luau identifier of the given length. Uniqueness is
/// probabilistic; generated names are long enough that a collision with user
/// code is not a practical concern.
pub(crate) fn identifier(rng: &mut StdRng, len: usize) -> String {
    let mut name = String::with_capacity(len);
    name.push(FIRST[rng.gen_range(0..FIRST.len())] as char);
    for _ in 1..len {
        name.push(REST[rng.gen_range(0..REST.len())] as char);
    }
    name
}
