//! Deterministic code strategies kept for benchmarking against random
//! generation.
//!
//! Neither function checks for collisions and neither is used to fill the
//! production pool.

use super::CodeSpec;
use super::bloom::polynomial_hash;

/// Truncates a polynomial hash of `input` to a code.
///
/// Digits are emitted least-significant first, so inputs sharing a hash
/// modulo `A^L` collide.
pub fn hash_code(spec: &CodeSpec, input: &str) -> String {
    let radix = spec.alphabet().len() as u64;
    let mut hash = polynomial_hash(input.as_bytes(), 0);

    let mut code = String::with_capacity(spec.length());
    for _ in 0..spec.length() {
        code.push(spec.alphabet().symbol(hash % radix) as char);
        hash /= radix;
    }
    code
}

/// Encodes a sequence number as a fixed-width base-`A` code, most-significant
/// digit first. Negative inputs use their absolute value and values beyond
/// `A^L` wrap.
pub fn sequence_code(spec: &CodeSpec, seq: i64) -> String {
    let radix = spec.alphabet().len() as u64;
    let mut value = seq.unsigned_abs();

    let mut digits = vec![0u8; spec.length()];
    for slot in digits.iter_mut().rev() {
        *slot = spec.alphabet().symbol(value % radix);
        value /= radix;
    }
    digits.into_iter().map(char::from).collect()
}
