//! Glitch substitution

use rand::Rng;

/// Replacement characters
pub const GLITCH_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

/// One glitch pass: every character of `original` is independently replaced
/// with probability `probability` by a uniform pick from [`GLITCH_ALPHABET`].
/// Always derived from `original`, so corruption never accumulates.
pub fn glitch_text<R: Rng + ?Sized>(original: &str, probability: f64, rng: &mut R) -> String {
    let probability = if probability.is_nan() { 0.0 } else { probability.clamp(0.0, 1.0) };
    original
        .chars()
        .map(|c| {
            if rng.gen_bool(probability) {
                char::from(GLITCH_ALPHABET[rng.gen_range(0..GLITCH_ALPHABET.len())])
            } else {
                c
            }
        })
        .collect()
}
