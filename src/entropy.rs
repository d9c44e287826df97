//! Shannon entropy (natural log) of a probability vector.

/// `-sum(p * ln p)` over the entries that are not exactly zero.
///
/// Empty and all-zero inputs give `0.0`. Zeros are filtered before the
/// logarithm, so `ln(0)` is never evaluated.
#[inline]
pub fn shannon_entropy(probs: &[f64]) -> f64 {
    probs
        .iter()
        .filter(|&&p| p != 0.0)
        .fold(0.0, |h, &p| h - p * p.ln())
}
