//! Route pattern analysis.

/// Count the wildcard slots (`:name` and `*name`) in a route pattern.
///
/// Saturates at 255, the width of the per-node parameter bound.
pub fn count_params(pattern: &str) -> u8 {
    let n = pattern
        .bytes()
        .filter(|&b| b == b':' || b == b'*')
        .count();
    n.min(u8::MAX as usize) as u8
}
