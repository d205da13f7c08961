//! Missing-aware cosine similarity
//!
//! Cosine similarity restricted to the axes where both shapes are defined.
//! Returns `None` when the pair is not comparable.

use crate::vector::Shape;

/// Fewest shared axes for which a score is trusted
pub const DEFAULT_MIN_COMMON_DIMS: usize = 2;

/// Compute cosine similarity over the shared defined axes of `a` and `b`.
///
/// # Returns
/// `None` if the dimensions differ, fewer than `min_common_dims` axes are
/// shared, or either side has zero magnitude over the shared axes.
pub fn similarity<A, B>(a: &A, b: &B, min_common_dims: usize) -> Option<f32>
where
    A: Shape + ?Sized,
    B: Shape + ?Sized,
{
    if a.dim() != b.dim() {
        return None;
    }

    let mut dot = 0.0f32;
    let mut norm_a = 0.0f32;
    let mut norm_b = 0.0f32;
    let mut common = 0usize;

    for axis in 0..a.dim() {
        if let (Some(x), Some(y)) = (a.value(axis), b.value(axis)) {
            dot += x * y;
            norm_a += x * x;
            norm_b += y * y;
            common += 1;
        }
    }

    if common < min_common_dims || norm_a == 0.0 || norm_b == 0.0 {
        return None;
    }

    Some(dot / (norm_a.sqrt() * norm_b.sqrt()))
}
