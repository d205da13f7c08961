//! Peak-axis pre-filter
//!
//! Two shapes whose dominant axis differs are treated as different in kind,
//! however close their cosine score. The filter only excludes when both
//! peaks are known.

use crate::vector::Shape;

/// Index of the strictly greatest defined value, first index on ties.
///
/// Returns `None` for a shape with no defined values, and for a flat shape
/// (two or more defined values, all equal).
pub fn peak_axis<S: Shape + ?Sized>(v: &S) -> Option<usize> {
    PeakFilter::default().peak_axis(v)
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PeakFilter {
    flat_has_peak: bool,
}

impl PeakFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// When enabled, a flat shape peaks at its first defined axis
    #[must_use]
    pub fn with_flat_peaks(mut self, flat_has_peak: bool) -> Self {
        self.flat_has_peak = flat_has_peak;
        self
    }

    pub fn peak_axis<S: Shape + ?Sized>(&self, v: &S) -> Option<usize> {
        let mut best: Option<(usize, f32)> = None;
        let mut defined = 0usize;
        let mut flat = true;

        for axis in 0..v.dim() {
            let Some(x) = v.value(axis) else { continue };
            defined += 1;
            match best {
                None => best = Some((axis, x)),
                Some((_, max)) => {
                    if x != max {
                        flat = false;
                    }
                    if x > max {
                        best = Some((axis, x));
                    }
                }
            }
        }

        if flat && defined > 1 && !self.flat_has_peak {
            return None;
        }
        best.map(|(axis, _)| axis)
    }

    /// A candidate is excluded iff both peaks are known and they differ
    #[inline]
    pub fn excludes(query_peak: Option<usize>, candidate_peak: Option<usize>) -> bool {
        matches!((query_peak, candidate_peak), (Some(q), Some(c)) if q != c)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vector::{FeatureVector, QueryVector};

    #[test]
    fn test_peak_skips_missing() {
        let v = FeatureVector::new(vec![Some(0.1), Some(0.9), Some(0.2), None, Some(0.3), Some(0.5)]);
        assert_eq!(peak_axis(&v), Some(1));
    }

    #[test]
    fn test_all_missing_has_no_peak() {
        assert_eq!(peak_axis(&FeatureVector::missing(6)), None);
        assert_eq!(peak_axis(&FeatureVector::new(vec![])), None);
    }

    #[test]
    fn test_ties_resolve_to_first() {
        let v = FeatureVector::new(vec![Some(0.2), Some(0.8), None, Some(0.8)]);
        assert_eq!(peak_axis(&v), Some(1));
    }

    #[test]
    fn test_flat_shape_has_no_peak() {
        let q = QueryVector::midpoint(6);
        assert_eq!(peak_axis(&q), None);

        let flat = PeakFilter::new().with_flat_peaks(true);
        assert_eq!(flat.peak_axis(&q), Some(0));
    }

    #[test]
    fn test_single_defined_value_is_a_peak() {
        let v = FeatureVector::new(vec![None, None, Some(0.4)]);
        assert_eq!(peak_axis(&v), Some(2));
    }

    #[test]
    fn test_excludes_only_when_both_defined() {
        assert!(PeakFilter::excludes(Some(0), Some(1)));
        assert!(!PeakFilter::excludes(Some(2), Some(2)));
        assert!(!PeakFilter::excludes(None, Some(1)));
        assert!(!PeakFilter::excludes(Some(0), None));
        assert!(!PeakFilter::excludes(None, None));
    }
}
