use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Default value of every query axis
pub const QUERY_MIDPOINT: f32 = 0.5;

/// Inline capacity of a shape; the reference dataset has six axes
const INLINE_AXES: usize = 6;

/// Read-only per-axis access shared by dataset vectors and the query.
///
/// Similarity and peak detection are written against this trait so that a
/// dense query never needs to be copied into a nullable vector.
pub trait Shape {
    fn dim(&self) -> usize;

    /// Value at `axis`, `None` when the slot is missing or out of range
    fn value(&self, axis: usize) -> Option<f32>;

    fn defined_count(&self) -> usize {
        (0..self.dim()).filter(|&i| self.value(i).is_some()).count()
    }
}

/// A fixed-length vector of nullable unit-interval values
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct FeatureVector {
    slots: SmallVec<[Option<f32>; INLINE_AXES]>,
}

impl FeatureVector {
    #[inline]
    #[must_use]
    pub fn new(slots: Vec<Option<f32>>) -> Self {
        Self {
            slots: SmallVec::from_vec(slots),
        }
    }

    #[inline]
    #[must_use]
    pub fn from_slice(slots: &[Option<f32>]) -> Self {
        Self {
            slots: SmallVec::from_slice(slots),
        }
    }

    /// A vector of `dim` missing slots
    #[inline]
    #[must_use]
    pub fn missing(dim: usize) -> Self {
        Self {
            slots: smallvec::smallvec![None; dim],
        }
    }

    #[inline]
    #[must_use]
    pub fn as_slice(&self) -> &[Option<f32>] {
        &self.slots
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = Option<f32>> + '_ {
        self.slots.iter().copied()
    }
}

impl Shape for FeatureVector {
    #[inline]
    fn dim(&self) -> usize {
        self.slots.len()
    }

    #[inline]
    fn value(&self, axis: usize) -> Option<f32> {
        self.slots.get(axis).copied().flatten()
    }
}

impl From<Vec<Option<f32>>> for FeatureVector {
    fn from(slots: Vec<Option<f32>>) -> Self {
        Self::new(slots)
    }
}

/// The user's target shape: dense, every axis clamped to [0, 1]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct QueryVector {
    data: SmallVec<[f32; INLINE_AXES]>,
}

impl QueryVector {
    /// Build a query, clamping each value into the unit interval.
    /// Non-finite values fall back to the midpoint.
    #[must_use]
    pub fn new(data: Vec<f32>) -> Self {
        Self {
            data: data.into_iter().map(clamp_axis).collect(),
        }
    }

    /// A query with every axis at the midpoint
    #[must_use]
    pub fn midpoint(dim: usize) -> Self {
        Self {
            data: smallvec::smallvec![QUERY_MIDPOINT; dim],
        }
    }

    /// Copy a record's shape; missing slots become 0
    #[must_use]
    pub fn from_features(features: &FeatureVector) -> Self {
        Self {
            data: features.iter().map(|v| clamp_axis(v.unwrap_or(0.0))).collect(),
        }
    }

    #[inline]
    #[must_use]
    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    /// Set one axis, clamped. Returns false when `axis` is out of range.
    pub fn set_axis(&mut self, axis: usize, value: f32) -> bool {
        match self.data.get_mut(axis) {
            Some(slot) => {
                *slot = clamp_axis(value);
                true
            }
            None => false,
        }
    }

    pub fn reset(&mut self) {
        for x in &mut self.data {
            *x = QUERY_MIDPOINT;
        }
    }
}

impl Shape for QueryVector {
    #[inline]
    fn dim(&self) -> usize {
        self.data.len()
    }

    #[inline]
    fn value(&self, axis: usize) -> Option<f32> {
        self.data.get(axis).copied()
    }

    #[inline]
    fn defined_count(&self) -> usize {
        self.data.len()
    }
}

#[inline]
fn clamp_axis(x: f32) -> f32 {
    if x.is_finite() {
        x.clamp(0.0, 1.0)
    } else {
        QUERY_MIDPOINT
    }
}
