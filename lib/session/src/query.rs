use shapematch_core::{Error, FeatureVector, QueryVector, Result, Shape};

/// Owner of the session's current target shape
#[derive(Debug, Clone)]
pub struct QueryState {
    vector: QueryVector,
    revision: u64,
}

impl QueryState {
    /// Start at the midpoint on every axis
    pub fn new(dim: usize) -> Self {
        Self {
            vector: QueryVector::midpoint(dim),
            revision: 0,
        }
    }

    pub fn dim(&self) -> usize {
        self.vector.dim()
    }

    /// Bumped on every successful mutation
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn vector(&self) -> &QueryVector {
        &self.vector
    }

    pub fn snapshot(&self) -> QueryVector {
        self.vector.clone()
    }

    pub fn set(&mut self, vector: QueryVector) -> Result<()> {
        if vector.dim() != self.dim() {
            return Err(Error::InvalidDimension {
                expected: self.dim(),
                actual: vector.dim(),
            });
        }
        self.vector = vector;
        self.revision += 1;
        Ok(())
    }

    pub fn set_axis(&mut self, axis: usize, value: f32) -> Result<()> {
        if !self.vector.set_axis(axis, value) {
            return Err(Error::AxisOutOfRange {
                axis,
                dim: self.dim(),
            });
        }
        self.revision += 1;
        Ok(())
    }

    pub fn reset(&mut self) {
        self.vector.reset();
        self.revision += 1;
    }

    /// Take a record's shape as the query; missing slots become 0
    pub fn adopt(&mut self, features: &FeatureVector) -> Result<()> {
        self.set(QueryVector::from_features(features))
    }
}
