//! Engine configuration
//!
//! Every tunable the ranking pipeline reads, with serde defaults so a partial
//! JSON document (or none at all) yields the reference setup.

use crate::similarity::DEFAULT_MIN_COMMON_DIMS;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_TOP_N: usize = 10;
pub const DEFAULT_THROTTLE_MS: u64 = 120;
pub const DEFAULT_AXES: usize = 6;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EngineConfig {
    /// Which columns hold the id, name and shape axes
    #[serde(default)]
    pub dataset: DatasetSchema,

    /// Fewest shared axes for a comparable pair
    #[serde(default = "default_min_common_dims")]
    pub min_common_dims: usize,

    /// Number of results published per recompute
    #[serde(default = "default_top_n")]
    pub top_n: usize,

    /// Trailing-edge throttle window for input bursts
    #[serde(default = "default_throttle_ms")]
    pub throttle_ms: u64,

    /// Whether a flat shape peaks at its first axis instead of having no peak
    #[serde(default)]
    pub flat_has_peak: bool,
}

fn default_min_common_dims() -> usize {
    DEFAULT_MIN_COMMON_DIMS
}

fn default_top_n() -> usize {
    DEFAULT_TOP_N
}

fn default_throttle_ms() -> u64 {
    DEFAULT_THROTTLE_MS
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            dataset: DatasetSchema::default(),
            min_common_dims: DEFAULT_MIN_COMMON_DIMS,
            top_n: DEFAULT_TOP_N,
            throttle_ms: DEFAULT_THROTTLE_MS,
            flat_has_peak: false,
        }
    }
}

impl EngineConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| Error::Serialization(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Number of shape axes (K)
    pub fn dim(&self) -> usize {
        self.dataset.feature_columns.len()
    }

    pub fn throttle(&self) -> Duration {
        Duration::from_millis(self.throttle_ms)
    }

    pub fn validate(&self) -> Result<()> {
        self.dataset.validate()?;
        if self.min_common_dims == 0 {
            return Err(Error::InvalidConfig(
                "min_common_dims must be at least 1".to_string(),
            ));
        }
        if self.min_common_dims > self.dim() {
            return Err(Error::InvalidConfig(format!(
                "min_common_dims ({}) exceeds the number of axes ({})",
                self.min_common_dims,
                self.dim()
            )));
        }
        Ok(())
    }
}

/// Column layout of the tabular source
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DatasetSchema {
    /// Column holding the record id; row index is used when absent
    #[serde(default = "default_id_column")]
    pub id_column: Option<String>,

    /// Column holding the display name; the id is used when absent
    #[serde(default = "default_name_column")]
    pub name_column: Option<String>,

    /// Ordered shape axes
    #[serde(default = "default_feature_columns")]
    pub feature_columns: Vec<String>,
}

fn default_id_column() -> Option<String> {
    Some("id".to_string())
}

fn default_name_column() -> Option<String> {
    Some("name".to_string())
}

fn default_feature_columns() -> Vec<String> {
    (1..=DEFAULT_AXES).map(|i| format!("shape_{}", i)).collect()
}

impl Default for DatasetSchema {
    fn default() -> Self {
        Self {
            id_column: default_id_column(),
            name_column: default_name_column(),
            feature_columns: default_feature_columns(),
        }
    }
}

impl DatasetSchema {
    pub fn new(feature_columns: Vec<String>) -> Self {
        Self {
            feature_columns,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_id_column(mut self, column: Option<String>) -> Self {
        self.id_column = column;
        self
    }

    #[must_use]
    pub fn with_name_column(mut self, column: Option<String>) -> Self {
        self.name_column = column;
        self
    }

    pub fn dim(&self) -> usize {
        self.feature_columns.len()
    }

    pub fn validate(&self) -> Result<()> {
        if self.feature_columns.is_empty() {
            return Err(Error::InvalidConfig(
                "at least one feature column is required".to_string(),
            ));
        }
        let mut seen = ahash::AHashSet::new();
        for column in &self.feature_columns {
            if !seen.insert(column.as_str()) {
                return Err(Error::InvalidConfig(format!(
                    "duplicate feature column '{}'",
                    column
                )));
            }
        }
        Ok(())
    }

    /// True when `column` is consumed as id, name or feature
    pub fn is_known_column(&self, column: &str) -> bool {
        self.id_column.as_deref() == Some(column)
            || self.name_column.as_deref() == Some(column)
            || self.feature_columns.iter().any(|c| c == column)
    }
}
