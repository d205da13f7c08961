//! # shapematch Core
//!
//! Core library for ranking shaped records against a sculpted query.
//!
//! This crate provides the data model and the ranking algorithms:
//!
//! - [`FeatureVector`] - Fixed-length vector of nullable unit-interval values
//! - [`QueryVector`] - Dense, always fully specified target shape
//! - [`similarity`](similarity::similarity) - Cosine similarity over shared defined axes
//! - [`PeakFilter`] - Dominant-axis pre-filter
//! - [`Dataset`] - Immutable, normalized records built once at load
//! - [`RankingEngine`] - Filter, score, stable sort, truncate to top-N
//!
//! ## Example
//!
//! ```rust
//! use shapematch_core::{Dataset, FeatureVector, QueryVector, Record, RankingEngine};
//!
//! let keys = (1..=3).map(|i| format!("shape_{}", i)).collect();
//! let dataset = Dataset::new(keys, vec![
//!     Record::new("a", "Alpha", FeatureVector::new(vec![Some(1.0), Some(0.0), None])),
//!     Record::new("b", "Beta", FeatureVector::new(vec![Some(0.0), Some(1.0), Some(0.2)])),
//! ]).unwrap();
//!
//! let query = QueryVector::new(vec![0.9, 0.1, 0.0]);
//! let result = RankingEngine::default().top_n(&query, &dataset, 5);
//! assert_eq!(result.candidates[0].record.name, "Alpha");
//! ```

pub mod config;
pub mod dataset;
pub mod error;
pub mod explain;
pub mod normalize;
pub mod peak;
pub mod rank;
pub mod record;
pub mod similarity;
pub mod vector;

pub use config::{DatasetSchema, EngineConfig};
pub use dataset::{Dataset, DatasetBuilder};
pub use error::{Error, Result};
pub use explain::{RankedEntry, RankedResponse};
pub use normalize::{classify_cell, normalize, Cell, CellCounts, MISSING_SENTINELS};
pub use peak::{peak_axis, PeakFilter};
pub use rank::{top_n, RankedResult, RankingConfig, RankingEngine, RankingStats, ScoredCandidate};
pub use record::{Record, RecordId};
pub use similarity::{similarity, DEFAULT_MIN_COMMON_DIMS};
pub use vector::{FeatureVector, QueryVector, Shape, QUERY_MIDPOINT};
