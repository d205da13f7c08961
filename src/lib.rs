//! # shapematch
//!
//! Rank the records most similar to a user-sculpted shape, in real time.
//!
//! Each record carries up to K partially observed feature values in [0, 1].
//! A query is a fully specified K-vector moved by sliders. Every change
//! schedules a throttled recompute that:
//!
//! 1. drops records whose dominant (peak) axis differs from the query's,
//! 2. scores the rest with cosine similarity over the axes both sides define,
//! 3. publishes the top-N, best first, to every subscriber.
//!
//! ## Quick Start
//!
//! ### As a CLI
//!
//! ```bash
//! shapematch --data shapes.csv --query 1,0,0,0,0,0 --top-n 5
//! shapematch --data shapes.csv --interactive
//! ```
//!
//! ### As a Library
//!
//! ```rust,no_run
//! use shapematch::prelude::*;
//! use std::sync::Arc;
//!
//! let config = EngineConfig::default();
//! let dataset = load_dataset_from_path("shapes.csv", &config.dataset).unwrap();
//! let session = Session::new(Arc::new(dataset), &config).unwrap();
//!
//! session.subscribe(|result| {
//!     for candidate in result.iter() {
//!         println!("{} {:.3}", candidate.record.name, candidate.score);
//!     }
//! });
//! session.set_axis(2, 0.9).unwrap();
//! session.flush();
//! ```
//!
//! ## Crate Structure
//!
//! - [`shapematch-core`](https://docs.rs/shapematch-core) - Vectors, similarity, peak filter, dataset, ranking
//! - [`shapematch-ingest`](https://docs.rs/shapematch-ingest) - CSV loading
//! - [`shapematch-session`](https://docs.rs/shapematch-session) - Query state, throttled scheduler, subscriptions

// Re-export core types
pub use shapematch_core::{
    peak_axis, similarity, top_n, Dataset, DatasetSchema, EngineConfig, Error, FeatureVector,
    PeakFilter, QueryVector, RankedEntry, RankedResponse, RankedResult, RankingEngine,
    RankingStats, Record, RecordId, Result, ScoredCandidate, Shape,
};

// Re-export ingestion
pub use shapematch_ingest::{load_dataset, load_dataset_from_path, read_rows};

// Re-export session
pub use shapematch_session::{spawn_driver, Session, SessionStatus, SubscriptionId, UpdateScheduler};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        load_dataset, load_dataset_from_path, spawn_driver, Dataset, DatasetSchema, EngineConfig,
        Error, FeatureVector, QueryVector, RankedResponse, RankedResult, RankingEngine, Record,
        RecordId, Result, Session, SessionStatus, Shape,
    };
}
