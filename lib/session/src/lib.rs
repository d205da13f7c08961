//! # shapematch Session
//!
//! Interactive query state for shapematch.
//!
//! A [`Session`] owns the current query and republishes the top-N ranking
//! whenever the query changes. Input bursts (slider drags) are coalesced by an
//! [`UpdateScheduler`] into one recompute per throttle window, always using
//! the latest query value.
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use shapematch_core::{Dataset, EngineConfig, FeatureVector, Record};
//! use shapematch_session::Session;
//!
//! let config = EngineConfig::default();
//! let records = vec![Record::new(
//!     "a",
//!     "Alpha",
//!     FeatureVector::new(vec![Some(0.9), Some(0.1), Some(0.1), None, Some(0.2), Some(0.1)]),
//! )];
//! let dataset = Arc::new(Dataset::new(config.dataset.feature_columns.clone(), records).unwrap());
//!
//! let session = Session::new(dataset, &config).unwrap();
//! session.subscribe(|result| println!("{} results", result.len()));
//!
//! session.set_axis(0, 1.0).unwrap();
//! session.set_axis(0, 0.95).unwrap();
//! let result = session.flush().unwrap();
//! assert_eq!(result.generation, 1);
//! ```

pub mod driver;
pub mod query;
pub mod scheduler;
pub mod session;

pub use driver::spawn_driver;
pub use query::QueryState;
pub use scheduler::{SchedulerState, UpdateScheduler};
pub use session::{Session, SessionStatus, Subscriber, SubscriptionId};
