//! # stream-dedupe
//!
//! Time-windowed duplicate suppression for stream processing pipelines.
//!
//! Each element is mapped to a key by a user-supplied selector. The first
//! element carrying a key is admitted and the key is remembered for a fixed
//! expiration window; later elements with the same key are rejected until
//! the window, measured from that first sighting, has elapsed.
//!
//! ## Quick Start
//!
//! ```rust
//! use stream_dedupe::{key_fn, DedupeFilter};
//! use std::time::Duration;
//!
//! #[derive(Debug)]
//! struct Click {
//!     user: u64,
//!     button: &'static str,
//! }
//!
//! let mut filter = DedupeFilter::new(
//!     key_fn(|c: &Click| (c.user, c.button)),
//!     Duration::from_secs(5),
//! )
//! .unwrap();
//!
//! // Host pipelines call this once before the first element
//! filter.initialize().unwrap();
//!
//! assert!(filter.evaluate(&Click { user: 1, button: "buy" }).unwrap());
//! assert!(!filter.evaluate(&Click { user: 1, button: "buy" }).unwrap());
//! assert!(filter.evaluate(&Click { user: 2, button: "buy" }).unwrap());
//! ```
//!
//! ## Expiry Semantics
//!
//! - **Write-time expiry**: a key expires `expiration` after it was
//!   recorded. Duplicate sightings never extend the window.
//! - **Boundary**: an entry whose age is `>= expiration` is expired. With a
//!   1000ms window, a key recorded at t=0 is rejected at t=999 and admitted
//!   again at t=1000.
//! - **Logical before physical**: expired keys are never reported as seen,
//!   even while they still occupy memory. They are overwritten in place on
//!   their next sighting, or removed in bulk by the sweeper.
//!
//! ## Concurrency
//!
//! `evaluate` takes `&self`. The default seen set
//! ([`ShardedExpiringSet`]) performs its freshness check and insert under
//! one shard lock, so when several threads race on the same key exactly one
//! of them is admitted.
//!
//! ## Pipeline Integration
//!
//! [`DedupeOperator`] packages the filter for a host pipeline through the
//! [`FilterFunction`] port (`open` once, then `filter` per element), and can
//! be configured from a [`DedupeConfig`]:
//!
//! ```rust
//! use stream_dedupe::{key_fn, DedupeConfig, DedupeIteratorExt, DedupeOperator};
//!
//! let config: DedupeConfig = serde_json::from_str(r#"{"expiration_ms": 60000}"#).unwrap();
//! let op = DedupeOperator::builder(key_fn(|line: &&str| line.to_string()))
//!     .with_config(&config)
//!     .build()
//!     .unwrap();
//!
//! let lines = ["boot", "tick", "tick", "halt"];
//! let unique: Vec<_> = lines.into_iter().deduplicate(op).collect::<Result<_, _>>().unwrap();
//! assert_eq!(unique, ["boot", "tick", "halt"]);
//! ```
//!
//! ## Background Sweeping
//!
//! With the `async` feature (on by default), setting a sweep interval makes
//! `open` spawn a tokio task that purges expired keys periodically:
//!
//! ```rust,no_run
//! # use stream_dedupe::{key_fn, DedupeOperator, FilterFunction};
//! # use std::time::Duration;
//! # async fn example() {
//! let mut op = DedupeOperator::builder(key_fn(|id: &u64| *id))
//!     .with_expiration(Duration::from_secs(300))
//!     .with_sweep_interval(Duration::from_secs(30))
//!     .build()
//!     .unwrap();
//!
//! op.open().unwrap();
//! // ... process elements ...
//! op.shutdown().await.expect("sweeper shutdown failed");
//! # }
//! ```
//!
//! ## Observability
//!
//! ```rust,no_run
//! # use stream_dedupe::{key_fn, DedupeFilter};
//! # use std::time::Duration;
//! # let filter = DedupeFilter::new(key_fn(|n: &u32| *n), Duration::from_secs(1)).unwrap();
//! let snapshot = filter.metrics().snapshot();
//! println!("admitted: {}", snapshot.elements_admitted);
//! println!("duplicates: {:.1}%", snapshot.duplicate_rate() * 100.0);
//! println!("tracked keys: {}", filter.tracked_keys());
//! ```
//!
//! Decisions are logged through `tracing` (`trace` per element, `warn` on
//! key extraction failures, `debug` for lifecycle and sweeps). The crate
//! never installs a subscriber.

// Domain layer - pure types
pub mod domain;

// Application layer - orchestration
pub mod application;

// Infrastructure layer - external adapters
pub mod infrastructure;

// Re-export commonly used types for convenience
pub use domain::{
    decision::Decision,
    key::{key_fn, try_key_fn, FnKeySelector, KeyExtractionError, KeySelector, TryFnKeySelector},
    window::{ConfigError, ExpirationWindow},
};

pub use application::{
    filter::{DedupeFilter, FilterError},
    metrics::{Metrics, MetricsSnapshot},
    ports::{Clock, ExpiringSet, FilterFunction},
    sweeper::{ExpirySweeper, ShutdownError, SweeperConfig, SweeperConfigError},
};

#[cfg(feature = "async")]
pub use application::sweeper::SweeperHandle;

pub use infrastructure::{
    clock::SystemClock,
    config::{DedupeConfig, DedupeSettings},
    operator::{BuildError, DedupeOperator, DedupeOperatorBuilder},
    storage::ShardedExpiringSet,
    stream::{DedupeIteratorExt, Deduplicated},
};
