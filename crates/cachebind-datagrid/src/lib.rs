//! Cachebind adapter for distributed data-grid maps.
//!
//! Maps a grid map's partition-local statistics onto the common cache
//! metric set and adds grid-specific meters: entry counts and memory cost
//! split by `ownership=owned|backup`, partition get totals, per-operation
//! latency timers, and — when configured — near-cache usage.
//!
//! The grid exposes no native miss or eviction counter for the distributed
//! map, so `cache.gets{result=miss}` and `cache.evictions` are never
//! registered by this adapter; absence of the meter is the signal.
//!
//! # Usage
//!
//! ```
//! use std::sync::Arc;
//!
//! use cachebind_core::{MeterRegistry, Tags};
//! use cachebind_datagrid::{GridMap, GridMapMetrics, LocalMapStats};
//!
//! struct UsersMap;
//!
//! impl GridMap for UsersMap {
//!     fn name(&self) -> &str {
//!         "users"
//!     }
//!
//!     fn local_map_stats(&self) -> LocalMapStats {
//!         LocalMapStats {
//!             owned_entry_count: 10,
//!             hits: 7,
//!             ..LocalMapStats::default()
//!         }
//!     }
//! }
//!
//! let registry = MeterRegistry::new();
//! let cache = Arc::new(UsersMap);
//!
//! // The returned handle is the same Arc, never a wrapper.
//! let cache = GridMapMetrics::monitor(&registry, cache, Tags::empty()).unwrap();
//!
//! assert_eq!(cache.name(), "users");
//! assert!(registry.contains("cache.size", &Tags::of([("cache", "users")])));
//! ```

pub mod binder;
pub mod map;
pub mod stats;

pub use binder::GridMapMetrics;
pub use map::GridMap;
pub use stats::{LocalMapStats, NearCacheStats};
