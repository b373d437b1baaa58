//! Cachebind core — pull-based meter registry and the common cache
//! instrumentation contract.
//!
//! This crate provides the two halves shared by every cache adapter:
//!
//! - [`MeterRegistry`], a registry of lazily sampled meters ([`Gauge`],
//!   [`FunctionCounter`], [`FunctionTimer`]) identified by name plus
//!   [`Tags`], with Prometheus text exposition.
//! - [`CacheMeterBinder`], the contract a cache-specific adapter implements
//!   to publish the common metric set (size, gets, puts, evictions) plus its
//!   own technology-specific meters.
//!
//! Binding registers passive readers over the live cache object and returns
//! immediately; all metric values are pulled on demand at scrape time. A
//! binder must hold its cache handle weakly — instrumenting a cache never
//! extends the cache's lifetime, and a dropped cache simply stops reporting.
//!
//! # Usage
//!
//! ```ignore
//! use cachebind_core::{CacheMeterBinder, MeterRegistry, Tags};
//!
//! let registry = MeterRegistry::new();
//!
//! // An adapter crate supplies the binder for a concrete cache technology.
//! MyCacheMetrics::new(&cache, Tags::of([("zone", "a")]))?.bind_to(&registry);
//!
//! // Later, at scrape time:
//! let text = registry.to_prometheus();
//! ```

pub mod binder;
pub mod error;
pub mod meter;
pub mod registry;
pub mod tags;

pub use binder::CacheMeterBinder;
pub use error::Error;
pub use meter::{MeterId, MeterSample, MeterValue, Unit};
pub use registry::{
    FunctionCounter, FunctionCounterBuilder, FunctionTimer, FunctionTimerBuilder, Gauge,
    GaugeBuilder, MeterRegistry,
};
pub use tags::{Tag, Tags};
