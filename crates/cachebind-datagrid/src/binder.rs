//! Meter binder for distributed-map partition statistics.

use std::sync::{Arc, Weak};

use tracing::debug;

use cachebind_core::{
    CacheMeterBinder, Error, FunctionCounter, FunctionTimer, Gauge, MeterRegistry, Tags, Unit,
};

use crate::map::GridMap;
use crate::stats::LocalMapStats;

/// Binds a distributed map's partition-local statistics to a
/// [`MeterRegistry`], including storage split by ownership, near-cache
/// usage, and per-operation timings.
///
/// The binder holds the map weakly: once the application drops its last
/// strong handle, every meter registered here stops reporting. The map is
/// never wrapped or proxied.
#[derive(Debug)]
pub struct GridMapMetrics<C> {
    cache: Weak<C>,
    name: String,
    tags: Tags,
}

impl<C: GridMap> GridMapMetrics<C> {
    /// Create a binder for `cache`.
    ///
    /// Fails with [`Error::UnnamedCache`] if the map reports an empty name;
    /// the name is the mandatory `cache` tag and must be resolvable up
    /// front, not at bind time.
    pub fn new(cache: &Arc<C>, tags: Tags) -> Result<Self, Error> {
        let name = cache.name().to_string();
        if name.is_empty() {
            return Err(Error::UnnamedCache);
        }
        Ok(Self {
            cache: Arc::downgrade(cache),
            name,
            tags,
        })
    }

    /// Record metrics on `cache`, returning the handle unchanged.
    ///
    /// The returned `Arc` is the same allocation that was passed in, so
    /// callers can write `cache = GridMapMetrics::monitor(&registry, cache,
    /// tags)?` and keep using it as before.
    pub fn monitor(
        registry: &MeterRegistry,
        cache: Arc<C>,
        tags: Tags,
    ) -> Result<Arc<C>, Error> {
        GridMapMetrics::new(&cache, tags)?.bind_to(registry);
        Ok(cache)
    }

    fn stats(&self) -> Option<LocalMapStats> {
        self.cache.upgrade().map(|cache| cache.local_map_stats())
    }

    fn storage_metrics(binder: &Arc<Self>, registry: &MeterRegistry, tags: &Tags) {
        let b = Arc::clone(binder);
        Gauge::builder("cache.entries", move || {
            b.stats().map(|s| s.backup_entry_count as f64)
        })
        .tags(tags.clone())
        .tag("ownership", "backup")
        .description("The number of backup entries held by this member")
        .register(registry);

        let b = Arc::clone(binder);
        Gauge::builder("cache.entries", move || {
            b.stats().map(|s| s.owned_entry_count as f64)
        })
        .tags(tags.clone())
        .tag("ownership", "owned")
        .description("The number of owned entries held by this member")
        .register(registry);

        let b = Arc::clone(binder);
        Gauge::builder("cache.entry.memory", move || {
            b.stats().map(|s| s.backup_entry_memory_cost as f64)
        })
        .tags(tags.clone())
        .tag("ownership", "backup")
        .description("Memory cost of backup entries held by this member")
        .unit(Unit::Bytes)
        .register(registry);

        let b = Arc::clone(binder);
        Gauge::builder("cache.entry.memory", move || {
            b.stats().map(|s| s.owned_entry_memory_cost as f64)
        })
        .tags(tags.clone())
        .tag("ownership", "owned")
        .description("Memory cost of owned entries held by this member")
        .unit(Unit::Bytes)
        .register(registry);

        let b = Arc::clone(binder);
        FunctionCounter::builder("cache.partition.gets", move || {
            b.stats().map(|s| s.get_operation_count)
        })
        .tags(tags.clone())
        .description("The total number of get operations executed against this partition")
        .register(registry);
    }

    fn timings(binder: &Arc<Self>, registry: &MeterRegistry, tags: &Tags) {
        let count = Arc::clone(binder);
        let total = Arc::clone(binder);
        FunctionTimer::builder(
            "cache.gets.latency",
            move || count.stats().map(|s| s.get_operation_count),
            move || total.stats().map(|s| s.total_get_latency_ns),
        )
        .tags(tags.clone())
        .description("Cache gets")
        .register(registry);

        let count = Arc::clone(binder);
        let total = Arc::clone(binder);
        FunctionTimer::builder(
            "cache.puts.latency",
            move || count.stats().map(|s| s.put_operation_count),
            move || total.stats().map(|s| s.total_put_latency_ns),
        )
        .tags(tags.clone())
        .description("Cache puts")
        .register(registry);

        let count = Arc::clone(binder);
        let total = Arc::clone(binder);
        FunctionTimer::builder(
            "cache.removals.latency",
            move || count.stats().map(|s| s.remove_operation_count),
            move || total.stats().map(|s| s.total_remove_latency_ns),
        )
        .tags(tags.clone())
        .description("Cache removals")
        .register(registry);
    }

    // Registered only when the map reports a near-cache stats object at bind
    // time. Absence of the four meters is the signal that no near cache is
    // configured, so no zero-valued placeholders are registered.
    fn near_cache_metrics(binder: &Arc<Self>, registry: &MeterRegistry, tags: &Tags) {
        let configured = binder
            .stats()
            .map_or(false, |s| s.near_cache.is_some());
        if !configured {
            debug!(cache = %binder.name, "no near cache configured, skipping near-cache meters");
            return;
        }

        let b = Arc::clone(binder);
        Gauge::builder("cache.near.requests", move || {
            b.stats().and_then(|s| s.near_cache).map(|n| n.hits as f64)
        })
        .tags(tags.clone())
        .tag("result", "hit")
        .description("The number of hits (reads) of near cache entries owned by this member")
        .register(registry);

        let b = Arc::clone(binder);
        Gauge::builder("cache.near.requests", move || {
            b.stats()
                .and_then(|s| s.near_cache)
                .map(|n| n.misses as f64)
        })
        .tags(tags.clone())
        .tag("result", "miss")
        .description("The number of misses (reads) of near cache entries owned by this member")
        .register(registry);

        let b = Arc::clone(binder);
        Gauge::builder("cache.near.evictions", move || {
            b.stats()
                .and_then(|s| s.near_cache)
                .map(|n| n.evictions as f64)
        })
        .tags(tags.clone())
        .description("The number of evictions of near cache entries owned by this member")
        .register(registry);

        let b = Arc::clone(binder);
        Gauge::builder("cache.near.persistences", move || {
            b.stats()
                .and_then(|s| s.near_cache)
                .map(|n| n.persistence_count as f64)
        })
        .tags(tags.clone())
        .description("The number of near cache key persistences (pre-load feature)")
        .register(registry);
    }
}

impl<C: GridMap> CacheMeterBinder for GridMapMetrics<C> {
    fn cache_name(&self) -> &str {
        &self.name
    }

    fn tags(&self) -> &Tags {
        &self.tags
    }

    /// Locally owned entry count. Cluster-wide size is not knowable from one
    /// member's handle.
    fn size(&self) -> Option<u64> {
        self.stats().map(|s| s.owned_entry_count)
    }

    /// Hits against entries held in this partition.
    ///
    /// Not every hit counted here resulted from a get against this handle:
    /// a get issued through another member's handle of the same logical map
    /// is recorded against the partition that holds the entry. This
    /// cross-attribution is inherent to partition-local statistics.
    fn hit_count(&self) -> Option<u64> {
        self.stats().map(|s| s.hits)
    }

    /// The grid provides no native miss counter, so misses are reported
    /// unavailable rather than estimated.
    fn miss_count(&self) -> Option<u64> {
        None
    }

    /// The grid provides no native eviction counter for the distributed map
    /// itself (near-cache evictions are tracked separately).
    fn eviction_count(&self) -> Option<u64> {
        None
    }

    /// Put operations executed against this partition.
    fn put_count(&self) -> Option<u64> {
        self.stats().map(|s| s.put_operation_count)
    }

    fn bind_implementation_specific_metrics(self: Arc<Self>, registry: &MeterRegistry) {
        let tags = self.tags_with_cache_name();

        Self::storage_metrics(&self, registry, &tags);
        Self::timings(&self, registry, &tags);
        Self::near_cache_metrics(&self, registry, &tags);
    }
}
