//! Common cache binder contract.
//!
//! A binder adapts one cache technology's native statistics to the shared
//! metric set. Implementations supply accessors over a live cache handle;
//! the provided [`CacheMeterBinder::bind_to`] skeleton resolves the tag set,
//! registers the common meters, and delegates to the technology-specific
//! hook. A binder is constructed immediately before binding, used exactly
//! once, and may then be discarded — all later reads go straight from the
//! registered value functions to the cache handle.

use std::sync::Arc;

use tracing::debug;

use crate::registry::{FunctionCounter, Gauge, MeterRegistry};
use crate::tags::Tags;

/// Adapter contract between one cache instance and a [`MeterRegistry`].
///
/// Accessors return `Option<u64>`. While the cache handle is alive, `None`
/// means the underlying technology cannot supply that statistic; such
/// statistics are probed once at bind time and skipped entirely rather than
/// registered with a sentinel value, so consumers can distinguish "zero
/// observed" from "not supported". After the application drops its cache
/// handle, `None` means the meter no longer reports, which the registry
/// surfaces as absence from its samples.
pub trait CacheMeterBinder: Send + Sync + 'static {
    /// Stable display name of the cache, applied to every meter as the
    /// mandatory `cache` tag.
    fn cache_name(&self) -> &str;

    /// Caller-supplied tags applied to every meter this binder registers.
    fn tags(&self) -> &Tags;

    /// Number of entries held by the cache.
    fn size(&self) -> Option<u64>;

    /// Number of lookups that returned a cached value.
    fn hit_count(&self) -> Option<u64>;

    /// Number of lookups that found nothing cached.
    fn miss_count(&self) -> Option<u64>;

    /// Number of entries the cache has evicted.
    fn eviction_count(&self) -> Option<u64>;

    /// Number of entries added to the cache.
    fn put_count(&self) -> Option<u64>;

    /// Register meters beyond the common set. Invoked exactly once by
    /// [`CacheMeterBinder::bind_to`], after the common meters.
    fn bind_implementation_specific_metrics(self: Arc<Self>, registry: &MeterRegistry);

    /// The caller tags plus the mandatory `cache` name tag.
    fn tags_with_cache_name(&self) -> Tags {
        self.tags().and("cache", self.cache_name())
    }

    /// Register the common metric set, then the implementation-specific one.
    ///
    /// Intended to be called exactly once per binder instance; a second call
    /// would re-register the same identities and be dropped by the registry's
    /// deduplication.
    fn bind_to(self, registry: &MeterRegistry)
    where
        Self: Sized,
    {
        let binder = Arc::new(self);
        let tags = binder.tags_with_cache_name();
        debug!(cache = binder.cache_name(), tags = %tags, "binding cache meters");

        if binder.size().is_some() {
            let b = Arc::clone(&binder);
            Gauge::builder("cache.size", move || b.size().map(|v| v as f64))
                .tags(tags.clone())
                .description("The number of entries in this cache")
                .register(registry);
        }

        let b = Arc::clone(&binder);
        FunctionCounter::builder("cache.gets", move || b.hit_count())
            .tags(tags.clone())
            .tag("result", "hit")
            .description("The number of times cache lookup methods have returned a cached value")
            .register(registry);

        if binder.miss_count().is_some() {
            let b = Arc::clone(&binder);
            FunctionCounter::builder("cache.gets", move || b.miss_count())
                .tags(tags.clone())
                .tag("result", "miss")
                .description(
                    "The number of times cache lookup methods have not returned a cached value",
                )
                .register(registry);
        }

        let b = Arc::clone(&binder);
        FunctionCounter::builder("cache.puts", move || b.put_count())
            .tags(tags.clone())
            .description("The number of entries added to the cache")
            .register(registry);

        if binder.eviction_count().is_some() {
            let b = Arc::clone(&binder);
            FunctionCounter::builder("cache.evictions", move || b.eviction_count())
                .tags(tags.clone())
                .description("The number of entries evicted from the cache")
                .register(registry);
        }

        binder.bind_implementation_specific_metrics(registry);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU64, Ordering};

    use super::*;

    struct TestBinder {
        tags: Tags,
        size: Option<u64>,
        hits: Arc<AtomicU64>,
        misses: Option<u64>,
        evictions: Option<u64>,
        puts: u64,
    }

    impl TestBinder {
        fn full() -> Self {
            Self {
                tags: Tags::of([("zone", "a")]),
                size: Some(3),
                hits: Arc::new(AtomicU64::new(1)),
                misses: Some(2),
                evictions: Some(0),
                puts: 4,
            }
        }

        fn partial() -> Self {
            Self {
                misses: None,
                evictions: None,
                ..Self::full()
            }
        }
    }

    impl CacheMeterBinder for TestBinder {
        fn cache_name(&self) -> &str {
            "users"
        }

        fn tags(&self) -> &Tags {
            &self.tags
        }

        fn size(&self) -> Option<u64> {
            self.size
        }

        fn hit_count(&self) -> Option<u64> {
            Some(self.hits.load(Ordering::Relaxed))
        }

        fn miss_count(&self) -> Option<u64> {
            self.misses
        }

        fn eviction_count(&self) -> Option<u64> {
            self.evictions
        }

        fn put_count(&self) -> Option<u64> {
            Some(self.puts)
        }

        fn bind_implementation_specific_metrics(self: Arc<Self>, registry: &MeterRegistry) {
            Gauge::builder("cache.custom", || Some(1.0))
                .tags(self.tags_with_cache_name())
                .register(registry);
        }
    }

    fn base_tags() -> Tags {
        Tags::of([("cache", "users"), ("zone", "a")])
    }

    #[test]
    fn test_full_binder_registers_common_set_and_hook() {
        let registry = MeterRegistry::new();
        TestBinder::full().bind_to(&registry);

        assert!(registry.contains("cache.size", &base_tags()));
        assert!(registry.contains("cache.gets", &base_tags().and("result", "hit")));
        assert!(registry.contains("cache.gets", &base_tags().and("result", "miss")));
        assert!(registry.contains("cache.puts", &base_tags()));
        assert!(registry.contains("cache.evictions", &base_tags()));
        assert!(registry.contains("cache.custom", &base_tags()));
        assert_eq!(registry.len(), 6);
    }

    #[test]
    fn test_unavailable_statistics_are_not_registered() {
        let registry = MeterRegistry::new();
        TestBinder::partial().bind_to(&registry);

        assert!(!registry.contains("cache.gets", &base_tags().and("result", "miss")));
        assert!(!registry.contains("cache.evictions", &base_tags()));
        assert!(registry.contains("cache.gets", &base_tags().and("result", "hit")));
        assert_eq!(registry.len(), 4);
    }

    #[test]
    fn test_cache_tag_merged_into_caller_tags() {
        let registry = MeterRegistry::new();
        TestBinder::full().bind_to(&registry);

        let sample = registry.sample("cache.puts", &base_tags()).unwrap();
        assert_eq!(sample.id.tags().get("cache"), Some("users"));
        assert_eq!(sample.id.tags().get("zone"), Some("a"));
    }

    #[test]
    fn test_registered_meters_read_live_values() {
        let registry = MeterRegistry::new();
        let binder = TestBinder::full();
        let hits = Arc::clone(&binder.hits);
        binder.bind_to(&registry);

        let hit_tags = base_tags().and("result", "hit");
        let read = |registry: &MeterRegistry| match registry.sample("cache.gets", &hit_tags) {
            Some(sample) => sample.value,
            None => panic!("hit counter not registered"),
        };

        assert_eq!(read(&registry), crate::MeterValue::Counter { count: 1 });
        hits.store(9, Ordering::Relaxed);
        assert_eq!(read(&registry), crate::MeterValue::Counter { count: 9 });
    }
}
