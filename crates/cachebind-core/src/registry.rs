//! Pull-based meter registry.
//!
//! Meters are registered once with a value-producing function and sampled on
//! demand, at scrape time, by whatever thread asks. The registry never polls
//! and holds no background threads; a meter whose value function returns
//! `None` (its subject has been dropped) simply stops reporting.
//!
//! # Usage
//!
//! ```
//! use cachebind_core::{FunctionCounter, Gauge, MeterRegistry, Tags};
//!
//! let registry = MeterRegistry::new();
//!
//! Gauge::builder("cache.size", || Some(42.0))
//!     .tags(Tags::of([("cache", "users")]))
//!     .description("The number of entries in this cache")
//!     .register(&registry);
//!
//! FunctionCounter::builder("cache.puts", || Some(7))
//!     .tag("cache", "users")
//!     .register(&registry);
//!
//! let text = registry.to_prometheus();
//! assert!(text.contains("cache_puts_total{cache=\"users\"} 7"));
//! ```

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use parking_lot::RwLock;
use tracing::debug;

use crate::meter::{MeterId, MeterSample, MeterValue, Unit};
use crate::tags::Tags;

type GaugeFn = Box<dyn Fn() -> Option<f64> + Send + Sync>;
type CounterFn = Box<dyn Fn() -> Option<u64> + Send + Sync>;

enum MeterFn {
    Gauge(GaugeFn),
    Counter(CounterFn),
    Timer { count: CounterFn, total_ns: CounterFn },
}

struct RegisteredMeter {
    unit: Option<Unit>,
    description: Option<String>,
    read: MeterFn,
}

impl RegisteredMeter {
    fn observe(&self) -> Option<MeterValue> {
        match &self.read {
            MeterFn::Gauge(f) => f().map(|value| MeterValue::Gauge { value }),
            MeterFn::Counter(f) => f().map(|count| MeterValue::Counter { count }),
            MeterFn::Timer { count, total_ns } => match (count(), total_ns()) {
                (Some(count), Some(total_ns)) => Some(MeterValue::Timer { count, total_ns }),
                _ => None,
            },
        }
    }
}

/// Registry of pull-based meters, deduplicated on [`MeterId`].
///
/// Registration and sampling are safe to call concurrently from any thread.
/// The first registration of a given (name, tags) identity wins; later
/// attempts are ignored.
#[derive(Default)]
pub struct MeterRegistry {
    meters: RwLock<HashMap<MeterId, RegisteredMeter>>,
}

impl MeterRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of registered meters, including ones that no longer report.
    pub fn len(&self) -> usize {
        self.meters.read().len()
    }

    /// Whether no meters have been registered.
    pub fn is_empty(&self) -> bool {
        self.meters.read().is_empty()
    }

    /// Whether a meter with this exact (name, tags) identity is registered.
    pub fn contains(&self, name: &str, tags: &Tags) -> bool {
        self.meters
            .read()
            .contains_key(&MeterId::new(name, tags.clone()))
    }

    /// Sample one meter by identity.
    ///
    /// Returns `None` if no such meter is registered or if its value function
    /// no longer reports.
    pub fn sample(&self, name: &str, tags: &Tags) -> Option<MeterSample> {
        let id = MeterId::new(name, tags.clone());
        let meters = self.meters.read();
        let meter = meters.get(&id)?;
        let value = meter.observe()?;
        Some(MeterSample {
            id,
            unit: meter.unit,
            description: meter.description.clone(),
            value,
        })
    }

    /// Sample every reporting meter, sorted by (name, tags).
    ///
    /// Meters whose value function returns `None` are omitted from the
    /// result; their absence is the signal that the instrumented subject has
    /// gone away.
    pub fn samples(&self) -> Vec<MeterSample> {
        let meters = self.meters.read();
        let mut samples: Vec<MeterSample> = meters
            .iter()
            .filter_map(|(id, meter)| {
                meter.observe().map(|value| MeterSample {
                    id: id.clone(),
                    unit: meter.unit,
                    description: meter.description.clone(),
                    value,
                })
            })
            .collect();
        samples.sort_by(|a, b| a.id.cmp(&b.id));
        samples
    }

    /// Render all reporting meters in Prometheus text exposition format.
    ///
    /// Meter names have `.` mapped to `_`; counters are suffixed `_total`;
    /// timers expand to `<name>_count` and `<name>_duration_ns_total` so the
    /// mean latency stays derivable from independently inspectable series.
    pub fn to_prometheus(&self) -> String {
        let mut blocks: BTreeMap<String, (Option<String>, &'static str, Vec<String>)> =
            BTreeMap::new();

        for sample in self.samples() {
            let base = prom_name(sample.id.name());
            let labels = prom_labels(sample.id.tags());
            let help = sample.description.as_deref();

            match sample.value {
                MeterValue::Gauge { value } => {
                    push_series(&mut blocks, &base, "gauge", help, &labels, value);
                }
                MeterValue::Counter { count } => {
                    push_series(
                        &mut blocks,
                        &format!("{base}_total"),
                        "counter",
                        help,
                        &labels,
                        count,
                    );
                }
                MeterValue::Timer { count, total_ns } => {
                    push_series(
                        &mut blocks,
                        &format!("{base}_count"),
                        "counter",
                        help,
                        &labels,
                        count,
                    );
                    push_series(
                        &mut blocks,
                        &format!("{base}_duration_ns_total"),
                        "counter",
                        help,
                        &labels,
                        total_ns,
                    );
                }
            }
        }

        let mut out = String::new();
        for (name, (help, kind, lines)) in blocks {
            if let Some(help) = help {
                out.push_str(&format!("# HELP {name} {help}\n"));
            }
            out.push_str(&format!("# TYPE {name} {kind}\n"));
            for line in lines {
                out.push_str(&line);
                out.push('\n');
            }
            out.push('\n');
        }
        out
    }

    fn insert(&self, id: MeterId, meter: RegisteredMeter) {
        use std::collections::hash_map::Entry;

        let mut meters = self.meters.write();
        match meters.entry(id) {
            Entry::Occupied(existing) => {
                debug!(
                    meter = %existing.key().name(),
                    tags = %existing.key().tags(),
                    "ignoring duplicate meter registration"
                );
            }
            Entry::Vacant(slot) => {
                slot.insert(meter);
            }
        }
    }
}

impl fmt::Debug for MeterRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MeterRegistry")
            .field("meters", &self.len())
            .finish()
    }
}

fn prom_name(name: &str) -> String {
    name.replace('.', "_")
}

fn prom_labels(tags: &Tags) -> String {
    if tags.is_empty() {
        return String::new();
    }
    let rendered: Vec<String> = tags
        .iter()
        .map(|tag| format!("{}=\"{}\"", tag.key(), tag.value()))
        .collect();
    format!("{{{}}}", rendered.join(","))
}

fn push_series(
    blocks: &mut BTreeMap<String, (Option<String>, &'static str, Vec<String>)>,
    name: &str,
    kind: &'static str,
    help: Option<&str>,
    labels: &str,
    value: impl fmt::Display,
) {
    let block = blocks
        .entry(name.to_string())
        .or_insert_with(|| (help.map(str::to_string), kind, Vec::new()));
    block.2.push(format!("{name}{labels} {value}"));
}

/// Builder entry point for point-in-time gauges.
pub struct Gauge;

impl Gauge {
    /// Start building a gauge that calls `f` on every sample.
    pub fn builder<F>(name: impl Into<String>, f: F) -> GaugeBuilder
    where
        F: Fn() -> Option<f64> + Send + Sync + 'static,
    {
        GaugeBuilder {
            name: name.into(),
            tags: Tags::empty(),
            unit: None,
            description: None,
            f: Box::new(f),
        }
    }
}

/// Configures and registers a gauge.
pub struct GaugeBuilder {
    name: String,
    tags: Tags,
    unit: Option<Unit>,
    description: Option<String>,
    f: GaugeFn,
}

impl GaugeBuilder {
    /// Merge a tag set into the gauge's tags.
    pub fn tags(mut self, tags: Tags) -> Self {
        self.tags = self.tags.merge(&tags);
        self
    }

    /// Add a single tag.
    pub fn tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags = self.tags.and(key, value);
        self
    }

    /// Declare the gauge's base unit.
    pub fn unit(mut self, unit: Unit) -> Self {
        self.unit = Some(unit);
        self
    }

    /// Attach a human-readable description.
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Register the gauge. A meter already registered under the same
    /// (name, tags) identity is left in place.
    pub fn register(self, registry: &MeterRegistry) {
        registry.insert(
            MeterId::new(self.name, self.tags),
            RegisteredMeter {
                unit: self.unit,
                description: self.description,
                read: MeterFn::Gauge(self.f),
            },
        );
    }
}

/// Builder entry point for monotonic counters read from a counter function.
pub struct FunctionCounter;

impl FunctionCounter {
    /// Start building a counter that calls `f` on every sample.
    pub fn builder<F>(name: impl Into<String>, f: F) -> FunctionCounterBuilder
    where
        F: Fn() -> Option<u64> + Send + Sync + 'static,
    {
        FunctionCounterBuilder {
            name: name.into(),
            tags: Tags::empty(),
            unit: None,
            description: None,
            f: Box::new(f),
        }
    }
}

/// Configures and registers a function counter.
pub struct FunctionCounterBuilder {
    name: String,
    tags: Tags,
    unit: Option<Unit>,
    description: Option<String>,
    f: CounterFn,
}

impl FunctionCounterBuilder {
    /// Merge a tag set into the counter's tags.
    pub fn tags(mut self, tags: Tags) -> Self {
        self.tags = self.tags.merge(&tags);
        self
    }

    /// Add a single tag.
    pub fn tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags = self.tags.and(key, value);
        self
    }

    /// Declare the counter's base unit.
    pub fn unit(mut self, unit: Unit) -> Self {
        self.unit = Some(unit);
        self
    }

    /// Attach a human-readable description.
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Register the counter. A meter already registered under the same
    /// (name, tags) identity is left in place.
    pub fn register(self, registry: &MeterRegistry) {
        registry.insert(
            MeterId::new(self.name, self.tags),
            RegisteredMeter {
                unit: self.unit,
                description: self.description,
                read: MeterFn::Counter(self.f),
            },
        );
    }
}

/// Builder entry point for timers read from a (count, total duration) pair of
/// accumulator functions.
pub struct FunctionTimer;

impl FunctionTimer {
    /// Start building a timer that samples `count` and `total_ns` on every
    /// read. Rate and mean latency are derived by consumers from the two raw
    /// values, never precomputed here.
    pub fn builder<C, T>(name: impl Into<String>, count: C, total_ns: T) -> FunctionTimerBuilder
    where
        C: Fn() -> Option<u64> + Send + Sync + 'static,
        T: Fn() -> Option<u64> + Send + Sync + 'static,
    {
        FunctionTimerBuilder {
            name: name.into(),
            tags: Tags::empty(),
            description: None,
            count: Box::new(count),
            total_ns: Box::new(total_ns),
        }
    }
}

/// Configures and registers a function timer.
pub struct FunctionTimerBuilder {
    name: String,
    tags: Tags,
    description: Option<String>,
    count: CounterFn,
    total_ns: CounterFn,
}

impl FunctionTimerBuilder {
    /// Merge a tag set into the timer's tags.
    pub fn tags(mut self, tags: Tags) -> Self {
        self.tags = self.tags.merge(&tags);
        self
    }

    /// Add a single tag.
    pub fn tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags = self.tags.and(key, value);
        self
    }

    /// Attach a human-readable description.
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Register the timer. A meter already registered under the same
    /// (name, tags) identity is left in place.
    pub fn register(self, registry: &MeterRegistry) {
        registry.insert(
            MeterId::new(self.name, self.tags),
            RegisteredMeter {
                unit: Some(Unit::Nanoseconds),
                description: self.description,
                read: MeterFn::Timer {
                    count: self.count,
                    total_ns: self.total_ns,
                },
            },
        );
    }
}
