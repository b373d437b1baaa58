//! Meter identity, descriptors, and sampled values.

use serde::{Deserialize, Serialize};

use crate::tags::Tags;

/// Base unit of a meter's value, carried as descriptor payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Unit {
    /// Size in bytes.
    Bytes,
    /// Number of entries.
    Entries,
    /// Duration in nanoseconds.
    Nanoseconds,
}

impl Unit {
    /// Unit name as it appears in exposition output.
    pub fn as_str(&self) -> &'static str {
        match self {
            Unit::Bytes => "bytes",
            Unit::Entries => "entries",
            Unit::Nanoseconds => "nanoseconds",
        }
    }
}

/// Registry identity of a meter: its name plus its tag set.
///
/// Unit and description are not part of the identity; the registry
/// deduplicates registrations on `MeterId` alone.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MeterId {
    name: String,
    tags: Tags,
}

impl MeterId {
    /// Create an identity from a name and a tag set.
    pub fn new(name: impl Into<String>, tags: Tags) -> Self {
        Self {
            name: name.into(),
            tags,
        }
    }

    /// Meter name, e.g. `cache.gets`.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Tag set distinguishing this series from others with the same name.
    pub fn tags(&self) -> &Tags {
        &self.tags
    }
}

/// Value read from a meter at sample time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MeterValue {
    /// Point-in-time value; may decrease between samples.
    Gauge {
        /// Sampled value.
        value: f64,
    },
    /// Monotonically increasing count read from a counter function.
    Counter {
        /// Sampled count.
        count: u64,
    },
    /// Count plus cumulative duration read from two accumulator functions.
    Timer {
        /// Number of recorded operations.
        count: u64,
        /// Cumulative duration of all recorded operations, in nanoseconds.
        total_ns: u64,
    },
}

impl MeterValue {
    /// Mean duration per operation in nanoseconds, derived at read time.
    ///
    /// Returns `None` for non-timer values and for timers that have not yet
    /// recorded any operation, so consumers never divide by zero.
    pub fn mean_ns(&self) -> Option<f64> {
        match self {
            MeterValue::Timer { count, total_ns } if *count > 0 => {
                Some(*total_ns as f64 / *count as f64)
            }
            _ => None,
        }
    }
}

/// One observation produced by [`crate::MeterRegistry::samples`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeterSample {
    /// Identity of the sampled meter.
    pub id: MeterId,
    /// Base unit, if the meter declared one.
    pub unit: Option<Unit>,
    /// Human-readable description, if the meter declared one.
    pub description: Option<String>,
    /// The sampled value.
    pub value: MeterValue,
}
