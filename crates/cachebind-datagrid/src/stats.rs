//! Native partition-local statistics model.
//!
//! These types mirror the statistics object a data-grid client exposes for
//! the locally held portion of a distributed map. A snapshot is an immutable
//! point-in-time view; the binder re-fetches a fresh one on every metric
//! read and never caches or diffs snapshots, so values sampled at slightly
//! different instants may be mutually inconsistent. Cache statistics are
//! approximate under concurrent mutation.

use serde::{Deserialize, Serialize};

/// Statistics for this member's partition of a distributed map.
///
/// Counts are partition-local, not cluster-wide: `owned_entry_count` is the
/// number of primary entries this member holds, `backup_entry_count` the
/// number of replica copies. Latency totals accumulate in nanoseconds.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalMapStats {
    /// Number of primary entries held by this member.
    pub owned_entry_count: u64,
    /// Number of backup (replica) entries held by this member.
    pub backup_entry_count: u64,
    /// Memory cost of primary entries, in bytes.
    pub owned_entry_memory_cost: u64,
    /// Memory cost of backup entries, in bytes.
    pub backup_entry_memory_cost: u64,
    /// Hits against entries held in this partition.
    pub hits: u64,
    /// Get operations executed against this partition.
    pub get_operation_count: u64,
    /// Put operations executed against this partition.
    pub put_operation_count: u64,
    /// Remove operations executed against this partition.
    pub remove_operation_count: u64,
    /// Cumulative latency of get operations, in nanoseconds.
    pub total_get_latency_ns: u64,
    /// Cumulative latency of put operations, in nanoseconds.
    pub total_put_latency_ns: u64,
    /// Cumulative latency of remove operations, in nanoseconds.
    pub total_remove_latency_ns: u64,
    /// Near-cache statistics, present only when a near cache is configured
    /// for the map.
    pub near_cache: Option<NearCacheStats>,
}

/// Statistics for the optional near-cache layer in front of the map.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NearCacheStats {
    /// Reads served from the near cache.
    pub hits: u64,
    /// Reads that fell through to the distributed map.
    pub misses: u64,
    /// Entries evicted from the near cache.
    pub evictions: u64,
    /// Keys persisted by the near-cache pre-load feature.
    pub persistence_count: u64,
}
