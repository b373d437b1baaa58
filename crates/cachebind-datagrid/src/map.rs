//! Distributed-map client surface consumed by the binder.

use crate::stats::LocalMapStats;

/// A distributed in-memory map exposing partition-local statistics.
///
/// Implemented by the native client's map handle. The binder treats the
/// handle as read-only: it never mutates the map and never retains a strong
/// reference to it.
pub trait GridMap: Send + Sync + 'static {
    /// Display name of the map, used as the mandatory `cache` tag on every
    /// meter. Must be non-empty and stable for the life of the handle.
    fn name(&self) -> &str;

    /// Fetch a fresh snapshot of this member's partition-local statistics.
    ///
    /// Called on every metric read. A failure here (panic) propagates to the
    /// scraping caller: a stats read failing means the handle itself is in
    /// an abnormal state worth surfacing, so the binder does not catch it.
    fn local_map_stats(&self) -> LocalMapStats;
}
