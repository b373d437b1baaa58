//! Binder error types.

use thiserror::Error;

/// Errors raised while constructing a cache binding.
///
/// All variants are caller errors detected at construction time; once a
/// binder has been built, binding itself cannot fail.
#[derive(Debug, Error)]
pub enum Error {
    /// The cache handle reported an empty display name.
    #[error("cache name must not be empty")]
    UnnamedCache,
}
