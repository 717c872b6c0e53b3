//! The `CounterStore` trait.
//!
//! Implemented by storage backends (e.g. `jointrack-store-sqlite`). The
//! tracker depends on this abstraction, not on any concrete backend.

use std::future::Future;

use crate::identity::{Identity, PlayerRecord};

/// Durable per-identity join counter.
///
/// The only mutation is [`increment_and_get`](Self::increment_and_get);
/// callers never read a count and write it back themselves.
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes.
pub trait CounterStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Record one more connection for `identity` and return the new count.
  ///
  /// Creates the record with a count of 1 if it does not exist. Must be a
  /// single atomic step: `N` concurrent calls for the same identity raise
  /// the count by exactly `N` and each observes a distinct value. The new
  /// count is durable once the future resolves.
  fn increment_and_get(
    &self,
    identity: Identity,
  ) -> impl Future<Output = Result<u64, Self::Error>> + Send + '_;

  /// Read the record for `identity` without modifying it. Returns `None` if
  /// the identity has never connected.
  fn get_record(
    &self,
    identity: Identity,
  ) -> impl Future<Output = Result<Option<PlayerRecord>, Self::Error>> + Send + '_;
}
