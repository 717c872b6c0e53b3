//! Error type for `jointrack-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  /// A stored `join_count` that cannot be a count (zero or negative).
  #[error("invalid join count in store: {0}")]
  InvalidCount(i64),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
