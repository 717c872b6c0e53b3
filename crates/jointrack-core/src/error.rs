//! Error types for `jointrack-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// The rank table could not be decoded.
  #[error("malformed rank table: {0}")]
  Serialization(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
