//! Error types for the tracker.
//!
//! None of these ever escape the event pipeline: each has a degraded
//! fallback at the point where it is raised.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("config error: {0}")]
  Config(#[from] config::ConfigError),
  #[error("io error: {0}")]
  Io(#[from] std::io::Error),
  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),
  #[error("rank table error: {0}")]
  Rank(#[from] jointrack_core::Error),
  #[error("storage init failed: {0}")]
  StorageInit(#[source] Box<dyn std::error::Error + Send + Sync>),
  #[error("storage error: {0}")]
  StorageOp(#[source] Box<dyn std::error::Error + Send + Sync>),
  #[error("join counting is disabled")]
  CountingDisabled,
  #[error("unrecognised command: {0:?}")]
  BadCommand(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
