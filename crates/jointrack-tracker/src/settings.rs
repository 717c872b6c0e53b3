//! Configuration files and the on-disk layout of the data directory.
//!
//! Both `config.json` and `ranks.json` follow the same rule: if the file is
//! missing, the built-in defaults are written out so the operator has
//! something to edit and later starts read back the same values. A file that
//! cannot be read never stops the tracker from starting; the defaults (or the
//! single-tier fallback ladder) are used instead.

use std::path::{Path, PathBuf};

use jointrack_core::rank::RankTable;
use serde::{Deserialize, Serialize};

use crate::Result;

// ─── Data directory ───────────────────────────────────────────────────────────

/// Where the tracker keeps its config, rank ladder and database.
#[derive(Debug, Clone)]
pub struct DataDir {
  root: PathBuf,
}

impl DataDir {
  pub fn new(root: impl Into<PathBuf>) -> Self { Self { root: root.into() } }

  /// Create the directory if it does not exist yet.
  pub fn ensure(&self) -> Result<()> {
    std::fs::create_dir_all(&self.root)?;
    Ok(())
  }

  pub fn config_path(&self) -> PathBuf { self.root.join("config.json") }

  pub fn ranks_path(&self) -> PathBuf { self.root.join("ranks.json") }

  pub fn database_path(&self) -> PathBuf { self.root.join("player_data.db") }
}

// ─── Tracker configuration ────────────────────────────────────────────────────

/// Operator settings, deserialised from `config.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
  /// Template shown before every welcome line; may contain color tokens.
  pub server_name_prefix: String,
  /// How long the sink waits before showing a welcome line.
  pub delivery_delay_ms:  u64,
}

impl Default for TrackerConfig {
  fn default() -> Self {
    Self {
      server_name_prefix: "{lime}HYPERION KZ |".to_owned(),
      delivery_delay_ms:  1000,
    }
  }
}

/// Load `config.json`, with `JOINTRACK_*` environment overrides.
///
/// Writes the defaults to `path` first if it does not exist. Falls back to
/// [`TrackerConfig::default`] if the file cannot be parsed.
pub fn load_config(path: &Path) -> TrackerConfig {
  if !path.exists() {
    match write_json(path, &TrackerConfig::default()) {
      Ok(()) => tracing::info!(path = %path.display(), "wrote default config"),
      Err(error) => {
        tracing::warn!(path = %path.display(), %error, "could not persist default config")
      }
    }
  }

  match read_config(path) {
    Ok(config) => config,
    Err(error) => {
      tracing::warn!(path = %path.display(), %error, "invalid config, using defaults");
      TrackerConfig::default()
    }
  }
}

fn read_config(path: &Path) -> Result<TrackerConfig> {
  let settings = config::Config::builder()
    .add_source(config::File::from(path).required(false))
    .add_source(config::Environment::with_prefix("JOINTRACK"))
    .build()?;
  Ok(settings.try_deserialize()?)
}

// ─── Rank ladder ──────────────────────────────────────────────────────────────

/// Load the rank ladder from `path`, generating and persisting the default
/// ladder if the file is missing.
///
/// Any failure (unreadable file, malformed JSON, defaults that cannot be
/// written) yields [`RankTable::fallback`].
pub fn load_rank_table(path: &Path) -> RankTable {
  match read_or_init_ranks(path) {
    Ok(table) => {
      tracing::info!(path = %path.display(), tiers = table.tiers().len(), "loaded rank table");
      table
    }
    Err(error) => {
      tracing::warn!(path = %path.display(), %error, "rank table unavailable, using fallback");
      RankTable::fallback()
    }
  }
}

fn read_or_init_ranks(path: &Path) -> Result<RankTable> {
  if path.exists() {
    let json = std::fs::read_to_string(path)?;
    return Ok(RankTable::from_json(&json)?);
  }

  let ladder = RankTable::default_ladder();
  write_json(path, &ladder)?;
  tracing::info!(path = %path.display(), "wrote default rank table");
  Ok(RankTable::new(ladder))
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
  let json = serde_json::to_string_pretty(value)?;
  std::fs::write(path, json)?;
  Ok(())
}
