//! [`SqliteCounterStore`], the SQLite implementation of [`CounterStore`].

use std::{path::Path, time::Duration};

use rusqlite::OptionalExtension as _;

use jointrack_core::{
  identity::{Identity, PlayerRecord},
  store::CounterStore,
};

use crate::{
  encode::{decode_count, decode_identity, encode_identity},
  schema::{INCREMENT, SCHEMA},
  Error, Result,
};

/// How long a writer waits on another connection's lock before giving up.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

// ─── Store ───────────────────────────────────────────────────────────────────

/// A join counter backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteCounterStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteCounterStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  ///
  /// Safe to call against an existing database; existing counts are kept.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.busy_timeout(BUSY_TIMEOUT)?;
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── CounterStore impl ───────────────────────────────────────────────────────

impl CounterStore for SqliteCounterStore {
  type Error = Error;

  async fn increment_and_get(&self, identity: Identity) -> Result<u64> {
    let id = encode_identity(identity);

    let raw: i64 = self
      .conn
      .call(move |conn| {
        Ok(conn.query_row(INCREMENT, rusqlite::params![id], |row| row.get(0))?)
      })
      .await?;

    decode_count(raw)
  }

  async fn get_record(&self, identity: Identity) -> Result<Option<PlayerRecord>> {
    let id = encode_identity(identity);

    let raw: Option<(i64, i64)> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            "SELECT identity, join_count FROM player_stats WHERE identity = ?1",
            rusqlite::params![id],
            |row| Ok((row.get(0)?, row.get(1)?)),
          )
          .optional()?)
      })
      .await?;

    raw
      .map(|(id, count)| -> Result<PlayerRecord> {
        Ok(PlayerRecord {
          identity:   decode_identity(id),
          join_count: decode_count(count)?,
        })
      })
      .transpose()
  }
}
