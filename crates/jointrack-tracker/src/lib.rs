//! Connection tracking for jointrack.
//!
//! [`ConnectionTracker`] takes each [`ConnectionEvent`] through
//! count → rank → format → deliver, backed by any [`CounterStore`] and any
//! [`PresentationSink`]. Every event is independent; a failure drops that
//! one event and nothing else.

pub mod error;
pub mod event;
pub mod message;
pub mod settings;
pub mod sink;

pub use error::{Error, Result};

use std::{path::Path, sync::Arc};

use jointrack_core::{identity::Identity, rank::RankDefinition, rank::RankTable, store::CounterStore};
use jointrack_store_sqlite::SqliteCounterStore;
use strum::Display;
use tokio::{sync::mpsc, task::JoinSet};

use event::ConnectionEvent;
use message::render_welcome;
use sink::{Delivery, PresentationSink};

// ─── State ────────────────────────────────────────────────────────────────────

/// Configuration fixed at startup and shared by every event.
#[derive(Debug, Clone)]
pub struct TrackerState {
  /// Prefix template, color tokens not yet substituted.
  pub prefix: String,
  pub ranks:  RankTable,
}

impl TrackerState {
  pub fn new(prefix: impl Into<String>, ranks: RankTable) -> Self {
    Self { prefix: prefix.into(), ranks }
  }
}

/// Where an event is in the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum Stage {
  Received,
  Counted,
  Ranked,
  Formatted,
  Delivered,
}

/// How an event left the pipeline.
#[derive(Debug)]
pub enum Outcome {
  /// Bot or placeholder identity; not counted.
  Filtered,
  /// Handed to the sink. The sink may still drop it if the player left.
  Delivered {
    count:   u64,
    rank:    RankDefinition,
    message: String,
  },
  /// Abandoned at `stage`; no line is shown for this connection.
  Failed { stage: Stage, error: Error },
}

// ─── Tracker ──────────────────────────────────────────────────────────────────

pub struct ConnectionTracker<S, K> {
  store: Option<S>,
  sink:  K,
  state: TrackerState,
}

impl<S, K> ConnectionTracker<S, K>
where
  S: CounterStore,
  K: PresentationSink,
{
  pub fn new(store: S, sink: K, state: TrackerState) -> Self {
    Self { store: Some(store), sink, state }
  }

  /// A tracker whose storage could not be opened. Every event fails at
  /// [`Stage::Counted`] with [`Error::CountingDisabled`].
  pub fn without_store(sink: K, state: TrackerState) -> Self {
    Self { store: None, sink, state }
  }

  pub fn state(&self) -> &TrackerState { &self.state }

  /// Run one connection event through the pipeline.
  ///
  /// Storage errors are not retried: a retry after a write that landed but
  /// whose reply was lost would count the connection twice.
  pub async fn handle(&self, event: ConnectionEvent) -> Outcome {
    let identity = event.identity;
    tracing::trace!(%identity, stage = %Stage::Received, "connection event");

    if !event.is_countable() {
      tracing::trace!(%identity, is_bot = event.is_bot, "ignoring uncountable connection");
      return Outcome::Filtered;
    }

    let count = match self.count(identity).await {
      Ok(count) => count,
      Err(error) => {
        tracing::warn!(%identity, stage = %Stage::Counted, %error, "dropping connection event");
        return Outcome::Failed { stage: Stage::Counted, error };
      }
    };

    let rank = self.state.ranks.resolve(count).clone();
    tracing::trace!(%identity, stage = %Stage::Ranked, count, rank = %rank.title);

    let message = render_welcome(&self.state.prefix, &rank, &event.name, count);
    tracing::trace!(%identity, stage = %Stage::Formatted);

    self
      .sink
      .deliver(Delivery {
        identity,
        message: message.clone(),
        presence: event.presence,
      })
      .await;
    tracing::debug!(%identity, stage = %Stage::Delivered, count, rank = %rank.title);

    Outcome::Delivered { count, rank, message }
  }

  /// The current count and tier for `identity`, without counting a
  /// connection. `None` if the identity has never connected.
  pub async fn current_rank(&self, identity: Identity) -> Result<Option<(u64, &RankDefinition)>> {
    let store = self.store.as_ref().ok_or(Error::CountingDisabled)?;
    let record = store
      .get_record(identity)
      .await
      .map_err(|e| Error::StorageOp(Box::new(e)))?;

    Ok(record.map(|r| (r.join_count, self.state.ranks.resolve(r.join_count))))
  }

  async fn count(&self, identity: Identity) -> Result<u64> {
    let store = self.store.as_ref().ok_or(Error::CountingDisabled)?;
    store
      .increment_and_get(identity)
      .await
      .map_err(|e| Error::StorageOp(Box::new(e)))
  }
}

// ─── Wiring ───────────────────────────────────────────────────────────────────

/// Open the SQLite counter at `path`.
pub async fn open_store(path: &Path) -> Result<SqliteCounterStore> {
  SqliteCounterStore::open(path)
    .await
    .map_err(|e| Error::StorageInit(Box::new(e)))
}

/// Process events until the source closes, one task per event.
///
/// Returns once every event already received has left the pipeline.
pub async fn run<S, K>(tracker: Arc<ConnectionTracker<S, K>>, mut events: mpsc::Receiver<ConnectionEvent>)
where
  S: CounterStore + 'static,
  K: PresentationSink + 'static,
{
  let mut tasks = JoinSet::new();

  while let Some(event) = events.recv().await {
    let tracker = Arc::clone(&tracker);
    tasks.spawn(async move { tracker.handle(event).await });

    // Reap finished tasks so the set stays small on long-running hosts.
    while tasks.try_join_next().is_some() {}
  }

  while let Some(joined) = tasks.join_next().await {
    if let Err(error) = joined {
      tracing::error!(%error, "connection task panicked");
    }
  }
}

// ─── Integration tests ────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use std::time::Duration;

  use jointrack_core::{
    identity::PlayerRecord,
    style::{ChatColor, RAINBOW_PALETTE},
  };

  use super::*;
  use crate::{event::Roster, sink::ChannelSink};

  const PLAYER: Identity = Identity(76561198000000001);

  type Tracker = ConnectionTracker<SqliteCounterStore, ChannelSink>;

  async fn make_tracker() -> (Tracker, SqliteCounterStore, mpsc::UnboundedReceiver<String>) {
    let store = SqliteCounterStore::open_in_memory().await.unwrap();
    let (sink, rx) = ChannelSink::new(Duration::ZERO);
    let state = TrackerState::new("{lime}TEST |", RankTable::default());
    (ConnectionTracker::new(store.clone(), sink, state), store, rx)
  }

  fn connect(roster: &Arc<Roster>, identity: Identity, name: &str) -> ConnectionEvent {
    roster.join(identity);
    ConnectionEvent {
      identity,
      name: name.to_owned(),
      is_bot: false,
      presence: roster.clone(),
    }
  }

  /// Always fails, standing in for a broken disk.
  struct BrokenStore;

  impl CounterStore for BrokenStore {
    type Error = std::io::Error;

    async fn increment_and_get(&self, _identity: Identity) -> Result<u64, std::io::Error> {
      Err(std::io::Error::other("disk on fire"))
    }

    async fn get_record(&self, _identity: Identity) -> Result<Option<PlayerRecord>, std::io::Error> {
      Err(std::io::Error::other("disk on fire"))
    }
  }

  // ── Pipeline ─────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn first_and_second_connection() {
    let (tracker, _, mut rx) = make_tracker().await;
    let roster = Arc::new(Roster::default());

    let Outcome::Delivered { count, rank, .. } =
      tracker.handle(connect(&roster, PLAYER, "Jumper")).await
    else {
      panic!("first connection not delivered");
    };
    assert_eq!(count, 1);
    assert_eq!(rank.min_count, 0);
    let first = rx.try_recv().unwrap();
    assert!(first.contains("1st"), "{first:?}");
    assert!(first.contains("KZ Nub"), "{first:?}");
    assert!(first.contains("Jumper"), "{first:?}");

    let Outcome::Delivered { count, rank: second_rank, .. } =
      tracker.handle(connect(&roster, PLAYER, "Jumper")).await
    else {
      panic!("second connection not delivered");
    };
    assert_eq!(count, 2);
    assert_eq!(second_rank, rank);
    let second = rx.try_recv().unwrap();
    assert!(second.contains("2nd"), "{second:?}");
  }

  #[tokio::test]
  async fn rainbow_tier_uses_color_cycle() {
    let (tracker, store, mut rx) = make_tracker().await;
    let roster = Arc::new(Roster::default());

    for _ in 0..2999 {
      store.increment_and_get(PLAYER).await.unwrap();
    }

    let Outcome::Delivered { count, rank, .. } =
      tracker.handle(connect(&roster, PLAYER, "Veteran")).await
    else {
      panic!("not delivered");
    };
    assert_eq!(count, 3000);
    assert!(rank.is_rainbow);

    let line = rx.try_recv().unwrap();
    let [c0, c1, c2, ..] = RAINBOW_PALETTE.map(ChatColor::code);
    assert!(line.contains(&format!("{c0}A{c1}u{c2}t")), "{line:?}");
    assert!(line.contains("3000th"), "{line:?}");
  }

  #[tokio::test]
  async fn bots_and_placeholders_are_filtered() {
    let (tracker, store, mut rx) = make_tracker().await;
    let roster = Arc::new(Roster::default());

    let mut bot = connect(&roster, Identity(99), "Bot Eric");
    bot.is_bot = true;
    assert!(matches!(tracker.handle(bot).await, Outcome::Filtered));

    let pending = connect(&roster, Identity::PLACEHOLDER, "loading");
    assert!(matches!(tracker.handle(pending).await, Outcome::Filtered));

    assert!(store.get_record(Identity(99)).await.unwrap().is_none());
    assert!(store.get_record(Identity::PLACEHOLDER).await.unwrap().is_none());
    assert!(rx.try_recv().is_err());
  }

  #[tokio::test]
  async fn storage_failure_drops_event() {
    let (sink, mut rx) = ChannelSink::new(Duration::ZERO);
    let tracker = ConnectionTracker::new(BrokenStore, sink, TrackerState::new("", RankTable::default()));
    let roster = Arc::new(Roster::default());

    let outcome = tracker.handle(connect(&roster, PLAYER, "Unlucky")).await;
    assert!(matches!(
      outcome,
      Outcome::Failed { stage: Stage::Counted, error: Error::StorageOp(_) }
    ));
    assert!(rx.try_recv().is_err());
  }

  #[tokio::test]
  async fn disabled_store_fails_every_event() {
    let (sink, mut rx) = ChannelSink::new(Duration::ZERO);
    let tracker: ConnectionTracker<SqliteCounterStore, _> =
      ConnectionTracker::without_store(sink, TrackerState::new("", RankTable::default()));
    let roster = Arc::new(Roster::default());

    let outcome = tracker.handle(connect(&roster, PLAYER, "Nobody")).await;
    assert!(matches!(
      outcome,
      Outcome::Failed { stage: Stage::Counted, error: Error::CountingDisabled }
    ));
    assert!(matches!(tracker.current_rank(PLAYER).await, Err(Error::CountingDisabled)));
    assert!(rx.try_recv().is_err());
  }

  #[tokio::test]
  async fn departed_player_is_still_counted() {
    let (tracker, store, mut rx) = make_tracker().await;
    let roster = Arc::new(Roster::default());

    let event = connect(&roster, PLAYER, "Ghost");
    roster.leave(PLAYER);

    assert!(matches!(tracker.handle(event).await, Outcome::Delivered { count: 1, .. }));
    assert_eq!(store.get_record(PLAYER).await.unwrap().unwrap().join_count, 1);
    assert!(rx.try_recv().is_err());
  }

  // ── Queries ──────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn current_rank_reads_without_counting() {
    let (tracker, _, _rx) = make_tracker().await;
    let roster = Arc::new(Roster::default());

    assert!(tracker.current_rank(PLAYER).await.unwrap().is_none());

    tracker.handle(connect(&roster, PLAYER, "Reader")).await;
    let (count, rank) = tracker.current_rank(PLAYER).await.unwrap().unwrap();
    assert_eq!(count, 1);
    assert_eq!(rank.title, "KZ Nub");

    let (count, _) = tracker.current_rank(PLAYER).await.unwrap().unwrap();
    assert_eq!(count, 1);
  }

  #[tokio::test]
  async fn current_rank_surfaces_storage_errors() {
    let (sink, _rx) = ChannelSink::new(Duration::ZERO);
    let tracker = ConnectionTracker::new(BrokenStore, sink, TrackerState::new("", RankTable::default()));
    assert!(matches!(tracker.current_rank(PLAYER).await, Err(Error::StorageOp(_))));
  }

  // ── Event loop ───────────────────────────────────────────────────────────────

  #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
  async fn run_counts_concurrent_connections_exactly() {
    let (tracker, store, mut rx) = make_tracker().await;
    let tracker = Arc::new(tracker);
    let roster = Arc::new(Roster::default());

    let (tx, events) = mpsc::channel(16);
    let worker = tokio::spawn(run(Arc::clone(&tracker), events));

    for _ in 0..100 {
      tx.send(connect(&roster, PLAYER, "Spammer")).await.unwrap();
    }
    tx.send(connect(&roster, Identity(7), "Other")).await.unwrap();
    drop(tx);
    worker.await.unwrap();

    assert_eq!(store.get_record(PLAYER).await.unwrap().unwrap().join_count, 100);
    assert_eq!(store.get_record(Identity(7)).await.unwrap().unwrap().join_count, 1);

    let mut lines = Vec::new();
    while let Ok(line) = rx.try_recv() {
      lines.push(line);
    }
    assert_eq!(lines.len(), 101);
    for n in [1, 2, 3, 11, 100] {
      let needle = format!("{}{} ", ChatColor::Lime.code(), jointrack_core::style::ordinal(n));
      assert_eq!(
        lines.iter().filter(|l| l.contains("Spammer") && l.contains(&needle)).count(),
        1,
        "count {n}"
      );
    }
  }
}
