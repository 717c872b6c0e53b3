//! jointrack binary.
//!
//! Reads connection events as text lines on stdin, counts and ranks each
//! player, and prints the welcome lines on stdout. Logs go to stderr.
//!
//! ```text
//! $ jointrack --data-dir ./data
//! connect 76561198000000001 Big Jumper
//! bot Expert Bot
//! disconnect 76561198000000001
//! ```

use std::{path::PathBuf, sync::Arc, time::Duration};

use anyhow::Context as _;
use clap::Parser;
use jointrack_core::identity::Identity;
use jointrack_tracker::{
  ConnectionTracker, TrackerState,
  event::{ConnectionEvent, Roster, SourceCommand},
  open_store, run,
  settings::{DataDir, load_config, load_rank_table},
  sink::ChannelSink,
};
use tokio::{
  io::{AsyncBufReadExt, BufReader},
  sync::mpsc,
};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Connection counter and rank announcer")]
struct Cli {
  /// Directory holding config.json, ranks.json and the player database.
  #[arg(short, long, default_value = ".")]
  data_dir: PathBuf,

  /// Override the configured delay before a welcome line is shown.
  #[arg(long, value_name = "MS")]
  delay_ms: Option<u64>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  // Initialise tracing. stdout is reserved for welcome lines.
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .with_writer(std::io::stderr)
    .init();

  let cli = Cli::parse();

  let dir = DataDir::new(cli.data_dir);
  dir.ensure().context("failed to create data directory")?;

  let config = load_config(&dir.config_path());
  let ranks = load_rank_table(&dir.ranks_path());
  let delay = Duration::from_millis(cli.delay_ms.unwrap_or(config.delivery_delay_ms));

  let (sink, mut lines) = ChannelSink::new(delay);
  let state = TrackerState::new(config.server_name_prefix, ranks);

  // A broken database disables counting but never stops the host.
  let tracker = match open_store(&dir.database_path()).await {
    Ok(store) => ConnectionTracker::new(store, sink, state),
    Err(error) => {
      tracing::error!(%error, "join counting disabled");
      ConnectionTracker::without_store(sink, state)
    }
  };

  let printer = tokio::spawn(async move {
    while let Some(line) = lines.recv().await {
      println!("{line}");
    }
  });

  let (events_tx, events_rx) = mpsc::channel(256);
  let worker = tokio::spawn(run(Arc::new(tracker), events_rx));

  tracing::info!("reading connection events from stdin");
  let roster = Arc::new(Roster::default());
  let mut stdin = BufReader::new(tokio::io::stdin()).lines();

  loop {
    let line = tokio::select! {
      line = stdin.next_line() => line.context("failed to read stdin")?,
      _ = tokio::signal::ctrl_c() => {
        tracing::info!("interrupted");
        break;
      }
    };
    let Some(line) = line else { break };
    if line.trim().is_empty() {
      continue;
    }

    let event = match line.parse::<SourceCommand>() {
      Ok(SourceCommand::Connect { identity, name }) => {
        roster.join(identity);
        ConnectionEvent { identity, name, is_bot: false, presence: roster.clone() }
      }
      Ok(SourceCommand::Bot { name }) => ConnectionEvent {
        identity: Identity::PLACEHOLDER,
        name,
        is_bot: true,
        presence: roster.clone(),
      },
      Ok(SourceCommand::Disconnect { identity }) => {
        roster.leave(identity);
        continue;
      }
      Err(error) => {
        tracing::warn!(%error, "skipping input line");
        continue;
      }
    };

    if events_tx.send(event).await.is_err() {
      break;
    }
  }

  // Let in-flight events finish, then close the sink's channel.
  drop(events_tx);
  worker.await.context("event loop panicked")?;
  printer.await.context("printer panicked")?;

  Ok(())
}
