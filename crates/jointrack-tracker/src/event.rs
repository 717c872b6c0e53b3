//! Connection events and the presence roster.
//!
//! The host pushes one [`ConnectionEvent`] per player that finished
//! connecting. Each event carries a [`PresenceCheck`] so the sink can confirm
//! the player is still on the server when the welcome line is finally shown.

use std::{
  collections::HashSet,
  str::FromStr,
  sync::{Arc, Mutex, PoisonError},
};

use jointrack_core::identity::Identity;

use crate::Error;

// ─── Presence ─────────────────────────────────────────────────────────────────

/// Answers "is this player still connected?" at delivery time.
pub trait PresenceCheck: Send + Sync {
  fn is_present(&self, identity: Identity) -> bool;
}

/// The set of currently connected identities.
#[derive(Debug, Default)]
pub struct Roster {
  present: Mutex<HashSet<Identity>>,
}

impl Roster {
  pub fn join(&self, identity: Identity) { self.lock().insert(identity); }

  pub fn leave(&self, identity: Identity) -> bool { self.lock().remove(&identity) }

  fn lock(&self) -> std::sync::MutexGuard<'_, HashSet<Identity>> {
    self.present.lock().unwrap_or_else(PoisonError::into_inner)
  }
}

impl PresenceCheck for Roster {
  fn is_present(&self, identity: Identity) -> bool { self.lock().contains(&identity) }
}

// ─── Events ───────────────────────────────────────────────────────────────────

/// A player finished connecting.
pub struct ConnectionEvent {
  pub identity: Identity,
  /// Display name, shown verbatim in the welcome line.
  pub name:     String,
  pub is_bot:   bool,
  pub presence: Arc<dyn PresenceCheck>,
}

impl ConnectionEvent {
  /// Bots and players without a real id are never counted.
  pub fn is_countable(&self) -> bool { !self.is_bot && self.identity.is_valid() }
}

// ─── Line protocol ────────────────────────────────────────────────────────────

/// One line of the text protocol the `jointrack` binary reads on stdin.
///
/// ```text
/// connect 76561198000000001 Some Player
/// bot Expert Bot
/// disconnect 76561198000000001
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceCommand {
  Connect { identity: Identity, name: String },
  Bot { name: String },
  Disconnect { identity: Identity },
}

impl FromStr for SourceCommand {
  type Err = Error;

  fn from_str(line: &str) -> Result<Self, Self::Err> {
    let bad = || Error::BadCommand(line.to_owned());
    let line = line.trim();
    let (verb, rest) = line.split_once(' ').unwrap_or((line, ""));
    let rest = rest.trim();

    match verb {
      "connect" => {
        let (id, name) = rest.split_once(' ').unwrap_or((rest, ""));
        let identity = Identity(id.parse().map_err(|_| bad())?);
        let name = name.trim();
        Ok(SourceCommand::Connect {
          identity,
          name: if name.is_empty() { identity.to_string() } else { name.to_owned() },
        })
      }
      "bot" => Ok(SourceCommand::Bot { name: rest.to_owned() }),
      "disconnect" => Ok(SourceCommand::Disconnect {
        identity: Identity(rest.parse().map_err(|_| bad())?),
      }),
      _ => Err(bad()),
    }
  }
}
