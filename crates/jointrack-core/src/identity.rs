//! Identity, the stable key of a connecting player.
//!
//! An identity owns nothing but its number. The only state ever attached to
//! it is the join count held by a [`CounterStore`](crate::store::CounterStore).

use std::fmt;

use serde::{Deserialize, Serialize};

/// A 64-bit account id (e.g. a SteamID64).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Identity(pub u64);

impl Identity {
  /// The id reported for players that have not finished authenticating.
  pub const PLACEHOLDER: Identity = Identity(0);

  /// `false` for the placeholder id; such connections are never counted.
  pub fn is_valid(self) -> bool { self != Self::PLACEHOLDER }

  pub fn get(self) -> u64 { self.0 }
}

impl From<u64> for Identity {
  fn from(raw: u64) -> Self { Identity(raw) }
}

impl fmt::Display for Identity {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}", self.0) }
}

/// The single row tracked per identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerRecord {
  pub identity:   Identity,
  /// Starts at 1 on the first ever connection; never decreases.
  pub join_count: u64,
}
