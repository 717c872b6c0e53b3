//! Conversions between domain values and SQLite integer columns.
//!
//! SQLite integers are signed 64-bit, so identities are stored by
//! reinterpreting their bits; large SteamIDs come out negative on disk.

use jointrack_core::identity::Identity;

use crate::{Error, Result};

pub fn encode_identity(id: Identity) -> i64 { id.get() as i64 }

pub fn decode_identity(raw: i64) -> Identity { Identity(raw as u64) }

pub fn decode_count(raw: i64) -> Result<u64> {
  match u64::try_from(raw) {
    Ok(count) if count > 0 => Ok(count),
    _ => Err(Error::InvalidCount(raw)),
  }
}
