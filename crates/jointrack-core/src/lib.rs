//! Core types and trait definitions for jointrack.
//!
//! This crate is deliberately free of database and runtime dependencies.
//! Rank resolution and chat styling are pure functions; persistence is
//! expressed only as the [`store::CounterStore`] trait.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod error;
pub mod identity;
pub mod rank;
pub mod store;
pub mod style;

pub use error::{Error, Result};
