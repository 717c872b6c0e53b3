//! Presentation sink: where finished welcome lines go.
//!
//! The tracker hands over a fully rendered line and stops caring. Timing and
//! the final "is the player still here?" check belong to the sink.

use std::{future::Future, sync::Arc, time::Duration};

use jointrack_core::identity::Identity;
use tokio::sync::mpsc;

use crate::event::PresenceCheck;

/// A rendered line plus what the sink needs to decide whether to show it.
pub struct Delivery {
  pub identity: Identity,
  pub message:  String,
  pub presence: Arc<dyn PresenceCheck>,
}

/// Best-effort delivery of rendered lines.
///
/// Implementations drop the line silently if the player has left; nothing is
/// reported back to the tracker.
pub trait PresentationSink: Send + Sync {
  fn deliver(&self, delivery: Delivery) -> impl Future<Output = ()> + Send + '_;
}

/// Waits a fixed delay, re-checks presence, then forwards the line on a
/// channel.
#[derive(Debug, Clone)]
pub struct ChannelSink {
  delay: Duration,
  tx:    mpsc::UnboundedSender<String>,
}

impl ChannelSink {
  /// Create a sink and the receiving end of its output.
  pub fn new(delay: Duration) -> (Self, mpsc::UnboundedReceiver<String>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (Self { delay, tx }, rx)
  }
}

impl PresentationSink for ChannelSink {
  async fn deliver(&self, delivery: Delivery) {
    let Delivery { identity, message, presence } = delivery;

    if !presence.is_present(identity) {
      tracing::debug!(%identity, "player left before delivery");
      return;
    }

    if !self.delay.is_zero() {
      tokio::time::sleep(self.delay).await;
      if !presence.is_present(identity) {
        tracing::debug!(%identity, "player left during delivery delay");
        return;
      }
    }

    if self.tx.send(message).is_err() {
      tracing::debug!(%identity, "presentation channel closed");
    }
  }
}
