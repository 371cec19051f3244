//! Event sink module
//!
//! Forwards human-readable server events (start/stop notices, client
//! requests, errors) to a control surface through a bounded channel.
//! Emitting never waits: when the consumer falls behind, lines are dropped.

use tokio::sync::mpsc;

/// Bounded, non-blocking sender of event lines
#[derive(Debug, Clone, Default)]
pub struct EventSink {
    tx: Option<mpsc::Sender<String>>,
}

impl EventSink {
    /// Create a sink and the receiver a control surface reads from
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<String>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (Self { tx: Some(tx) }, rx)
    }

    /// Sink that discards every event
    pub const fn disabled() -> Self {
        Self { tx: None }
    }

    /// Send a line without blocking; returns false if it was dropped
    pub fn emit(&self, line: impl Into<String>) -> bool {
        let Some(tx) = &self.tx else {
            return false;
        };

        match tx.try_send(line.into()) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(line)) => {
                tracing::debug!(%line, "event buffer full, dropping line");
                false
            }
            Err(mpsc::error::TrySendError::Closed(_)) => false,
        }
    }
}
