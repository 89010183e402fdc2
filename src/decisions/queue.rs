//! FIFO hand-off between request handlers and the decision resolver.

use thiserror::Error;
use tokio::sync::mpsc;

use super::types::PendingDecision;

/// Error returned when a decision cannot be accepted.
#[derive(Debug, Error)]
pub enum SubmitError {
    /// The resolver has shut down and no further decisions can be delivered.
    #[error("decision queue is closed; the resolver has shut down")]
    Closed,
}

/// Multi-producer handle onto the decision channel.
///
/// `submit` never blocks the caller; items are delivered to the single
/// resolver task in strict FIFO order. Duplicate `request_id`s are not
/// deduplicated; both copies reach the resolver.
#[derive(Clone)]
pub struct DecisionQueue {
    tx: mpsc::UnboundedSender<PendingDecision>,
}

impl DecisionQueue {
    /// Create the queue, returning the producer handle and the consumer end
    /// owned by the resolver task.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<PendingDecision>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    /// Enqueue a decision for the resolver.
    pub fn submit(&self, decision: PendingDecision) -> Result<(), SubmitError> {
        self.tx.send(decision).map_err(|_| SubmitError::Closed)
    }
}
