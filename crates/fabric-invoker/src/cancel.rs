//! Cooperative cancellation

use async_channel::{Receiver, Sender};

/// Cancels an in-flight invocation from another thread or task
///
/// Clones share state. Nothing is ever sent on the channel; cancelling closes
/// it, which wakes every pending [`cancelled`](Self::cancelled).
#[derive(Debug, Clone)]
pub struct CancellationToken {
    sender: Sender<()>,
    receiver: Receiver<()>,
}

impl CancellationToken {
    /// A token that has not been cancelled
    pub fn new() -> Self {
        let (sender, receiver) = async_channel::bounded(1);
        Self { sender, receiver }
    }

    /// Request cancellation; idempotent
    pub fn cancel(&self) {
        self.sender.close();
    }

    /// Whether [`cancel`](Self::cancel) has been called on any clone
    pub fn is_cancelled(&self) -> bool {
        self.sender.is_closed()
    }

    /// Resolves once the token is cancelled
    pub async fn cancelled(&self) {
        // recv only errors once the channel is closed and empty
        let _ = self.receiver.recv().await;
    }
}

impl Default for CancellationToken {
    fn default() -> Self {
        Self::new()
    }
}
