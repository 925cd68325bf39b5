//! In-process fan-out of session changes.

use std::sync::Arc;

use tokio::sync::broadcast;

use quill_core::domain::SessionChanged;
use quill_core::ports::{SessionListener, Subscription};

/// Broadcasts [`SessionChanged`] events to every live subscription.
///
/// Each subscription runs its listener on its own task, so a slow listener
/// never blocks sign-in or sign-out.
#[derive(Clone)]
pub struct SessionBroadcaster {
    sender: broadcast::Sender<SessionChanged>,
}

impl SessionBroadcaster {
    pub fn new(buffer_size: usize) -> Self {
        let (sender, _) = broadcast::channel(buffer_size);
        Self { sender }
    }

    pub fn publish(&self, event: SessionChanged) {
        // No receivers is fine.
        let delivered = self.sender.send(event).unwrap_or(0);
        tracing::debug!(listeners = delivered, "Session change published");
    }

    /// Must be called from within a Tokio runtime.
    pub fn subscribe(&self, listener: SessionListener) -> Subscription {
        let mut receiver = self.sender.subscribe();
        let listener = Arc::new(listener);

        let task = tokio::spawn(async move {
            loop {
                match receiver.recv().await {
                    Ok(event) => listener(event).await,
                    Err(broadcast::error::RecvError::Lagged(count)) => {
                        tracing::warn!(lagged = count, "Session listener lagged behind");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        });

        tracing::debug!("Session listener subscribed");
        Subscription::new(move || {
            task.abort();
            tracing::debug!("Session listener unsubscribed");
        })
    }

    pub fn listener_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for SessionBroadcaster {
    fn default() -> Self {
        Self::new(64)
    }
}
