//! Publish/subscribe channel for opening and closing the chat overlay.
//!
//! Triggers hold an [`OverlayBus`] clone and publish events; each display
//! holds its own [`OverlaySubscriber`].

use tokio::sync::broadcast::{self, error::RecvError};
use tracing::warn;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum OverlayEvent {
    Open,
    Close,
    Toggle,
}

/// Sending side of the overlay channel. Cheap to clone.
#[derive(Clone, Debug)]
pub struct OverlayBus {
    sender: broadcast::Sender<OverlayEvent>,
}

impl Default for OverlayBus {
    fn default() -> Self {
        Self::new(16)
    }
}

impl OverlayBus {
    /// Creates a bus buffering up to `capacity` events per slow subscriber.
    ///
    /// A `capacity` of zero is raised to one.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Publishes `event` and returns how many subscribers will see it.
    pub fn publish(&self, event: OverlayEvent) -> usize {
        self.sender.send(event).unwrap_or(0)
    }

    /// Subscribes to events published from now on. The overlay starts closed.
    pub fn subscribe(&self) -> OverlaySubscriber {
        OverlaySubscriber {
            receiver: self.sender.subscribe(),
            open: false,
        }
    }
}

/// Receiving side that tracks whether the overlay is open.
#[derive(Debug)]
pub struct OverlaySubscriber {
    receiver: broadcast::Receiver<OverlayEvent>,
    open: bool,
}

impl OverlaySubscriber {
    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Waits for the next event and applies it.
    ///
    /// Returns `None` once every [`OverlayBus`] handle has been dropped.
    pub async fn next(&mut self) -> Option<OverlayEvent> {
        loop {
            match self.receiver.recv().await {
                Ok(event) => {
                    self.open = match event {
                        OverlayEvent::Open => true,
                        OverlayEvent::Close => false,
                        OverlayEvent::Toggle => !self.open,
                    };
                    return Some(event);
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "overlay subscriber lagged, skipping events");
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }
}
