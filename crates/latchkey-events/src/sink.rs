//! Observer side of the multiplexer.

use std::sync::Weak;

use tokio::sync::mpsc;

use crate::event::EventMessage;
use crate::multiplexer::Hub;

/// Identifies an attached observer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObserverId(pub(crate) u64);

impl std::fmt::Display for ObserverId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "observer-{}", self.0)
    }
}

/// Why an observer refused a message.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SinkError {
    /// The observer is no longer receiving.
    #[error("observer is closed")]
    Closed,

    #[error("observer rejected event: {message}")]
    Rejected { message: String },
}

impl SinkError {
    pub fn rejected(message: impl Into<String>) -> Self {
        Self::Rejected {
            message: message.into(),
        }
    }
}

/// Receives published events.
///
/// Called on the SDK's callback context; implementations must not block.
pub trait EventSink: Send + Sync {
    fn send_event(&self, message: &EventMessage) -> Result<(), SinkError>;
}

/// Sink that forwards into an unbounded channel.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: mpsc::UnboundedSender<EventMessage>,
}

impl ChannelSink {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<EventMessage>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl EventSink for ChannelSink {
    fn send_event(&self, message: &EventMessage) -> Result<(), SinkError> {
        self.tx.send(message.clone()).map_err(|_| SinkError::Closed)
    }
}

/// Stream of events for one observer.
///
/// Dropping the subscription detaches the observer.
#[derive(Debug)]
pub struct EventSubscription {
    id: ObserverId,
    rx: mpsc::UnboundedReceiver<EventMessage>,
    hub: Weak<Hub>,
}

impl EventSubscription {
    pub(crate) fn new(
        id: ObserverId,
        rx: mpsc::UnboundedReceiver<EventMessage>,
        hub: Weak<Hub>,
    ) -> Self {
        Self { id, rx, hub }
    }

    pub fn id(&self) -> ObserverId {
        self.id
    }

    /// Wait for the next event.
    ///
    /// Returns `None` once the multiplexer has detached this observer.
    pub async fn recv(&mut self) -> Option<EventMessage> {
        self.rx.recv().await
    }

    /// Take the next event if one is already queued.
    pub fn try_recv(&mut self) -> Option<EventMessage> {
        self.rx.try_recv().ok()
    }
}

impl Drop for EventSubscription {
    fn drop(&mut self) {
        if let Some(hub) = self.hub.upgrade() {
            hub.remove(self.id);
        }
    }
}
