//! # Domain Events
//!
//! Post-commit notifications for other parts of the system (dashboards,
//! reorder screens). Delivery is best effort: publishing never fails the
//! operation that produced the event, and nothing is published for a
//! transaction that rolled back.
//!
//! ```text
//! GrnWorkflow::transition ──► COMMIT ──► sink.publish(InventoryUpdated)
//!                                   └──► sink.publish(GrnCompleted)
//!                                              │
//!                              BroadcastEventSink (tokio broadcast)
//!                                   ├──► subscriber A
//!                                   └──► subscriber B
//! ```

use tokio::sync::broadcast;
use tracing::{debug, trace};

use stockwise_core::DomainEvent;

use crate::config::EventSettings;

/// Receiver of domain events. Implementations must not block.
pub trait EventSink: Send + Sync {
    fn publish(&self, event: DomainEvent);
}

/// Discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopEventSink;

impl EventSink for NoopEventSink {
    fn publish(&self, event: DomainEvent) {
        trace!(?event, "Discarding domain event");
    }
}

/// Fans events out to any number of in-process subscribers.
///
/// Subscribers that fall more than `capacity` events behind lose the oldest
/// ones (`RecvError::Lagged`).
#[derive(Debug, Clone)]
pub struct BroadcastEventSink {
    tx: broadcast::Sender<DomainEvent>,
}

impl BroadcastEventSink {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        BroadcastEventSink { tx }
    }

    /// Sized from the `[events]` section of `stockwise.toml`.
    pub fn from_settings(settings: &EventSettings) -> Self {
        Self::new(settings.channel_capacity)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<DomainEvent> {
        self.tx.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl EventSink for BroadcastEventSink {
    fn publish(&self, event: DomainEvent) {
        // Err only means nobody is listening
        match self.tx.send(event) {
            Ok(receivers) => debug!(receivers, "Domain event published"),
            Err(broadcast::error::SendError(event)) => trace!(?event, "No subscribers for domain event"),
        }
    }
}
