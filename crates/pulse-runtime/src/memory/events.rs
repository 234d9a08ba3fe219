use async_trait::async_trait;
use pulse_core::{EventKind, EventSink, HostStatusEvent};
use tokio::sync::broadcast;

/// An event as delivered to subscribers.
#[derive(Debug, Clone)]
pub struct FiredEvent {
    pub tenant_id: String,
    pub kind: EventKind,
    pub payload: HostStatusEvent,
}

/// Event sink that fans events out over a broadcast channel.
///
/// Events fired while nobody subscribes are dropped; slow subscribers lag.
pub struct BroadcastEventSink {
    tx: broadcast::Sender<FiredEvent>,
}

impl BroadcastEventSink {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<FiredEvent> {
        self.tx.subscribe()
    }
}

impl Default for BroadcastEventSink {
    fn default() -> Self {
        Self::new(256)
    }
}

#[async_trait]
impl EventSink for BroadcastEventSink {
    async fn fire(&self, tenant_id: &str, kind: EventKind, payload: HostStatusEvent) {
        let event = FiredEvent {
            tenant_id: tenant_id.to_string(),
            kind,
            payload,
        };
        if self.tx.send(event).is_err() {
            tracing::trace!(kind = %kind, "No event subscribers");
        }
    }
}
