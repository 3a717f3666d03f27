use std::collections::HashMap;

use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::broadcast;
use tracing::debug;

use crate::domain::repositories::event_bus::{
    BOOKING_EVENTS, DomainEvent, EventPublisher, TRANSACTIONS_EVENTS,
};

const CHANNEL_CAPACITY: usize = 256;

/// In-process pub/sub over tokio broadcast channels, one sender per named
/// channel. Publishing with no live subscribers is fine; events are simply
/// dropped.
pub struct BroadcastEventBus {
    channels: HashMap<&'static str, broadcast::Sender<DomainEvent>>,
}

impl BroadcastEventBus {
    pub fn new() -> Self {
        let mut channels = HashMap::new();
        for name in [BOOKING_EVENTS, TRANSACTIONS_EVENTS] {
            let (tx, _rx) = broadcast::channel(CHANNEL_CAPACITY);
            channels.insert(name, tx);
        }
        Self { channels }
    }

    pub fn subscribe(&self, channel: &str) -> Option<broadcast::Receiver<DomainEvent>> {
        self.channels.get(channel).map(|tx| tx.subscribe())
    }
}

impl Default for BroadcastEventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EventPublisher for BroadcastEventBus {
    async fn publish(&self, channel: &str, event: DomainEvent) -> Result<()> {
        let Some(tx) = self.channels.get(channel) else {
            anyhow::bail!("unknown event channel: {channel}");
        };

        debug!("event_bus: {} -> {}", event.event, channel);

        // SendError just means nobody is listening right now.
        let _ = tx.send(event);
        Ok(())
    }
}
