use anyhow::Result;
use async_trait::async_trait;
use serde::Serialize;

pub const BOOKING_EVENTS: &str = "booking-events";
pub const TRANSACTIONS_EVENTS: &str = "transactions-events";

#[derive(Debug, Clone, Serialize)]
pub struct DomainEvent {
    pub event: String,
    pub payload: serde_json::Value,
}

impl DomainEvent {
    pub fn new(event: &str, payload: serde_json::Value) -> Self {
        Self {
            event: event.to_string(),
            payload,
        }
    }
}

/// Fire-and-forget publish; delivery is at-least-once and consumers dedupe on
/// their side. Never called while a database transaction is open.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EventPublisher: Send + Sync {
    async fn publish(&self, channel: &str, event: DomainEvent) -> Result<()>;
}
