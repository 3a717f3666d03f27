use chrono::{DateTime, Utc};
use rand::Rng;
use rand::distributions::Alphanumeric;
use serde::Serialize;
use uuid::Uuid;

use crate::domain::entities::invoices::InvoiceEntity;

#[derive(Debug, Clone, Serialize)]
pub struct InvoiceDto {
    pub id: Uuid,
    pub booking_id: Option<Uuid>,
    pub event_order_id: Option<Uuid>,
    pub invoice_number: String,
    pub amount: i64,
    pub status: String,
    pub issued_at: DateTime<Utc>,
    pub paid_at: Option<DateTime<Utc>>,
    pub cancelled_at: Option<DateTime<Utc>>,
    pub expired_at: Option<DateTime<Utc>>,
}

impl InvoiceDto {
    pub fn from_entity(entity: &InvoiceEntity) -> Self {
        Self {
            id: entity.id,
            booking_id: entity.booking_id,
            event_order_id: entity.event_order_id,
            invoice_number: entity.invoice_number.clone(),
            amount: entity.amount,
            status: entity.status.clone(),
            issued_at: entity.issued_at,
            paid_at: entity.paid_at,
            cancelled_at: entity.cancelled_at,
            expired_at: entity.expired_at,
        }
    }
}

/// The owning side of an invoice: exactly one of booking or event order.
#[derive(Debug, Clone, Copy)]
pub enum InvoiceOwner {
    Booking(Uuid),
    EventOrder(Uuid),
}

/// `INV-YYYYMMDD-XXXXXX`; doubles as the gateway order id for booking payments.
pub fn generate_invoice_number(now: DateTime<Utc>) -> String {
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(6)
        .map(|c| (c as char).to_ascii_uppercase())
        .collect();
    format!("INV-{}-{}", now.format("%Y%m%d"), suffix)
}

/// Result of the expire-with-cascade transaction.
#[derive(Debug, PartialEq, Eq)]
pub enum InvoiceExpireOutcome {
    /// Invoice flipped to expired; `released_booking_id` is the booking that
    /// was cancelled to release its slot, when the cascade applied.
    Expired { released_booking_id: Option<Uuid> },
    /// Already terminal, not yet due, or missing; a stale job firing here is
    /// expected traffic.
    Skipped,
}
