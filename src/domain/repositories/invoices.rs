use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::entities::invoices::{InsertInvoiceEntity, InvoiceEntity};
use crate::domain::value_objects::invoices::InvoiceExpireOutcome;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait InvoiceRepository: Send + Sync {
    async fn insert(&self, invoice: InsertInvoiceEntity) -> Result<InvoiceEntity>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<InvoiceEntity>>;

    async fn find_by_booking_id(&self, booking_id: Uuid) -> Result<Option<InvoiceEntity>>;

    /// Lookup by the gateway correlation key (the invoice number).
    async fn find_by_order_id(&self, order_id: &str) -> Result<Option<InvoiceEntity>>;

    /// pending -> paid; sets paid_at, clears expired_at. Returns whether a
    /// row changed.
    async fn mark_paid(&self, id: Uuid, paid_at: DateTime<Utc>) -> Result<bool>;

    /// pending -> cancelled; sets cancelled_at.
    async fn mark_cancelled(&self, id: Uuid, cancelled_at: DateTime<Utc>) -> Result<bool>;

    /// pending AND past deadline -> expired, cascading the owning booking to
    /// cancelled in the same transaction. Anything else is `Skipped`.
    async fn expire_due_with_booking_release(
        &self,
        id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<InvoiceExpireOutcome>;

    /// Increments amount; pending only.
    async fn adjust_amount(&self, id: Uuid, delta: i64) -> Result<bool>;

    /// Pending invoices whose deadline has passed; the sweeper's work list.
    async fn list_due_pending(&self, now: DateTime<Utc>, limit: i64)
    -> Result<Vec<InvoiceEntity>>;
}
