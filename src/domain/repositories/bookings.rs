use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::entities::{
    bookings::{BookingEntity, InsertBookingEntity},
    invoices::InsertInvoiceEntity,
    order_items::InsertOrderItemEntity,
};
use crate::domain::value_objects::bookings::{
    BookingCreateOutcome, CancelBookingOutcome, OrderItemOutcome,
};
use crate::domain::value_objects::enums::booking_statuses::BookingStatus;

/// Every multi-entity method runs inside one transaction in the
/// implementation; commit-or-rollback is never the caller's concern.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BookingRepository: Send + Sync {
    /// Overlap check + booking/items/invoice inserts in one serializable
    /// transaction.
    async fn create_with_invoice(
        &self,
        booking: InsertBookingEntity,
        items: Vec<InsertOrderItemEntity>,
        invoice: InsertInvoiceEntity,
    ) -> Result<BookingCreateOutcome>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<BookingEntity>>;

    /// Conditional update: applies only while the current status is one of
    /// `from`. Returns whether a row changed.
    async fn transition(&self, id: Uuid, from: Vec<BookingStatus>, to: BookingStatus)
    -> Result<bool>;

    /// Cancels the booking and its pending invoice together.
    async fn cancel_with_invoice(&self, id: Uuid) -> Result<CancelBookingOutcome>;

    /// Sweep: every paid booking whose end time has passed becomes completed.
    async fn complete_elapsed(&self, now: DateTime<Utc>) -> Result<Vec<Uuid>>;

    async fn add_order_item(
        &self,
        booking_id: Uuid,
        item: InsertOrderItemEntity,
    ) -> Result<OrderItemOutcome>;

    async fn update_order_item(
        &self,
        item_id: Uuid,
        quantity: i32,
        subtotal: i64,
    ) -> Result<OrderItemOutcome>;

    async fn remove_order_item(&self, item_id: Uuid) -> Result<OrderItemOutcome>;

    /// Re-derives total_price from order items and syncs the invoice amount.
    async fn recalculate_total(&self, booking_id: Uuid) -> Result<OrderItemOutcome>;
}
