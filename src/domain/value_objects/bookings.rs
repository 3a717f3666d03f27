use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::entities::{
    bookings::BookingEntity, invoices::InvoiceEntity, order_items::OrderItemEntity,
};
use crate::domain::value_objects::invoices::InvoiceDto;

#[derive(Debug, Clone, Deserialize)]
pub struct CreateBookingModel {
    pub user_id: Uuid,
    pub venue_id: Uuid,
    pub service_id: Uuid,
    pub unit_id: Option<Uuid>,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub items: Vec<OrderItemModel>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OrderItemModel {
    pub menu_id: Uuid,
    pub quantity: i32,
    pub subtotal: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct BookingDto {
    pub id: Uuid,
    pub user_id: Uuid,
    pub venue_id: Uuid,
    pub service_id: Uuid,
    pub unit_id: Option<Uuid>,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub total_price: i64,
    pub status: String,
}

impl BookingDto {
    pub fn from_entity(entity: &BookingEntity) -> Self {
        Self {
            id: entity.id,
            user_id: entity.user_id,
            venue_id: entity.venue_id,
            service_id: entity.service_id,
            unit_id: entity.unit_id,
            start_time: entity.start_time,
            end_time: entity.end_time,
            total_price: entity.total_price,
            status: entity.status.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CreatedBookingDto {
    pub booking: BookingDto,
    pub invoice: InvoiceDto,
}

/// Result of the overlap-checked create transaction.
#[derive(Debug)]
pub enum BookingCreateOutcome {
    Created {
        booking: BookingEntity,
        items: Vec<OrderItemEntity>,
        invoice: InvoiceEntity,
    },
    SlotTaken,
}

#[derive(Debug)]
pub enum CancelBookingOutcome {
    /// Booking flipped to cancelled; `invoice_id` is the pending invoice that
    /// was cancelled alongside it, when one existed.
    Cancelled { invoice_id: Option<Uuid> },
    AlreadyCancelled,
    NotCancellable(String),
    NotFound,
}

/// Totals after an order-item mutation; the repository keeps all three equal
/// inside one transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AmountSnapshot {
    pub booking_id: Uuid,
    pub total_price: i64,
    pub invoice_amount: i64,
}

#[derive(Debug)]
pub enum OrderItemOutcome {
    Applied(AmountSnapshot),
    /// The linked invoice is no longer pending, so amounts are frozen.
    InvoiceNotAdjustable,
    NotFound,
}
