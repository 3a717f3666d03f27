use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::domain::entities::{
    bookings::{BookingEntity, InsertBookingEntity},
    invoices::{InsertInvoiceEntity, InvoiceEntity},
    order_items::{InsertOrderItemEntity, OrderItemEntity},
};
use crate::domain::repositories::bookings::BookingRepository;
use crate::domain::value_objects::bookings::{
    AmountSnapshot, BookingCreateOutcome, CancelBookingOutcome, OrderItemOutcome,
};
use crate::domain::value_objects::enums::{
    booking_statuses::BookingStatus, invoice_statuses::InvoiceStatus,
};
use crate::infrastructure::postgres::{
    postgres_connection::PgPoolSquad,
    schema::{bookings, invoices, order_items},
};

pub struct BookingPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl BookingPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl BookingRepository for BookingPostgres {
    async fn create_with_invoice(
        &self,
        booking: InsertBookingEntity,
        items: Vec<InsertOrderItemEntity>,
        invoice: InsertInvoiceEntity,
    ) -> Result<BookingCreateOutcome> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        // Serializable so two concurrent requests for the same slot cannot
        // both observe "no conflict".
        let outcome = conn.build_transaction().serializable().run(
            |conn| -> Result<BookingCreateOutcome, diesel::result::Error> {
                let conflict = bookings::table
                    .select(bookings::id)
                    .filter(bookings::service_id.eq(booking.service_id))
                    .filter(bookings::unit_id.is_not_distinct_from(booking.unit_id))
                    .filter(bookings::status.eq_any(BookingStatus::active()))
                    .filter(bookings::start_time.lt(booking.end_time))
                    .filter(bookings::end_time.gt(booking.start_time))
                    .first::<Uuid>(conn)
                    .optional()?;
                if conflict.is_some() {
                    return Ok(BookingCreateOutcome::SlotTaken);
                }

                let created = diesel::insert_into(bookings::table)
                    .values(&booking)
                    .returning(BookingEntity::as_returning())
                    .get_result::<BookingEntity>(conn)?;
                let created_items = diesel::insert_into(order_items::table)
                    .values(&items)
                    .returning(OrderItemEntity::as_returning())
                    .get_results::<OrderItemEntity>(conn)?;
                let created_invoice = diesel::insert_into(invoices::table)
                    .values(&invoice)
                    .returning(InvoiceEntity::as_returning())
                    .get_result::<InvoiceEntity>(conn)?;

                Ok(BookingCreateOutcome::Created {
                    booking: created,
                    items: created_items,
                    invoice: created_invoice,
                })
            },
        )?;

        Ok(outcome)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<BookingEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let booking = bookings::table
            .select(BookingEntity::as_select())
            .filter(bookings::id.eq(id))
            .first::<BookingEntity>(&mut conn)
            .optional()?;

        Ok(booking)
    }

    async fn transition(
        &self,
        id: Uuid,
        from: Vec<BookingStatus>,
        to: BookingStatus,
    ) -> Result<bool> {
        let mut conn = Arc::clone(&self.db_pool).get()?;
        let from: Vec<&str> = from.iter().map(|status| status.as_str()).collect();

        let rows = diesel::update(
            bookings::table
                .filter(bookings::id.eq(id))
                .filter(bookings::status.eq_any(from)),
        )
        .set((
            bookings::status.eq(to.as_str()),
            bookings::updated_at.eq(Utc::now()),
        ))
        .execute(&mut conn)?;

        Ok(rows > 0)
    }

    async fn cancel_with_invoice(&self, id: Uuid) -> Result<CancelBookingOutcome> {
        let mut conn = Arc::clone(&self.db_pool).get()?;
        let now = Utc::now();

        let outcome = conn.transaction::<CancelBookingOutcome, diesel::result::Error, _>(|conn| {
            let booking = bookings::table
                .select(BookingEntity::as_select())
                .filter(bookings::id.eq(id))
                .for_update()
                .first::<BookingEntity>(conn)
                .optional()?;
            let Some(booking) = booking else {
                return Ok(CancelBookingOutcome::NotFound);
            };

            match BookingStatus::from_str(&booking.status) {
                Some(BookingStatus::Cancelled) => Ok(CancelBookingOutcome::AlreadyCancelled),
                Some(BookingStatus::Pending) | Some(BookingStatus::Paid) => {
                    diesel::update(bookings::table.filter(bookings::id.eq(booking.id)))
                        .set((
                            bookings::status.eq(BookingStatus::Cancelled.as_str()),
                            bookings::updated_at.eq(now),
                        ))
                        .execute(conn)?;

                    let invoice_id = diesel::update(
                        invoices::table
                            .filter(invoices::booking_id.eq(booking.id))
                            .filter(invoices::status.eq(InvoiceStatus::Pending.as_str())),
                    )
                    .set((
                        invoices::status.eq(InvoiceStatus::Cancelled.as_str()),
                        invoices::cancelled_at.eq(Some(now)),
                    ))
                    .returning(invoices::id)
                    .get_result::<Uuid>(conn)
                    .optional()?;

                    Ok(CancelBookingOutcome::Cancelled { invoice_id })
                }
                _ => Ok(CancelBookingOutcome::NotCancellable(booking.status.clone())),
            }
        })?;

        Ok(outcome)
    }

    async fn complete_elapsed(&self, now: DateTime<Utc>) -> Result<Vec<Uuid>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let completed = diesel::update(
            bookings::table
                .filter(bookings::status.eq(BookingStatus::Paid.as_str()))
                .filter(bookings::end_time.le(now)),
        )
        .set((
            bookings::status.eq(BookingStatus::Completed.as_str()),
            bookings::updated_at.eq(now),
        ))
        .returning(bookings::id)
        .get_results::<Uuid>(&mut conn)?;

        Ok(completed)
    }

    async fn add_order_item(
        &self,
        booking_id: Uuid,
        item: InsertOrderItemEntity,
    ) -> Result<OrderItemOutcome> {
        let mut conn = Arc::clone(&self.db_pool).get()?;
        let now = Utc::now();

        let outcome = conn.transaction::<OrderItemOutcome, diesel::result::Error, _>(|conn| {
            match lock_pending_invoice(conn, booking_id)? {
                InvoiceLock::Missing => return Ok(OrderItemOutcome::NotFound),
                InvoiceLock::NotPending => return Ok(OrderItemOutcome::InvoiceNotAdjustable),
                InvoiceLock::Pending(invoice_id) => {
                    diesel::insert_into(order_items::table)
                        .values(&item)
                        .execute(conn)?;
                    let snapshot = apply_totals(conn, booking_id, invoice_id, now)?;
                    Ok(OrderItemOutcome::Applied(snapshot))
                }
            }
        })?;

        Ok(outcome)
    }

    async fn update_order_item(
        &self,
        item_id: Uuid,
        quantity: i32,
        subtotal: i64,
    ) -> Result<OrderItemOutcome> {
        let mut conn = Arc::clone(&self.db_pool).get()?;
        let now = Utc::now();

        let outcome = conn.transaction::<OrderItemOutcome, diesel::result::Error, _>(|conn| {
            let booking_id = order_items::table
                .select(order_items::booking_id)
                .filter(order_items::id.eq(item_id))
                .first::<Uuid>(conn)
                .optional()?;
            let Some(booking_id) = booking_id else {
                return Ok(OrderItemOutcome::NotFound);
            };

            match lock_pending_invoice(conn, booking_id)? {
                InvoiceLock::Missing => Ok(OrderItemOutcome::NotFound),
                InvoiceLock::NotPending => Ok(OrderItemOutcome::InvoiceNotAdjustable),
                InvoiceLock::Pending(invoice_id) => {
                    diesel::update(order_items::table.filter(order_items::id.eq(item_id)))
                        .set((
                            order_items::quantity.eq(quantity),
                            order_items::subtotal.eq(subtotal),
                        ))
                        .execute(conn)?;
                    let snapshot = apply_totals(conn, booking_id, invoice_id, now)?;
                    Ok(OrderItemOutcome::Applied(snapshot))
                }
            }
        })?;

        Ok(outcome)
    }

    async fn remove_order_item(&self, item_id: Uuid) -> Result<OrderItemOutcome> {
        let mut conn = Arc::clone(&self.db_pool).get()?;
        let now = Utc::now();

        let outcome = conn.transaction::<OrderItemOutcome, diesel::result::Error, _>(|conn| {
            let booking_id = order_items::table
                .select(order_items::booking_id)
                .filter(order_items::id.eq(item_id))
                .first::<Uuid>(conn)
                .optional()?;
            let Some(booking_id) = booking_id else {
                return Ok(OrderItemOutcome::NotFound);
            };

            match lock_pending_invoice(conn, booking_id)? {
                InvoiceLock::Missing => Ok(OrderItemOutcome::NotFound),
                InvoiceLock::NotPending => Ok(OrderItemOutcome::InvoiceNotAdjustable),
                InvoiceLock::Pending(invoice_id) => {
                    diesel::delete(order_items::table.filter(order_items::id.eq(item_id)))
                        .execute(conn)?;
                    let snapshot = apply_totals(conn, booking_id, invoice_id, now)?;
                    Ok(OrderItemOutcome::Applied(snapshot))
                }
            }
        })?;

        Ok(outcome)
    }

    async fn recalculate_total(&self, booking_id: Uuid) -> Result<OrderItemOutcome> {
        let mut conn = Arc::clone(&self.db_pool).get()?;
        let now = Utc::now();

        let outcome = conn.transaction::<OrderItemOutcome, diesel::result::Error, _>(|conn| {
            match lock_pending_invoice(conn, booking_id)? {
                InvoiceLock::Missing => Ok(OrderItemOutcome::NotFound),
                InvoiceLock::NotPending => Ok(OrderItemOutcome::InvoiceNotAdjustable),
                InvoiceLock::Pending(invoice_id) => {
                    let snapshot = apply_totals(conn, booking_id, invoice_id, now)?;
                    Ok(OrderItemOutcome::Applied(snapshot))
                }
            }
        })?;

        Ok(outcome)
    }
}

enum InvoiceLock {
    Pending(Uuid),
    NotPending,
    Missing,
}

/// Locks the booking's invoice row so concurrent item churn serializes on it.
fn lock_pending_invoice(
    conn: &mut PgConnection,
    booking_id: Uuid,
) -> Result<InvoiceLock, diesel::result::Error> {
    let invoice = invoices::table
        .select(InvoiceEntity::as_select())
        .filter(invoices::booking_id.eq(booking_id))
        .for_update()
        .first::<InvoiceEntity>(conn)
        .optional()?;

    Ok(match invoice {
        None => InvoiceLock::Missing,
        Some(invoice) if invoice.status == InvoiceStatus::Pending.as_str() => {
            InvoiceLock::Pending(invoice.id)
        }
        Some(_) => InvoiceLock::NotPending,
    })
}

/// Re-derives the booking total from its order items and writes the same
/// figure to both the booking and the invoice.
fn apply_totals(
    conn: &mut PgConnection,
    booking_id: Uuid,
    invoice_id: Uuid,
    now: DateTime<Utc>,
) -> Result<AmountSnapshot, diesel::result::Error> {
    let subtotals = order_items::table
        .select(order_items::subtotal)
        .filter(order_items::booking_id.eq(booking_id))
        .load::<i64>(conn)?;
    let total: i64 = subtotals.iter().sum();

    diesel::update(bookings::table.filter(bookings::id.eq(booking_id)))
        .set((
            bookings::total_price.eq(total),
            bookings::updated_at.eq(now),
        ))
        .execute(conn)?;
    diesel::update(invoices::table.filter(invoices::id.eq(invoice_id)))
        .set(invoices::amount.eq(total))
        .execute(conn)?;

    Ok(AmountSnapshot {
        booking_id,
        total_price: total,
        invoice_amount: total,
    })
}
