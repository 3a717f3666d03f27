use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::domain::entities::invoices::{InsertInvoiceEntity, InvoiceEntity};
use crate::domain::repositories::invoices::InvoiceRepository;
use crate::domain::value_objects::enums::{
    booking_statuses::BookingStatus, invoice_statuses::InvoiceStatus,
};
use crate::domain::value_objects::invoices::InvoiceExpireOutcome;
use crate::infrastructure::postgres::{
    postgres_connection::PgPoolSquad,
    schema::{bookings, invoices},
};

pub struct InvoicePostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl InvoicePostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl InvoiceRepository for InvoicePostgres {
    async fn insert(&self, invoice: InsertInvoiceEntity) -> Result<InvoiceEntity> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let created = diesel::insert_into(invoices::table)
            .values(&invoice)
            .returning(InvoiceEntity::as_returning())
            .get_result::<InvoiceEntity>(&mut conn)?;

        Ok(created)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<InvoiceEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let invoice = invoices::table
            .select(InvoiceEntity::as_select())
            .filter(invoices::id.eq(id))
            .first::<InvoiceEntity>(&mut conn)
            .optional()?;

        Ok(invoice)
    }

    async fn find_by_booking_id(&self, booking_id: Uuid) -> Result<Option<InvoiceEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let invoice = invoices::table
            .select(InvoiceEntity::as_select())
            .filter(invoices::booking_id.eq(booking_id))
            .first::<InvoiceEntity>(&mut conn)
            .optional()?;

        Ok(invoice)
    }

    async fn find_by_order_id(&self, order_id: &str) -> Result<Option<InvoiceEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let invoice = invoices::table
            .select(InvoiceEntity::as_select())
            .filter(invoices::invoice_number.eq(order_id))
            .first::<InvoiceEntity>(&mut conn)
            .optional()?;

        Ok(invoice)
    }

    async fn mark_paid(&self, id: Uuid, paid_at: DateTime<Utc>) -> Result<bool> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let rows = diesel::update(
            invoices::table
                .filter(invoices::id.eq(id))
                .filter(invoices::status.eq(InvoiceStatus::Pending.as_str())),
        )
        .set((
            invoices::status.eq(InvoiceStatus::Paid.as_str()),
            invoices::paid_at.eq(Some(paid_at)),
            invoices::expired_at.eq(None::<DateTime<Utc>>),
        ))
        .execute(&mut conn)?;

        Ok(rows > 0)
    }

    async fn mark_cancelled(&self, id: Uuid, cancelled_at: DateTime<Utc>) -> Result<bool> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let rows = diesel::update(
            invoices::table
                .filter(invoices::id.eq(id))
                .filter(invoices::status.eq(InvoiceStatus::Pending.as_str())),
        )
        .set((
            invoices::status.eq(InvoiceStatus::Cancelled.as_str()),
            invoices::cancelled_at.eq(Some(cancelled_at)),
        ))
        .execute(&mut conn)?;

        Ok(rows > 0)
    }

    async fn expire_due_with_booking_release(
        &self,
        id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<InvoiceExpireOutcome> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        // Conditional update plus the booking cascade run atomically, so the
        // expiry worker and a racing payment callback converge on one winner.
        let outcome = conn.transaction::<InvoiceExpireOutcome, diesel::result::Error, _>(|conn| {
            let booking_id = diesel::update(
                invoices::table
                    .filter(invoices::id.eq(id))
                    .filter(invoices::status.eq(InvoiceStatus::Pending.as_str()))
                    .filter(invoices::expired_at.le(now)),
            )
            .set(invoices::status.eq(InvoiceStatus::Expired.as_str()))
            .returning(invoices::booking_id)
            .get_result::<Option<Uuid>>(conn)
            .optional()?;

            let Some(booking_id) = booking_id else {
                return Ok(InvoiceExpireOutcome::Skipped);
            };

            let released_booking_id = match booking_id {
                Some(booking_id) => {
                    let rows = diesel::update(
                        bookings::table
                            .filter(bookings::id.eq(booking_id))
                            .filter(bookings::status.eq_any(BookingStatus::active())),
                    )
                    .set((
                        bookings::status.eq(BookingStatus::Cancelled.as_str()),
                        bookings::updated_at.eq(now),
                    ))
                    .execute(conn)?;
                    (rows > 0).then_some(booking_id)
                }
                None => None,
            };

            Ok(InvoiceExpireOutcome::Expired {
                released_booking_id,
            })
        })?;

        Ok(outcome)
    }

    async fn adjust_amount(&self, id: Uuid, delta: i64) -> Result<bool> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let rows = diesel::update(
            invoices::table
                .filter(invoices::id.eq(id))
                .filter(invoices::status.eq(InvoiceStatus::Pending.as_str())),
        )
        .set(invoices::amount.eq(invoices::amount + delta))
        .execute(&mut conn)?;

        Ok(rows > 0)
    }

    async fn list_due_pending(
        &self,
        now: DateTime<Utc>,
        limit: i64,
    ) -> Result<Vec<InvoiceEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let due = invoices::table
            .select(InvoiceEntity::as_select())
            .filter(invoices::status.eq(InvoiceStatus::Pending.as_str()))
            .filter(invoices::expired_at.le(now))
            .order(invoices::expired_at.asc())
            .limit(limit)
            .load::<InvoiceEntity>(&mut conn)?;

        Ok(due)
    }
}
