use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::infrastructure::postgres::schema::invoices;

#[derive(Debug, Clone, Identifiable, Selectable, Queryable)]
#[diesel(table_name = invoices)]
pub struct InvoiceEntity {
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

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = invoices)]
pub struct InsertInvoiceEntity {
    pub id: Uuid,
    pub booking_id: Option<Uuid>,
    pub event_order_id: Option<Uuid>,
    pub invoice_number: String,
    pub amount: i64,
    pub status: String,
    pub issued_at: DateTime<Utc>,
    pub expired_at: Option<DateTime<Utc>>,
}
