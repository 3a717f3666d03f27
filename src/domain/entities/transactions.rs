use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::infrastructure::postgres::schema::transactions;

#[derive(Debug, Clone, Identifiable, Selectable, Queryable)]
#[diesel(table_name = transactions)]
pub struct TransactionEntity {
    pub id: Uuid,
    pub user_id: Uuid,
    pub amount: i64,
    pub type_: String,
    pub status: String,
    pub order_id: String,
    pub va_number: Option<String>,
    pub qris_url: Option<String>,
    pub payment_code: Option<String>,
    pub expired_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = transactions)]
pub struct InsertTransactionEntity {
    pub id: Uuid,
    pub user_id: Uuid,
    pub amount: i64,
    pub type_: String,
    pub status: String,
    pub order_id: String,
    pub va_number: Option<String>,
    pub qris_url: Option<String>,
    pub payment_code: Option<String>,
    pub expired_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
