use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::domain::entities::transactions::{InsertTransactionEntity, TransactionEntity};
use crate::domain::repositories::transactions::TransactionRepository;
use crate::domain::value_objects::enums::{
    transaction_statuses::TransactionStatus, transaction_types::TransactionType,
};
use crate::infrastructure::postgres::{postgres_connection::PgPoolSquad, schema::transactions};

pub struct TransactionPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl TransactionPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl TransactionRepository for TransactionPostgres {
    async fn insert(&self, transaction: InsertTransactionEntity) -> Result<TransactionEntity> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let created = diesel::insert_into(transactions::table)
            .values(&transaction)
            .returning(TransactionEntity::as_returning())
            .get_result::<TransactionEntity>(&mut conn)?;

        Ok(created)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<TransactionEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let transaction = transactions::table
            .select(TransactionEntity::as_select())
            .filter(transactions::id.eq(id))
            .first::<TransactionEntity>(&mut conn)
            .optional()?;

        Ok(transaction)
    }

    async fn find_by_order_id(&self, order_id: &str) -> Result<Option<TransactionEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let transaction = transactions::table
            .select(TransactionEntity::as_select())
            .filter(transactions::order_id.eq(order_id))
            .first::<TransactionEntity>(&mut conn)
            .optional()?;

        Ok(transaction)
    }

    async fn has_pending_topup(&self, user_id: Uuid) -> Result<bool> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let pending = transactions::table
            .select(transactions::id)
            .filter(transactions::user_id.eq(user_id))
            .filter(transactions::type_.eq(TransactionType::Topup.as_str()))
            .filter(transactions::status.eq(TransactionStatus::Pending.as_str()))
            .first::<Uuid>(&mut conn)
            .optional()?;

        Ok(pending.is_some())
    }

    async fn mark_success(&self, id: Uuid, now: DateTime<Utc>) -> Result<bool> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let rows = diesel::update(
            transactions::table
                .filter(transactions::id.eq(id))
                .filter(transactions::status.eq(TransactionStatus::Pending.as_str())),
        )
        .set((
            transactions::status.eq(TransactionStatus::Success.as_str()),
            transactions::updated_at.eq(now),
        ))
        .execute(&mut conn)?;

        Ok(rows > 0)
    }

    async fn mark_cancelled(&self, id: Uuid, now: DateTime<Utc>) -> Result<bool> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let rows = diesel::update(
            transactions::table
                .filter(transactions::id.eq(id))
                .filter(transactions::status.eq(TransactionStatus::Pending.as_str())),
        )
        .set((
            transactions::status.eq(TransactionStatus::Cancelled.as_str()),
            transactions::updated_at.eq(now),
        ))
        .execute(&mut conn)?;

        Ok(rows > 0)
    }

    async fn expire_due(&self, id: Uuid, now: DateTime<Utc>) -> Result<bool> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let rows = diesel::update(
            transactions::table
                .filter(transactions::id.eq(id))
                .filter(transactions::status.eq(TransactionStatus::Pending.as_str()))
                .filter(transactions::expired_at.le(now)),
        )
        .set((
            transactions::status.eq(TransactionStatus::Expired.as_str()),
            transactions::updated_at.eq(now),
        ))
        .execute(&mut conn)?;

        Ok(rows > 0)
    }

    async fn list_due_pending(
        &self,
        now: DateTime<Utc>,
        limit: i64,
    ) -> Result<Vec<TransactionEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let due = transactions::table
            .select(TransactionEntity::as_select())
            .filter(transactions::status.eq(TransactionStatus::Pending.as_str()))
            .filter(transactions::expired_at.le(now))
            .order(transactions::expired_at.asc())
            .limit(limit)
            .load::<TransactionEntity>(&mut conn)?;

        Ok(due)
    }
}
