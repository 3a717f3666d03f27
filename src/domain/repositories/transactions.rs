use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::entities::transactions::{InsertTransactionEntity, TransactionEntity};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TransactionRepository: Send + Sync {
    async fn insert(&self, transaction: InsertTransactionEntity) -> Result<TransactionEntity>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<TransactionEntity>>;

    async fn find_by_order_id(&self, order_id: &str) -> Result<Option<TransactionEntity>>;

    /// A user may hold at most one pending top-up at a time.
    async fn has_pending_topup(&self, user_id: Uuid) -> Result<bool>;

    /// pending -> success. Returns whether a row changed.
    async fn mark_success(&self, id: Uuid, now: DateTime<Utc>) -> Result<bool>;

    /// pending -> cancelled.
    async fn mark_cancelled(&self, id: Uuid, now: DateTime<Utc>) -> Result<bool>;

    /// pending AND past deadline -> expired.
    async fn expire_due(&self, id: Uuid, now: DateTime<Utc>) -> Result<bool>;

    async fn list_due_pending(
        &self,
        now: DateTime<Utc>,
        limit: i64,
    ) -> Result<Vec<TransactionEntity>>;
}
