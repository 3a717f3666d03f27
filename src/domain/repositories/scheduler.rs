use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// "Run this callback no earlier than T, cancellable by key."
///
/// Cancellation is keyed by the same id used at schedule time; a key that is
/// missing at cancel time is not an error (it may have fired already or never
/// existed). Firing is delivered to a worker loop which must itself be
/// idempotent against an already-terminal owner.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ExpiryScheduler: Send + Sync {
    async fn schedule(
        &self,
        key: String,
        fire_at: DateTime<Utc>,
        payload: serde_json::Value,
    ) -> Result<()>;

    async fn cancel(&self, key: &str) -> Result<()>;
}

pub fn invoice_job_key(invoice_id: Uuid) -> String {
    format!("invoice:{invoice_id}")
}

pub fn transaction_job_key(transaction_id: Uuid) -> String {
    format!("transaction:{transaction_id}")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobOwner {
    Invoice(Uuid),
    Transaction(Uuid),
}

pub fn parse_job_key(key: &str) -> Option<JobOwner> {
    let (prefix, id) = key.split_once(':')?;
    let id = Uuid::parse_str(id).ok()?;
    match prefix {
        "invoice" => Some(JobOwner::Invoice(id)),
        "transaction" => Some(JobOwner::Transaction(id)),
        _ => None,
    }
}
