use std::sync::Arc;

use chrono::{Duration, Utc};
use serde_json::json;
use tracing::{info, warn};
use uuid::Uuid;

use crate::application::error::{EngineError, EngineResult};
use crate::domain::entities::transactions::InsertTransactionEntity;
use crate::domain::repositories::event_bus::{DomainEvent, EventPublisher, TRANSACTIONS_EVENTS};
use crate::domain::repositories::gateway::PaymentGatewayClient;
use crate::domain::repositories::scheduler::{ExpiryScheduler, transaction_job_key};
use crate::domain::repositories::transactions::TransactionRepository;
use crate::domain::value_objects::enums::transaction_statuses::TransactionStatus;
use crate::domain::value_objects::enums::transaction_types::TransactionType;
use crate::domain::value_objects::transactions::{
    TopUpModel, TransactionDto, generate_topup_order_id,
};

/// Wallet ledger: top-up records correlated to the gateway by order id,
/// mirroring the invoice state machine.
pub struct TransactionLedger {
    transactions: Arc<dyn TransactionRepository>,
    gateway: Arc<dyn PaymentGatewayClient>,
    scheduler: Arc<dyn ExpiryScheduler>,
    events: Arc<dyn EventPublisher>,
    topup_ttl: Duration,
}

impl TransactionLedger {
    pub fn new(
        transactions: Arc<dyn TransactionRepository>,
        gateway: Arc<dyn PaymentGatewayClient>,
        scheduler: Arc<dyn ExpiryScheduler>,
        events: Arc<dyn EventPublisher>,
        topup_ttl: Duration,
    ) -> Self {
        Self {
            transactions,
            gateway,
            scheduler,
            events,
            topup_ttl,
        }
    }

    pub async fn top_up(&self, model: TopUpModel) -> EngineResult<TransactionDto> {
        if model.amount <= 0 {
            return Err(EngineError::Validation(
                "top-up amount must be positive".to_string(),
            ));
        }
        if self.transactions.has_pending_topup(model.user_id).await? {
            return Err(EngineError::Conflict(
                "user already has a pending top-up".to_string(),
            ));
        }

        // The only external call made before the insert: the gateway must
        // hand back its payment artifacts for the order id.
        let order_id = generate_topup_order_id();
        let charge = self
            .gateway
            .create_charge(&order_id, model.user_id, model.amount)
            .await?;

        let now = Utc::now();
        let expired_at = now + self.topup_ttl;
        let transaction = self
            .transactions
            .insert(InsertTransactionEntity {
                id: Uuid::new_v4(),
                user_id: model.user_id,
                amount: model.amount,
                type_: TransactionType::Topup.to_string(),
                status: TransactionStatus::Pending.to_string(),
                order_id: order_id.clone(),
                va_number: charge.va_number,
                qris_url: charge.qris_url,
                payment_code: charge.payment_code,
                expired_at: Some(expired_at),
                created_at: now,
                updated_at: now,
            })
            .await?;
        info!(
            transaction_id = %transaction.id,
            order_id = %order_id,
            amount = transaction.amount,
            "transactions: top-up opened"
        );

        if let Err(err) = self
            .scheduler
            .schedule(
                transaction_job_key(transaction.id),
                expired_at,
                json!({ "transaction_id": transaction.id }),
            )
            .await
        {
            warn!(
                transaction_id = %transaction.id,
                error = ?err,
                "transactions: failed to schedule expiry job; sweeper will cover it"
            );
        }

        self.publish(DomainEvent::new(
            "topup-created",
            json!({
                "transaction_id": transaction.id,
                "user_id": transaction.user_id,
                "order_id": order_id,
                "amount": transaction.amount,
            }),
        ))
        .await;

        Ok(TransactionDto::from_entity(&transaction))
    }

    /// pending -> success; replays are a no-op so the wallet is credited
    /// exactly once.
    pub async fn settle(&self, order_id: &str) -> EngineResult<()> {
        let transaction = self.require_by_order_id(order_id).await?;

        let applied = self
            .transactions
            .mark_success(transaction.id, Utc::now())
            .await?;
        if applied {
            info!(
                transaction_id = %transaction.id,
                order_id = %order_id,
                "transactions: settled"
            );
            self.disarm_expiry(transaction.id).await;
            self.publish(DomainEvent::new(
                "topup-success",
                json!({
                    "transaction_id": transaction.id,
                    "user_id": transaction.user_id,
                    "order_id": order_id,
                    "amount": transaction.amount,
                }),
            ))
            .await;
            return Ok(());
        }

        match self.current_status(transaction.id).await? {
            TransactionStatus::Success => Ok(()),
            status => Err(EngineError::Conflict(format!(
                "transaction {order_id} is {status}, cannot settle"
            ))),
        }
    }

    /// Maps the gateway's deny/cancel verdicts: pending -> cancelled.
    pub async fn fail(&self, order_id: &str, reason: &str) -> EngineResult<()> {
        let transaction = self.require_by_order_id(order_id).await?;

        let applied = self
            .transactions
            .mark_cancelled(transaction.id, Utc::now())
            .await?;
        if applied {
            info!(
                transaction_id = %transaction.id,
                order_id = %order_id,
                reason,
                "transactions: failed by gateway"
            );
            self.disarm_expiry(transaction.id).await;
            self.publish(DomainEvent::new(
                "topup-failed",
                json!({
                    "transaction_id": transaction.id,
                    "order_id": order_id,
                    "reason": reason,
                }),
            ))
            .await;
            return Ok(());
        }

        match self.current_status(transaction.id).await? {
            TransactionStatus::Cancelled => Ok(()),
            status => Err(EngineError::Conflict(format!(
                "transaction {order_id} is {status}, cannot fail"
            ))),
        }
    }

    /// Fires from the scheduled job or the sweeper; only a still-pending
    /// transaction past its deadline transitions. Returns whether it applied.
    pub async fn expire(&self, transaction_id: Uuid) -> EngineResult<bool> {
        let applied = self
            .transactions
            .expire_due(transaction_id, Utc::now())
            .await?;
        if applied {
            info!(transaction_id = %transaction_id, "transactions: expired");
            self.disarm_expiry(transaction_id).await;
            self.publish(DomainEvent::new(
                "topup-expired",
                json!({ "transaction_id": transaction_id }),
            ))
            .await;
        } else {
            info!(
                transaction_id = %transaction_id,
                "transactions: stale expiry fire skipped"
            );
        }
        Ok(applied)
    }

    pub async fn get(&self, transaction_id: Uuid) -> EngineResult<TransactionDto> {
        let transaction = self
            .transactions
            .find_by_id(transaction_id)
            .await?
            .ok_or_else(|| EngineError::NotFound(format!("transaction {transaction_id}")))?;
        Ok(TransactionDto::from_entity(&transaction))
    }

    async fn require_by_order_id(
        &self,
        order_id: &str,
    ) -> EngineResult<crate::domain::entities::transactions::TransactionEntity> {
        self.transactions
            .find_by_order_id(order_id)
            .await?
            .ok_or_else(|| EngineError::NotFound(format!("transaction {order_id}")))
    }

    async fn current_status(&self, transaction_id: Uuid) -> EngineResult<TransactionStatus> {
        let transaction = self
            .transactions
            .find_by_id(transaction_id)
            .await?
            .ok_or_else(|| EngineError::NotFound(format!("transaction {transaction_id}")))?;
        TransactionStatus::from_str(&transaction.status).ok_or_else(|| {
            EngineError::Internal(anyhow::anyhow!(
                "transaction {transaction_id} carries unknown status {}",
                transaction.status
            ))
        })
    }

    async fn disarm_expiry(&self, transaction_id: Uuid) {
        if let Err(err) = self
            .scheduler
            .cancel(&transaction_job_key(transaction_id))
            .await
        {
            warn!(
                transaction_id = %transaction_id,
                error = ?err,
                "transactions: failed to cancel expiry job"
            );
        }
    }

    async fn publish(&self, event: DomainEvent) {
        if let Err(err) = self.events.publish(TRANSACTIONS_EVENTS, event).await {
            warn!(error = ?err, "transactions: failed to publish event");
        }
    }
}
