use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde_json::json;
use tracing::{info, warn};
use uuid::Uuid;

use crate::application::error::{EngineError, EngineResult};
use crate::domain::entities::invoices::{InsertInvoiceEntity, InvoiceEntity};
use crate::domain::repositories::event_bus::{BOOKING_EVENTS, DomainEvent, EventPublisher};
use crate::domain::repositories::invoices::InvoiceRepository;
use crate::domain::repositories::scheduler::{ExpiryScheduler, invoice_job_key};
use crate::domain::value_objects::enums::invoice_statuses::InvoiceStatus;
use crate::domain::value_objects::invoices::{
    InvoiceExpireOutcome, InvoiceOwner, generate_invoice_number,
};

/// Issues invoices and drives every invoice status transition. All writes go
/// through conditional updates so replays and job-vs-sweep races converge on
/// a single transition.
pub struct InvoiceManager {
    invoices: Arc<dyn InvoiceRepository>,
    scheduler: Arc<dyn ExpiryScheduler>,
    events: Arc<dyn EventPublisher>,
}

impl InvoiceManager {
    pub fn new(
        invoices: Arc<dyn InvoiceRepository>,
        scheduler: Arc<dyn ExpiryScheduler>,
        events: Arc<dyn EventPublisher>,
    ) -> Self {
        Self {
            invoices,
            scheduler,
            events,
        }
    }

    /// Builds the row for an invoice issued at `now` with a fixed TTL. Used
    /// both by `issue` and by the combined booking-create transaction, which
    /// inserts the invoice itself.
    pub fn build_insert(
        owner: InvoiceOwner,
        amount: i64,
        ttl: Duration,
        now: DateTime<Utc>,
    ) -> InsertInvoiceEntity {
        let (booking_id, event_order_id) = match owner {
            InvoiceOwner::Booking(id) => (Some(id), None),
            InvoiceOwner::EventOrder(id) => (None, Some(id)),
        };

        InsertInvoiceEntity {
            id: Uuid::new_v4(),
            booking_id,
            event_order_id,
            invoice_number: generate_invoice_number(now),
            amount,
            status: InvoiceStatus::Pending.to_string(),
            issued_at: now,
            expired_at: Some(now + ttl),
        }
    }

    pub async fn issue(
        &self,
        owner: InvoiceOwner,
        amount: i64,
        ttl: Duration,
    ) -> EngineResult<InvoiceEntity> {
        if amount < 0 {
            return Err(EngineError::Validation(
                "invoice amount must not be negative".to_string(),
            ));
        }

        let insert = Self::build_insert(owner, amount, ttl, Utc::now());
        let invoice = self.invoices.insert(insert).await?;
        info!(
            invoice_id = %invoice.id,
            invoice_number = %invoice.invoice_number,
            amount = invoice.amount,
            "invoices: issued"
        );

        self.arm_expiry(&invoice).await;
        Ok(invoice)
    }

    /// Schedules the expiry job for a pending invoice. A scheduling failure is
    /// logged, not raised: the sweeper re-derives the same outcome.
    pub async fn arm_expiry(&self, invoice: &InvoiceEntity) {
        let Some(expired_at) = invoice.expired_at else {
            return;
        };

        let payload = json!({ "invoice_id": invoice.id });
        if let Err(err) = self
            .scheduler
            .schedule(invoice_job_key(invoice.id), expired_at, payload)
            .await
        {
            warn!(
                invoice_id = %invoice.id,
                error = ?err,
                "invoices: failed to schedule expiry job; sweeper will cover it"
            );
        }
    }

    /// Removes the expiry job; a job that has already fired or never existed
    /// is not an error.
    pub async fn disarm_expiry(&self, invoice_id: Uuid) {
        if let Err(err) = self.scheduler.cancel(&invoice_job_key(invoice_id)).await {
            warn!(
                invoice_id = %invoice_id,
                error = ?err,
                "invoices: failed to cancel expiry job"
            );
        }
    }

    pub async fn mark_paid(&self, invoice_id: Uuid) -> EngineResult<()> {
        let applied = self.invoices.mark_paid(invoice_id, Utc::now()).await?;
        if applied {
            info!(invoice_id = %invoice_id, "invoices: marked paid");
            self.disarm_expiry(invoice_id).await;
            return Ok(());
        }

        match self.current_status(invoice_id).await? {
            InvoiceStatus::Paid => {
                // Replayed settlement; keep it a no-op but make sure no stale
                // job is left behind.
                self.disarm_expiry(invoice_id).await;
                Ok(())
            }
            status => Err(EngineError::Conflict(format!(
                "invoice {invoice_id} is {status}, cannot mark paid"
            ))),
        }
    }

    pub async fn mark_cancelled(&self, invoice_id: Uuid) -> EngineResult<()> {
        let applied = self.invoices.mark_cancelled(invoice_id, Utc::now()).await?;
        if applied {
            info!(invoice_id = %invoice_id, "invoices: marked cancelled");
            self.disarm_expiry(invoice_id).await;
            return Ok(());
        }

        match self.current_status(invoice_id).await? {
            InvoiceStatus::Cancelled => Ok(()),
            status => Err(EngineError::Conflict(format!(
                "invoice {invoice_id} is {status}, cannot cancel"
            ))),
        }
    }

    /// Expires a pending invoice past its deadline, releasing the owning
    /// booking's slot. A stale fire (already terminal, not yet due, missing)
    /// is a silent no-op so the scheduled-job and sweep paths converge.
    pub async fn expire(&self, invoice_id: Uuid) -> EngineResult<InvoiceExpireOutcome> {
        let outcome = self
            .invoices
            .expire_due_with_booking_release(invoice_id, Utc::now())
            .await?;

        match &outcome {
            InvoiceExpireOutcome::Expired {
                released_booking_id,
            } => {
                info!(
                    invoice_id = %invoice_id,
                    released_booking_id = ?released_booking_id,
                    "invoices: expired"
                );
                self.disarm_expiry(invoice_id).await;
                if let Some(booking_id) = released_booking_id {
                    self.publish(
                        BOOKING_EVENTS,
                        DomainEvent::new(
                            "booking-expired",
                            json!({ "booking_id": booking_id, "invoice_id": invoice_id }),
                        ),
                    )
                    .await;
                }
            }
            InvoiceExpireOutcome::Skipped => {
                info!(invoice_id = %invoice_id, "invoices: stale expiry fire skipped");
            }
        }

        Ok(outcome)
    }

    pub async fn adjust_amount(&self, invoice_id: Uuid, delta: i64) -> EngineResult<()> {
        if delta == 0 {
            return Ok(());
        }

        let applied = self.invoices.adjust_amount(invoice_id, delta).await?;
        if applied {
            info!(invoice_id = %invoice_id, delta, "invoices: amount adjusted");
            return Ok(());
        }

        let status = self.current_status(invoice_id).await?;
        Err(EngineError::Conflict(format!(
            "invoice {invoice_id} is {status}, amount is frozen"
        )))
    }

    pub async fn get(&self, invoice_id: Uuid) -> EngineResult<InvoiceEntity> {
        self.invoices
            .find_by_id(invoice_id)
            .await?
            .ok_or_else(|| EngineError::NotFound(format!("invoice {invoice_id}")))
    }

    pub async fn get_by_booking(&self, booking_id: Uuid) -> EngineResult<InvoiceEntity> {
        self.invoices
            .find_by_booking_id(booking_id)
            .await?
            .ok_or_else(|| EngineError::NotFound(format!("invoice for booking {booking_id}")))
    }

    async fn current_status(&self, invoice_id: Uuid) -> EngineResult<InvoiceStatus> {
        let invoice = self.get(invoice_id).await?;
        InvoiceStatus::from_str(&invoice.status).ok_or_else(|| {
            EngineError::Internal(anyhow::anyhow!(
                "invoice {invoice_id} carries unknown status {}",
                invoice.status
            ))
        })
    }

    async fn publish(&self, channel: &str, event: DomainEvent) {
        if let Err(err) = self.events.publish(channel, event).await {
            warn!(channel, error = ?err, "invoices: failed to publish event");
        }
    }
}
