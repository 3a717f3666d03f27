use std::sync::Arc;

use serde_json::json;
use tracing::{info, warn};

use crate::application::error::{EngineError, EngineResult};
use crate::application::usecases::booking_ledger::BookingLedger;
use crate::application::usecases::invoice_manager::InvoiceManager;
use crate::application::usecases::transaction_ledger::TransactionLedger;
use crate::domain::entities::{invoices::InvoiceEntity, transactions::TransactionEntity};
use crate::domain::repositories::event_bus::{BOOKING_EVENTS, DomainEvent, EventPublisher};
use crate::domain::repositories::invoices::InvoiceRepository;
use crate::domain::repositories::transactions::TransactionRepository;
use crate::domain::value_objects::enums::gateway_transaction_statuses::GatewayTransactionStatus;
use crate::domain::value_objects::enums::invoice_statuses::InvoiceStatus;
use crate::domain::value_objects::enums::transaction_statuses::TransactionStatus;
use crate::domain::value_objects::gateway_callback::GatewayCallbackPayload;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// A transition was applied.
    Applied,
    /// The owner was already terminal; replayed callbacks resolve here.
    AlreadyProcessed,
    /// Gateway still reports pending; nothing to do.
    Pending,
}

/// Maps asynchronous gateway callbacks onto invoice/transaction/booking
/// transitions, idempotently. Transitions are only ever applied through the
/// managers, never by writing status directly.
pub struct GatewayReconciler {
    invoices: Arc<dyn InvoiceRepository>,
    transactions: Arc<dyn TransactionRepository>,
    invoice_manager: Arc<InvoiceManager>,
    transaction_ledger: Arc<TransactionLedger>,
    booking_ledger: Arc<BookingLedger>,
    events: Arc<dyn EventPublisher>,
    server_key: String,
}

impl GatewayReconciler {
    pub fn new(
        invoices: Arc<dyn InvoiceRepository>,
        transactions: Arc<dyn TransactionRepository>,
        invoice_manager: Arc<InvoiceManager>,
        transaction_ledger: Arc<TransactionLedger>,
        booking_ledger: Arc<BookingLedger>,
        events: Arc<dyn EventPublisher>,
        server_key: String,
    ) -> Self {
        Self {
            invoices,
            transactions,
            invoice_manager,
            transaction_ledger,
            booking_ledger,
            events,
            server_key,
        }
    }

    pub async fn handle_callback(
        &self,
        payload: GatewayCallbackPayload,
    ) -> EngineResult<ReconcileOutcome> {
        if !payload.verify_signature(&self.server_key) {
            warn!(
                order_id = %payload.order_id,
                "reconciler: callback signature mismatch"
            );
            return Err(EngineError::Unauthorized(
                "invalid callback signature".to_string(),
            ));
        }

        let gateway_status = GatewayTransactionStatus::from_str(&payload.transaction_status)
            .ok_or_else(|| {
                EngineError::Validation(format!(
                    "unsupported transaction_status: {}",
                    payload.transaction_status
                ))
            })?;

        if let Some(invoice) = self.invoices.find_by_order_id(&payload.order_id).await? {
            return self
                .reconcile_invoice(invoice, gateway_status, &payload)
                .await;
        }
        if let Some(transaction) = self
            .transactions
            .find_by_order_id(&payload.order_id)
            .await?
        {
            return self
                .reconcile_transaction(transaction, gateway_status, &payload)
                .await;
        }

        Err(EngineError::NotFound(format!("order {}", payload.order_id)))
    }

    async fn reconcile_invoice(
        &self,
        invoice: InvoiceEntity,
        gateway_status: GatewayTransactionStatus,
        payload: &GatewayCallbackPayload,
    ) -> EngineResult<ReconcileOutcome> {
        let status = InvoiceStatus::from_str(&invoice.status).ok_or_else(|| {
            EngineError::Internal(anyhow::anyhow!(
                "invoice {} carries unknown status {}",
                invoice.id,
                invoice.status
            ))
        })?;
        if status.is_terminal() {
            // Gateways retry callbacks; a replay against a settled owner must
            // be a safe no-op, not a double credit.
            info!(
                order_id = %payload.order_id,
                invoice_id = %invoice.id,
                status = %status,
                "reconciler: replayed callback for terminal invoice"
            );
            return Ok(ReconcileOutcome::AlreadyProcessed);
        }

        match gateway_status {
            GatewayTransactionStatus::Pending => Ok(ReconcileOutcome::Pending),
            GatewayTransactionStatus::Capture | GatewayTransactionStatus::Settlement => {
                self.invoice_manager.mark_paid(invoice.id).await?;
                if let Some(booking_id) = invoice.booking_id {
                    self.booking_ledger.mark_paid(booking_id).await?;
                }
                self.publish(DomainEvent::new(
                    "invoice-paid",
                    json!({
                        "invoice_id": invoice.id,
                        "booking_id": invoice.booking_id,
                        "order_id": payload.order_id,
                    }),
                ))
                .await;
                Ok(ReconcileOutcome::Applied)
            }
            GatewayTransactionStatus::Expire => {
                self.invoice_manager.expire(invoice.id).await?;
                Ok(ReconcileOutcome::Applied)
            }
            GatewayTransactionStatus::Deny | GatewayTransactionStatus::Cancel => {
                self.invoice_manager.mark_cancelled(invoice.id).await?;
                if let Some(booking_id) = invoice.booking_id {
                    self.booking_ledger.cancel(booking_id).await?;
                }
                self.publish(DomainEvent::new(
                    "invoice-cancelled",
                    json!({
                        "invoice_id": invoice.id,
                        "booking_id": invoice.booking_id,
                        "order_id": payload.order_id,
                        "gateway_status": gateway_status.as_str(),
                    }),
                ))
                .await;
                Ok(ReconcileOutcome::Applied)
            }
        }
    }

    async fn reconcile_transaction(
        &self,
        transaction: TransactionEntity,
        gateway_status: GatewayTransactionStatus,
        payload: &GatewayCallbackPayload,
    ) -> EngineResult<ReconcileOutcome> {
        let status = TransactionStatus::from_str(&transaction.status).ok_or_else(|| {
            EngineError::Internal(anyhow::anyhow!(
                "transaction {} carries unknown status {}",
                transaction.id,
                transaction.status
            ))
        })?;
        if status.is_terminal() {
            info!(
                order_id = %payload.order_id,
                transaction_id = %transaction.id,
                status = %status,
                "reconciler: replayed callback for terminal transaction"
            );
            return Ok(ReconcileOutcome::AlreadyProcessed);
        }

        match gateway_status {
            GatewayTransactionStatus::Pending => Ok(ReconcileOutcome::Pending),
            GatewayTransactionStatus::Capture | GatewayTransactionStatus::Settlement => {
                self.transaction_ledger.settle(&payload.order_id).await?;
                Ok(ReconcileOutcome::Applied)
            }
            GatewayTransactionStatus::Expire => {
                self.transaction_ledger.expire(transaction.id).await?;
                Ok(ReconcileOutcome::Applied)
            }
            GatewayTransactionStatus::Deny | GatewayTransactionStatus::Cancel => {
                self.transaction_ledger
                    .fail(&payload.order_id, gateway_status.as_str())
                    .await?;
                Ok(ReconcileOutcome::Applied)
            }
        }
    }

    async fn publish(&self, event: DomainEvent) {
        if let Err(err) = self.events.publish(BOOKING_EVENTS, event).await {
            warn!(error = ?err, "reconciler: failed to publish event");
        }
    }
}
