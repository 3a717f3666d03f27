use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{error, info};

use crate::application::usecases::booking_ledger::BookingLedger;
use crate::application::usecases::invoice_manager::InvoiceManager;
use crate::application::usecases::transaction_ledger::TransactionLedger;
use crate::domain::repositories::invoices::InvoiceRepository;
use crate::domain::repositories::transactions::TransactionRepository;
use crate::domain::value_objects::invoices::InvoiceExpireOutcome;

const SWEEP_BATCH_LIMIT: i64 = 200;

#[derive(Debug, Clone, Copy, Default)]
pub struct SweepReport {
    pub scanned_invoices: usize,
    pub expired_invoices: usize,
    pub scanned_transactions: usize,
    pub expired_transactions: usize,
    pub completed_bookings: usize,
    pub failures: usize,
}

/// Periodic fallback pass: expires anything still pending past its deadline,
/// whether or not the matching scheduled job ever fired. Safe to run
/// concurrently with firing jobs; both paths converge through the
/// conditional updates in the managers.
pub struct ExpirySweeper {
    invoices: Arc<dyn InvoiceRepository>,
    transactions: Arc<dyn TransactionRepository>,
    invoice_manager: Arc<InvoiceManager>,
    transaction_ledger: Arc<TransactionLedger>,
    booking_ledger: Arc<BookingLedger>,
}

impl ExpirySweeper {
    pub fn new(
        invoices: Arc<dyn InvoiceRepository>,
        transactions: Arc<dyn TransactionRepository>,
        invoice_manager: Arc<InvoiceManager>,
        transaction_ledger: Arc<TransactionLedger>,
        booking_ledger: Arc<BookingLedger>,
    ) -> Self {
        Self {
            invoices,
            transactions,
            invoice_manager,
            transaction_ledger,
            booking_ledger,
        }
    }

    /// One sweep pass. A single failed row is logged and skipped; the pass
    /// never aborts.
    pub async fn run_once(&self, now: DateTime<Utc>) -> SweepReport {
        let mut report = SweepReport::default();

        match self.invoices.list_due_pending(now, SWEEP_BATCH_LIMIT).await {
            Ok(due) => {
                report.scanned_invoices = due.len();
                for invoice in due {
                    match self.invoice_manager.expire(invoice.id).await {
                        Ok(InvoiceExpireOutcome::Expired { .. }) => report.expired_invoices += 1,
                        Ok(InvoiceExpireOutcome::Skipped) => {}
                        Err(err) => {
                            error!(
                                invoice_id = %invoice.id,
                                error = ?err,
                                "sweep: failed to expire invoice; continuing"
                            );
                            report.failures += 1;
                        }
                    }
                }
            }
            Err(err) => {
                error!(error = ?err, "sweep: failed to list due invoices");
                report.failures += 1;
            }
        }

        match self
            .transactions
            .list_due_pending(now, SWEEP_BATCH_LIMIT)
            .await
        {
            Ok(due) => {
                report.scanned_transactions = due.len();
                for transaction in due {
                    match self.transaction_ledger.expire(transaction.id).await {
                        Ok(true) => report.expired_transactions += 1,
                        Ok(false) => {}
                        Err(err) => {
                            error!(
                                transaction_id = %transaction.id,
                                error = ?err,
                                "sweep: failed to expire transaction; continuing"
                            );
                            report.failures += 1;
                        }
                    }
                }
            }
            Err(err) => {
                error!(error = ?err, "sweep: failed to list due transactions");
                report.failures += 1;
            }
        }

        match self.booking_ledger.complete_elapsed().await {
            Ok(completed) => report.completed_bookings = completed.len(),
            Err(err) => {
                error!(error = ?err, "sweep: failed to complete elapsed bookings");
                report.failures += 1;
            }
        }

        info!(
            scanned_invoices = report.scanned_invoices,
            expired_invoices = report.expired_invoices,
            scanned_transactions = report.scanned_transactions,
            expired_transactions = report.expired_transactions,
            completed_bookings = report.completed_bookings,
            failures = report.failures,
            "sweep: completed"
        );

        report
    }
}
