use std::sync::Arc;

use chrono::Utc;
use tokio::sync::mpsc;
use tracing::{error, info, warn};

use crate::application::usecases::{
    expiry_sweeper::ExpirySweeper, invoice_manager::InvoiceManager,
    transaction_ledger::TransactionLedger,
};
use crate::domain::repositories::scheduler::{JobOwner, parse_job_key};
use crate::infrastructure::scheduler::tokio_scheduler::FiredJob;

/// Consumes fired expiry jobs. Both dispatch targets tolerate stale fires,
/// so a job racing a payment or the sweeper is harmless.
pub async fn run_fired_job_worker(
    mut fired_rx: mpsc::UnboundedReceiver<FiredJob>,
    invoice_manager: Arc<InvoiceManager>,
    transaction_ledger: Arc<TransactionLedger>,
) {
    info!("expiry worker: started");

    while let Some(job) = fired_rx.recv().await {
        let Some(owner) = parse_job_key(&job.key) else {
            warn!(key = %job.key, "expiry worker: unrecognized job key, dropping");
            continue;
        };

        let result = match owner {
            JobOwner::Invoice(invoice_id) => invoice_manager
                .expire(invoice_id)
                .await
                .map(|_outcome| ()),
            JobOwner::Transaction(transaction_id) => transaction_ledger
                .expire(transaction_id)
                .await
                .map(|_applied| ()),
        };

        if let Err(err) = result {
            error!(
                key = %job.key,
                error = ?err,
                "expiry worker: job failed; sweeper will retry"
            );
        }
    }

    info!("expiry worker: channel closed, stopping");
}

/// Periodic fallback sweep covering jobs lost to restarts or scheduling
/// failures.
pub async fn run_sweeper_loop(sweeper: Arc<ExpirySweeper>, interval_seconds: u64) {
    info!(interval_seconds, "sweeper: started");
    let mut ticker = tokio::time::interval(std::time::Duration::from_secs(interval_seconds));
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;
        sweeper.run_once(Utc::now()).await;
    }
}
