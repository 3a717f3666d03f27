use std::sync::Arc;

use anyhow::Result;
use chrono::Duration;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use slotbook::application::usecases::{
    booking_ledger::BookingLedger, expiry_sweeper::ExpirySweeper,
    gateway_reconciler::GatewayReconciler, invoice_manager::InvoiceManager,
    transaction_ledger::TransactionLedger,
};
use slotbook::config::config_loader;
use slotbook::infrastructure::axum_http::http_serve;
use slotbook::infrastructure::event_bus::BroadcastEventBus;
use slotbook::infrastructure::gateway::http_client::HttpGatewayClient;
use slotbook::infrastructure::postgres::postgres_connection;
use slotbook::infrastructure::postgres::repositories::{
    bookings::BookingPostgres, invoices::InvoicePostgres, transactions::TransactionPostgres,
};
use slotbook::infrastructure::scheduler::tokio_scheduler::TokioExpiryScheduler;
use slotbook::infrastructure::workers;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        error!("Engine exited with error: {}", error);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Arc::new(config_loader::load()?);
    info!("ENV has been loaded");

    let db_pool = Arc::new(postgres_connection::establish_connection(
        &config.database.url,
    )?);
    info!("Postgres connection has been established");

    let bookings_repository = Arc::new(BookingPostgres::new(Arc::clone(&db_pool)));
    let invoices_repository = Arc::new(InvoicePostgres::new(Arc::clone(&db_pool)));
    let transactions_repository = Arc::new(TransactionPostgres::new(Arc::clone(&db_pool)));

    let (scheduler, fired_rx) = TokioExpiryScheduler::new();
    let scheduler = Arc::new(scheduler);
    let event_bus = Arc::new(BroadcastEventBus::new());
    let gateway_client = Arc::new(HttpGatewayClient::new(
        config.gateway.base_url.clone(),
        config.gateway.server_key.clone(),
    )?);

    let invoice_ttl = Duration::minutes(config.billing.invoice_ttl_minutes);
    let topup_ttl = Duration::minutes(config.billing.topup_ttl_minutes);

    let invoice_manager = Arc::new(InvoiceManager::new(
        invoices_repository.clone(),
        scheduler.clone(),
        event_bus.clone(),
    ));
    let booking_ledger = Arc::new(BookingLedger::new(
        bookings_repository.clone(),
        Arc::clone(&invoice_manager),
        event_bus.clone(),
        invoice_ttl,
    ));
    let transaction_ledger = Arc::new(TransactionLedger::new(
        transactions_repository.clone(),
        gateway_client,
        scheduler.clone(),
        event_bus.clone(),
        topup_ttl,
    ));
    let reconciler = Arc::new(GatewayReconciler::new(
        invoices_repository.clone(),
        transactions_repository.clone(),
        Arc::clone(&invoice_manager),
        Arc::clone(&transaction_ledger),
        Arc::clone(&booking_ledger),
        event_bus.clone(),
        config.gateway.server_key.clone(),
    ));
    let sweeper = Arc::new(ExpirySweeper::new(
        invoices_repository,
        transactions_repository,
        Arc::clone(&invoice_manager),
        Arc::clone(&transaction_ledger),
        Arc::clone(&booking_ledger),
    ));

    tokio::spawn(workers::run_fired_job_worker(
        fired_rx,
        Arc::clone(&invoice_manager),
        Arc::clone(&transaction_ledger),
    ));
    tokio::spawn(workers::run_sweeper_loop(
        sweeper,
        config.billing.sweep_interval_seconds,
    ));

    http_serve::start(config, booking_ledger, transaction_ledger, reconciler).await?;

    Ok(())
}
