pub mod booking_ledger;
pub mod expiry_sweeper;
pub mod gateway_reconciler;
pub mod invoice_manager;
pub mod transaction_ledger;
