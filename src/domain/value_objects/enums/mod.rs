pub mod booking_statuses;
pub mod gateway_transaction_statuses;
pub mod invoice_statuses;
pub mod transaction_statuses;
pub mod transaction_types;
