pub mod bookings;
pub mod enums;
pub mod gateway_callback;
pub mod invoices;
pub mod time_ranges;
pub mod transactions;
