pub mod bookings;
pub mod invoices;
pub mod transactions;
