pub mod bookings;
pub mod event_bus;
pub mod gateway;
pub mod invoices;
pub mod scheduler;
pub mod transactions;
