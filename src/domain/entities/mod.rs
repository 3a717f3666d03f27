pub mod bookings;
pub mod invoices;
pub mod order_items;
pub mod transactions;
