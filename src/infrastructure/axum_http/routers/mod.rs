pub mod bookings;
pub mod gateway_webhook;
pub mod wallet;
