pub mod axum_http;
pub mod event_bus;
pub mod gateway;
pub mod postgres;
pub mod scheduler;
pub mod workers;
