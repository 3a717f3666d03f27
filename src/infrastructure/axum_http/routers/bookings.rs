use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State},
    response::IntoResponse,
    routing::{get, patch, post},
};
use serde::Deserialize;
use uuid::Uuid;

use crate::application::error::EngineError;
use crate::application::usecases::booking_ledger::BookingLedger;
use crate::domain::value_objects::bookings::{CreateBookingModel, OrderItemModel};
use crate::infrastructure::axum_http::responses;

pub fn routes(booking_ledger: Arc<BookingLedger>) -> Router {
    Router::new()
        .route("/", post(create_booking))
        .route("/:booking_id/invoice", get(get_invoice))
        .route("/:booking_id/pay", post(record_payment))
        .route("/:booking_id/cancel", post(cancel_booking))
        .route("/:booking_id/complete", post(complete_booking))
        .route("/:booking_id/order-items", post(add_order_item))
        .route(
            "/:booking_id/recalculate-total",
            post(recalculate_total),
        )
        .route(
            "/order-items/:item_id",
            patch(update_order_item).delete(remove_order_item),
        )
        .with_state(booking_ledger)
}

#[derive(Debug, Deserialize)]
pub struct UpdateOrderItemModel {
    pub quantity: i32,
    pub subtotal: i64,
}

pub async fn create_booking(
    State(booking_ledger): State<Arc<BookingLedger>>,
    Json(model): Json<CreateBookingModel>,
) -> Result<impl IntoResponse, EngineError> {
    let created = booking_ledger.create_booking(model).await?;
    Ok(responses::created("booking created", created))
}

pub async fn get_invoice(
    State(booking_ledger): State<Arc<BookingLedger>>,
    Path(booking_id): Path<Uuid>,
) -> Result<impl IntoResponse, EngineError> {
    let invoice = booking_ledger.get_invoice(booking_id).await?;
    Ok(responses::ok("invoice", invoice))
}

pub async fn record_payment(
    State(booking_ledger): State<Arc<BookingLedger>>,
    Path(booking_id): Path<Uuid>,
) -> Result<impl IntoResponse, EngineError> {
    let invoice = booking_ledger.record_payment(booking_id).await?;
    Ok(responses::ok("booking paid", invoice))
}

pub async fn cancel_booking(
    State(booking_ledger): State<Arc<BookingLedger>>,
    Path(booking_id): Path<Uuid>,
) -> Result<impl IntoResponse, EngineError> {
    booking_ledger.cancel(booking_id).await?;
    Ok(responses::ok("booking cancelled", serde_json::json!({})))
}

pub async fn complete_booking(
    State(booking_ledger): State<Arc<BookingLedger>>,
    Path(booking_id): Path<Uuid>,
) -> Result<impl IntoResponse, EngineError> {
    booking_ledger.complete(booking_id).await?;
    Ok(responses::ok("booking completed", serde_json::json!({})))
}

pub async fn add_order_item(
    State(booking_ledger): State<Arc<BookingLedger>>,
    Path(booking_id): Path<Uuid>,
    Json(item): Json<OrderItemModel>,
) -> Result<impl IntoResponse, EngineError> {
    let snapshot = booking_ledger.add_order_item(booking_id, item).await?;
    Ok(responses::ok("order item added", snapshot))
}

pub async fn update_order_item(
    State(booking_ledger): State<Arc<BookingLedger>>,
    Path(item_id): Path<Uuid>,
    Json(model): Json<UpdateOrderItemModel>,
) -> Result<impl IntoResponse, EngineError> {
    let snapshot = booking_ledger
        .update_order_item(item_id, model.quantity, model.subtotal)
        .await?;
    Ok(responses::ok("order item updated", snapshot))
}

pub async fn remove_order_item(
    State(booking_ledger): State<Arc<BookingLedger>>,
    Path(item_id): Path<Uuid>,
) -> Result<impl IntoResponse, EngineError> {
    let snapshot = booking_ledger.remove_order_item(item_id).await?;
    Ok(responses::ok("order item removed", snapshot))
}

pub async fn recalculate_total(
    State(booking_ledger): State<Arc<BookingLedger>>,
    Path(booking_id): Path<Uuid>,
) -> Result<impl IntoResponse, EngineError> {
    let snapshot = booking_ledger.recalculate_total(booking_id).await?;
    Ok(responses::ok("totals recalculated", snapshot))
}
