use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State},
    response::IntoResponse,
    routing::{get, post},
};
use uuid::Uuid;

use crate::application::error::EngineError;
use crate::application::usecases::transaction_ledger::TransactionLedger;
use crate::domain::value_objects::transactions::TopUpModel;
use crate::infrastructure::axum_http::responses;

pub fn routes(transaction_ledger: Arc<TransactionLedger>) -> Router {
    Router::new()
        .route("/top-up", post(top_up))
        .route("/transactions/:transaction_id", get(get_transaction))
        .with_state(transaction_ledger)
}

pub async fn top_up(
    State(transaction_ledger): State<Arc<TransactionLedger>>,
    Json(model): Json<TopUpModel>,
) -> Result<impl IntoResponse, EngineError> {
    let transaction = transaction_ledger.top_up(model).await?;
    Ok(responses::created("top-up opened", transaction))
}

pub async fn get_transaction(
    State(transaction_ledger): State<Arc<TransactionLedger>>,
    Path(transaction_id): Path<Uuid>,
) -> Result<impl IntoResponse, EngineError> {
    let transaction = transaction_ledger.get(transaction_id).await?;
    Ok(responses::ok("transaction", transaction))
}
