use std::sync::Arc;

use axum::{Json, Router, extract::State, response::IntoResponse, routing::post};

use crate::application::error::EngineError;
use crate::application::usecases::gateway_reconciler::{GatewayReconciler, ReconcileOutcome};
use crate::domain::value_objects::gateway_callback::GatewayCallbackPayload;
use crate::infrastructure::axum_http::responses;

pub fn routes(reconciler: Arc<GatewayReconciler>) -> Router {
    Router::new()
        .route("/callback", post(notification))
        .with_state(reconciler)
}

/// The gateway's asynchronous payment notification. Must always answer 2xx
/// for handled callbacks, including replays, or the gateway keeps retrying.
pub async fn notification(
    State(reconciler): State<Arc<GatewayReconciler>>,
    Json(payload): Json<GatewayCallbackPayload>,
) -> Result<impl IntoResponse, EngineError> {
    let outcome = reconciler.handle_callback(payload).await?;
    let message = match outcome {
        ReconcileOutcome::Applied => "notification applied",
        ReconcileOutcome::AlreadyProcessed => "notification already processed",
        ReconcileOutcome::Pending => "notification acknowledged, still pending",
    };
    Ok(responses::ok(message, serde_json::json!({})))
}
