use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use serde::Deserialize;
use serde_json::json;
use tracing::error;
use uuid::Uuid;

use crate::domain::repositories::gateway::PaymentGatewayClient;
use crate::domain::value_objects::transactions::GatewayCharge;

const CHARGE_TIMEOUT: Duration = Duration::from_secs(10);

/// Minimal payment gateway client built on reqwest. The gateway speaks the
/// Midtrans Core API dialect: a charge is registered up front and the final
/// verdict arrives later on the notification webhook.
pub struct HttpGatewayClient {
    http: reqwest::Client,
    base_url: String,
    server_key: String,
}

#[derive(Debug, Deserialize)]
struct ChargeResponse {
    status_code: String,
    status_message: Option<String>,
    #[serde(default)]
    va_numbers: Vec<VaNumber>,
    #[serde(default)]
    actions: Vec<ChargeAction>,
    payment_code: Option<String>,
}

#[derive(Debug, Deserialize)]
struct VaNumber {
    va_number: String,
}

#[derive(Debug, Deserialize)]
struct ChargeAction {
    name: String,
    url: String,
}

impl HttpGatewayClient {
    pub fn new(base_url: String, server_key: String) -> Result<Self> {
        let http = reqwest::Client::builder().timeout(CHARGE_TIMEOUT).build()?;
        Ok(Self {
            http,
            base_url,
            server_key,
        })
    }
}

#[async_trait]
impl PaymentGatewayClient for HttpGatewayClient {
    async fn create_charge(
        &self,
        order_id: &str,
        user_id: Uuid,
        amount: i64,
    ) -> Result<GatewayCharge> {
        let body = json!({
            "payment_type": "bank_transfer",
            "transaction_details": {
                "order_id": order_id,
                "gross_amount": amount,
            },
            "custom_field1": user_id.to_string(),
        });

        let resp = self
            .http
            .post(format!("{}/v2/charge", self.base_url))
            .basic_auth(&self.server_key, Some(""))
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, "application/json")
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            error!(
                status = %status,
                response_body = %body,
                order_id = %order_id,
                "gateway charge request failed"
            );
            anyhow::bail!("gateway charge failed for {order_id} (status {status})");
        }

        let parsed: ChargeResponse = resp.json().await?;
        // The gateway also encodes rejection in the body status_code.
        if !parsed.status_code.starts_with('2') {
            error!(
                gateway_status_code = %parsed.status_code,
                gateway_status_message = ?parsed.status_message,
                order_id = %order_id,
                "gateway rejected the charge"
            );
            anyhow::bail!(
                "gateway rejected charge for {order_id} (code {})",
                parsed.status_code
            );
        }

        let qris_url = parsed
            .actions
            .iter()
            .find(|action| action.name == "generate-qr-code")
            .map(|action| action.url.clone());

        Ok(GatewayCharge {
            va_number: parsed.va_numbers.first().map(|va| va.va_number.clone()),
            qris_url,
            payment_code: parsed.payment_code,
        })
    }
}
