use chrono::{DateTime, Utc};
use rand::Rng;
use rand::distributions::Alphanumeric;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::entities::transactions::TransactionEntity;

#[derive(Debug, Clone, Deserialize)]
pub struct TopUpModel {
    pub user_id: Uuid,
    pub amount: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct TransactionDto {
    pub id: Uuid,
    pub user_id: Uuid,
    pub amount: i64,
    #[serde(rename = "type")]
    pub type_: String,
    pub status: String,
    pub order_id: String,
    pub va_number: Option<String>,
    pub qris_url: Option<String>,
    pub payment_code: Option<String>,
    pub expired_at: Option<DateTime<Utc>>,
}

impl TransactionDto {
    pub fn from_entity(entity: &TransactionEntity) -> Self {
        Self {
            id: entity.id,
            user_id: entity.user_id,
            amount: entity.amount,
            type_: entity.type_.clone(),
            status: entity.status.clone(),
            order_id: entity.order_id.clone(),
            va_number: entity.va_number.clone(),
            qris_url: entity.qris_url.clone(),
            payment_code: entity.payment_code.clone(),
            expired_at: entity.expired_at,
        }
    }
}

/// Artifacts the gateway hands back for a pending charge.
#[derive(Debug, Clone, Default)]
pub struct GatewayCharge {
    pub va_number: Option<String>,
    pub qris_url: Option<String>,
    pub payment_code: Option<String>,
}

pub fn generate_topup_order_id() -> String {
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(10)
        .map(|c| (c as char).to_ascii_uppercase())
        .collect();
    format!("TOPUP-{suffix}")
}
