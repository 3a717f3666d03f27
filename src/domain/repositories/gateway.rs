use anyhow::Result;
use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::value_objects::transactions::GatewayCharge;

/// The one pre-commit external call the engine makes: registering a charge
/// with the payment gateway to obtain its payment artifacts.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PaymentGatewayClient: Send + Sync {
    async fn create_charge(
        &self,
        order_id: &str,
        user_id: Uuid,
        amount: i64,
    ) -> Result<GatewayCharge>;
}
