use serde::Deserialize;
use sha2::{Digest, Sha512};

/// Inbound payment-gateway callback body. Only the fields the reconciler
/// relies on are modelled; everything else the gateway sends is ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct GatewayCallbackPayload {
    pub order_id: String,
    pub status_code: String,
    pub gross_amount: String,
    pub signature_key: String,
    pub transaction_status: String,
    #[serde(default)]
    pub va_numbers: Vec<VaNumber>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VaNumber {
    pub va_number: String,
    pub bank: Option<String>,
}

/// `sha512(order_id + status_code + gross_amount + server_key)`, hex encoded.
pub fn expected_signature(
    order_id: &str,
    status_code: &str,
    gross_amount: &str,
    server_key: &str,
) -> String {
    let mut hasher = Sha512::new();
    hasher.update(order_id.as_bytes());
    hasher.update(status_code.as_bytes());
    hasher.update(gross_amount.as_bytes());
    hasher.update(server_key.as_bytes());
    hex::encode(hasher.finalize())
}

impl GatewayCallbackPayload {
    /// The callback transport is treated as untrusted even though it arrives
    /// over an authenticated channel.
    pub fn verify_signature(&self, server_key: &str) -> bool {
        let expected = expected_signature(
            &self.order_id,
            &self.status_code,
            &self.gross_amount,
            server_key,
        );
        // Both sides are fixed-length hex; compare without early exit.
        let provided = self.signature_key.as_bytes();
        let expected = expected.as_bytes();
        if provided.len() != expected.len() {
            return false;
        }
        provided
            .iter()
            .zip(expected.iter())
            .fold(0u8, |acc, (a, b)| acc | (a ^ b))
            == 0
    }
}
