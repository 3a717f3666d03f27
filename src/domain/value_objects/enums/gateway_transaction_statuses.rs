use std::fmt::Display;

/// Raw `transaction_status` values the payment gateway sends in callbacks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GatewayTransactionStatus {
    Capture,
    Settlement,
    Pending,
    Deny,
    Cancel,
    Expire,
}

impl GatewayTransactionStatus {
    pub fn from_str(value: &str) -> Option<Self> {
        match value {
            "capture" => Some(GatewayTransactionStatus::Capture),
            "settlement" => Some(GatewayTransactionStatus::Settlement),
            "pending" => Some(GatewayTransactionStatus::Pending),
            "deny" => Some(GatewayTransactionStatus::Deny),
            "cancel" => Some(GatewayTransactionStatus::Cancel),
            "expire" => Some(GatewayTransactionStatus::Expire),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            GatewayTransactionStatus::Capture => "capture",
            GatewayTransactionStatus::Settlement => "settlement",
            GatewayTransactionStatus::Pending => "pending",
            GatewayTransactionStatus::Deny => "deny",
            GatewayTransactionStatus::Cancel => "cancel",
            GatewayTransactionStatus::Expire => "expire",
        }
    }

    /// capture|settlement -> paid, deny|cancel -> cancelled, expire -> expired.
    pub fn is_settled(&self) -> bool {
        matches!(
            self,
            GatewayTransactionStatus::Capture | GatewayTransactionStatus::Settlement
        )
    }

    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            GatewayTransactionStatus::Deny | GatewayTransactionStatus::Cancel
        )
    }
}

impl Display for GatewayTransactionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
