use std::fmt::Display;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionType {
    Topup,
    Deduction,
    Fee,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Topup => "topup",
            TransactionType::Deduction => "deduction",
            TransactionType::Fee => "fee",
        }
    }

    pub fn from_str(value: &str) -> Option<Self> {
        match value {
            "topup" => Some(TransactionType::Topup),
            "deduction" => Some(TransactionType::Deduction),
            "fee" => Some(TransactionType::Fee),
            _ => None,
        }
    }
}

impl Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
