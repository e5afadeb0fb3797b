use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::{timestamp, Timestamp, TransactionId};

/// Direction of a transaction. Anything the ledger reports other than `credit` is a debit.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum TransactionType {
    Credit,
    Debit
}

impl From<String> for TransactionType {
    fn from(value: String) -> Self {
        if value.trim().eq_ignore_ascii_case("credit") {
            TransactionType::Credit
        } else {
            TransactionType::Debit
        }
    }
}

/// A single ledger line extracted from an uploaded statement.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: TransactionId,
    /// Booking date exactly as printed on the statement.
    pub date: String,
    pub description: String,
    /// Signed amount. The sign is reported by the ledger and kept verbatim.
    pub amount: Decimal,
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    #[serde(deserialize_with = "timestamp::deserialize")]
    pub created_at: Timestamp
}

impl Transaction {
    /// Whether the amount's sign matches the direction tag (credits non-negative, debits non-positive).
    pub fn sign_agrees(&self) -> bool {
        match self.transaction_type {
            TransactionType::Credit => !self.amount.is_sign_negative() || self.amount.is_zero(),
            TransactionType::Debit => self.amount.is_sign_negative() || self.amount.is_zero()
        }
    }
}
