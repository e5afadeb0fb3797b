use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::error;

use crate::models::{Transaction, TransactionType};

/// Totals derived from the full transaction collection.
///
/// Always rebuilt from scratch so it can never drift from the collection it describes.
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, Serialize)]
pub struct AggregateStats {
    pub total_count: usize,
    /// Sum of credit amounts.
    pub total_income: Decimal,
    /// Sum of debit amounts, sign preserved.
    pub total_expenses: Decimal,
    /// `total_income + total_expenses`.
    pub total_balance: Decimal
}

impl AggregateStats {
    pub fn from_transactions(transactions: &[Transaction]) -> Self {
        let mut total_income = Decimal::ZERO;
        let mut total_expenses = Decimal::ZERO;

        for transaction in transactions {
            let bucket = match transaction.transaction_type {
                TransactionType::Credit => &mut total_income,
                TransactionType::Debit => &mut total_expenses
            };

            match bucket.checked_add(transaction.amount) {
                Some(sum) => *bucket = sum,
                None => error!("Aggregate overflow while adding transaction [{}]", transaction.id)
            }
        }

        let total_balance = total_income.checked_add(total_expenses).unwrap_or_else(|| {
            error!("Aggregate overflow while computing balance");
            Decimal::ZERO
        });

        Self {
            total_count: transactions.len(),
            total_income,
            total_expenses,
            total_balance
        }
    }
}

/// Totals as reported by the ledger's `/stats` endpoint.
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, Deserialize)]
pub struct ServerStats {
    #[serde(default)]
    pub total_transactions: u64,
    #[serde(default)]
    pub total_credits: Decimal,
    #[serde(default)]
    pub total_debits: Decimal
}

impl ServerStats {
    pub fn agrees_with(&self, stats: &AggregateStats) -> bool {
        self.total_transactions == stats.total_count as u64
            && self.total_credits == stats.total_income
            && self.total_debits == stats.total_expenses
    }
}
