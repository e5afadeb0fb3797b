use tracing::{debug, warn};

use crate::models::{AggregateStats, ServerStats, Transaction};
use crate::types::TransactionId;

/// The transaction collection together with the aggregates derived from it.
///
/// Every mutation rebuilds the aggregates before returning, so a reader never observes a
/// collection and totals that disagree.
#[derive(Debug, Default)]
pub struct TransactionStore {
    transactions: Vec<Transaction>,
    stats: AggregateStats
}

impl TransactionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the collection with a freshly fetched one.
    pub fn replace_all(&mut self, transactions: Vec<Transaction>) {
        let disagreeing = transactions.iter().filter(|transaction| !transaction.sign_agrees()).count();

        if disagreeing > 0 {
            warn!("{disagreeing} transactions carry an amount whose sign disagrees with their type");
        }

        self.transactions = transactions;
        self.recompute();
    }

    /// Removes a transaction the server has confirmed as deleted.
    pub fn remove(&mut self, transaction_id: TransactionId) -> Option<Transaction> {
        let position = self.transactions.iter().position(|transaction| transaction.id == transaction_id)?;
        let removed = self.transactions.remove(position);

        self.recompute();

        Some(removed)
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn stats(&self) -> AggregateStats {
        self.stats
    }

    pub fn contains(&self, transaction_id: TransactionId) -> bool {
        self.transactions.iter().any(|transaction| transaction.id == transaction_id)
    }

    /// Compares the ledger's own totals with the local ones. The local totals stay authoritative.
    pub fn check_server_stats(&self, server_stats: &ServerStats) -> bool {
        let agrees = server_stats.agrees_with(&self.stats);

        if !agrees {
            warn!(
                "Ledger stats disagree with local totals: ledger {}/{}/{} vs local {}/{}/{}",
                server_stats.total_transactions, server_stats.total_credits, server_stats.total_debits,
                self.stats.total_count, self.stats.total_income, self.stats.total_expenses
            );
        }

        agrees
    }

    fn recompute(&mut self) {
        self.stats = AggregateStats::from_transactions(&self.transactions);
        debug!("Aggregates recomputed over {} transactions", self.stats.total_count);
    }
}
