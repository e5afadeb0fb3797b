use super::TransactionStore;
use crate::models::{AggregateStats, ServerStats, Transaction, TransactionType};
use crate::types::timestamp;

use std::str::FromStr;

use anyhow::{anyhow, Result};
use rust_decimal::Decimal;

fn create_transaction(id: i64, amount: &str, transaction_type: TransactionType) -> Result<Transaction> {
    Ok(Transaction {
        id,
        date: "2024-03-01".to_string(),
        description: format!("Transaction {id}"),
        amount: Decimal::from_str(amount)?,
        transaction_type,
        created_at: timestamp::parse("2024-03-01T09:00:00Z")?
    })
}

fn sample_transactions() -> Result<Vec<Transaction>> {
    Ok(vec![
        create_transaction(7, "3000.00", TransactionType::Credit)?,
        create_transaction(42, "-120.40", TransactionType::Debit)?,
        create_transaction(43, "-9.99", TransactionType::Debit)?,
        create_transaction(44, "15.00", TransactionType::Credit)?,
    ])
}

fn independent_totals(transactions: &[Transaction]) -> (Decimal, Decimal) {
    let income = transactions.iter()
        .filter(|transaction| transaction.transaction_type == TransactionType::Credit)
        .map(|transaction| transaction.amount)
        .sum();
    let expenses = transactions.iter()
        .filter(|transaction| transaction.transaction_type == TransactionType::Debit)
        .map(|transaction| transaction.amount)
        .sum();

    (income, expenses)
}

#[test]
fn test_new_store_is_empty_with_zero_aggregates() {
    let store = TransactionStore::new();

    assert!(store.transactions().is_empty());
    assert_eq!(store.stats(), AggregateStats::default());
}

#[test]
fn test_replace_all_keeps_aggregates_consistent_with_collection() -> Result<()> {
    let mut store = TransactionStore::new();

    store.replace_all(sample_transactions()?);

    let stats = store.stats();
    let (income, expenses) = independent_totals(store.transactions());

    assert_eq!(stats.total_count, 4);
    assert_eq!(stats.total_income, income);
    assert_eq!(stats.total_expenses, expenses);
    assert_eq!(stats.total_balance, stats.total_income + stats.total_expenses);
    assert_eq!(stats.total_balance, Decimal::from_str("2884.61")?);

    Ok(())
}

#[test]
fn test_replace_all_discards_previous_collection() -> Result<()> {
    let mut store = TransactionStore::new();
    store.replace_all(sample_transactions()?);

    store.replace_all(vec![create_transaction(100, "-5.00", TransactionType::Debit)?]);

    assert_eq!(store.stats().total_count, 1);
    assert!(!store.contains(42));
    assert_eq!(store.stats().total_balance, Decimal::from_str("-5")?);

    Ok(())
}

#[test]
fn test_remove_updates_aggregates() -> Result<()> {
    let mut store = TransactionStore::new();
    store.replace_all(sample_transactions()?);

    let removed = store.remove(42).ok_or_else(|| anyhow!("Transaction 42 was not removed"))?;

    assert_eq!(removed.id, 42);
    assert!(!store.contains(42));
    assert_eq!(store.stats().total_count, 3);
    assert_eq!(store.stats().total_expenses, Decimal::from_str("-9.99")?);
    assert_eq!(store.stats().total_balance, Decimal::from_str("3005.01")?);

    Ok(())
}

#[test]
fn test_remove_of_unknown_id_changes_nothing() -> Result<()> {
    let mut store = TransactionStore::new();
    store.replace_all(sample_transactions()?);
    let before = store.stats();

    assert!(store.remove(999).is_none());
    assert_eq!(store.stats(), before);

    Ok(())
}

#[test]
fn test_server_stats_check_reports_disagreement() -> Result<()> {
    let mut store = TransactionStore::new();
    store.replace_all(sample_transactions()?);

    let matching = ServerStats {
        total_transactions: 4,
        total_credits: Decimal::from_str("3015.00")?,
        total_debits: Decimal::from_str("-130.39")?
    };
    let stale = ServerStats { total_transactions: 3, ..matching };

    assert!(store.check_server_stats(&matching));
    assert!(!store.check_server_stats(&stale));

    Ok(())
}
