use super::{file_name_of, AggregateStats, Job, JobStatus, JobUpdate, ServerStats, Transaction, TransactionType};

use std::str::FromStr;

use anyhow::Result;
use rust_decimal::Decimal;

fn create_transaction(id: i64, amount: &str, transaction_type: TransactionType) -> Result<Transaction> {
    Ok(Transaction {
        id,
        date: "2024-03-01".to_string(),
        description: format!("Transaction {id}"),
        amount: Decimal::from_str(amount)?,
        transaction_type,
        created_at: crate::types::timestamp::parse("2024-03-02T08:00:00Z")?
    })
}

#[test]
fn test_job_deserializes_from_worker_payload() -> Result<()> {
    let json = r#"{
        "id": "a1",
        "source_file": "/uploads/statement.pdf",
        "status": "processing",
        "created_at": "2024-03-01T10:00:00",
        "updated_at": "2024-03-01T10:00:05.123456"
    }"#;

    let job: Job = serde_json::from_str(json)?;

    assert_eq!(job.id, "a1");
    assert_eq!(job.status, JobStatus::Processing);
    assert_eq!(job.file_name(), "statement.pdf");
    assert!(job.error.is_none());

    Ok(())
}

#[test]
fn test_job_update_optional_fields_default_to_none() -> Result<()> {
    let update: JobUpdate = serde_json::from_str(r#"{"job_id":"7","status":"failed","error":"bad pdf"}"#)?;

    assert_eq!(update.status, JobStatus::Failed);
    assert_eq!(update.error.as_deref(), Some("bad pdf"));
    assert!(update.source_file.is_none());

    Ok(())
}

#[test]
fn test_unknown_job_status_is_rejected() {
    let result = serde_json::from_str::<JobUpdate>(r#"{"job_id":"7","status":"exploded"}"#);

    assert!(result.is_err());
}

#[test]
fn test_only_completed_and_failed_are_terminal() {
    assert!(JobStatus::Completed.is_terminal());
    assert!(JobStatus::Failed.is_terminal());
    assert!(!JobStatus::Pending.is_terminal());
    assert!(!JobStatus::Processing.is_terminal());
}

#[test]
fn test_file_name_handles_both_separators() {
    assert_eq!(file_name_of("/uploads/2024/statement.pdf"), "statement.pdf");
    assert_eq!(file_name_of("C:\\uploads\\march.pdf"), "march.pdf");
    assert_eq!(file_name_of("plain.pdf"), "plain.pdf");
    assert_eq!(file_name_of("/uploads/"), "");
}

#[test]
fn test_transaction_deserializes_numeric_and_string_amounts() -> Result<()> {
    let json = r#"[
        {"id": 1, "date": "01/03", "description": "Salary", "amount": 2500.75, "type": "credit", "created_at": "2024-03-01T00:00:00"},
        {"id": 2, "date": "02/03", "description": "Rent", "amount": "-1200.00", "type": "debit", "created_at": "2024-03-01T00:00:00Z"}
    ]"#;

    let transactions: Vec<Transaction> = serde_json::from_str(json)?;

    assert_eq!(transactions[0].amount, Decimal::from_str("2500.75")?);
    assert_eq!(transactions[0].transaction_type, TransactionType::Credit);
    assert_eq!(transactions[1].amount, Decimal::from_str("-1200")?);
    assert_eq!(transactions[1].transaction_type, TransactionType::Debit);

    Ok(())
}

#[test]
fn test_non_credit_types_are_treated_as_debits() {
    assert_eq!(TransactionType::from("CREDIT".to_string()), TransactionType::Credit);
    assert_eq!(TransactionType::from("withdrawal".to_string()), TransactionType::Debit);
    assert_eq!(TransactionType::from(String::new()), TransactionType::Debit);
}

#[test]
fn test_sign_agreement_between_amount_and_type() -> Result<()> {
    assert!(create_transaction(1, "10.00", TransactionType::Credit)?.sign_agrees());
    assert!(create_transaction(2, "-10.00", TransactionType::Debit)?.sign_agrees());
    assert!(create_transaction(3, "0", TransactionType::Debit)?.sign_agrees());
    assert!(!create_transaction(4, "10.00", TransactionType::Debit)?.sign_agrees());
    assert!(!create_transaction(5, "-10.00", TransactionType::Credit)?.sign_agrees());

    Ok(())
}

#[test]
fn test_aggregate_stats_sum_by_direction() -> Result<()> {
    let transactions = vec![
        create_transaction(1, "2500.75", TransactionType::Credit)?,
        create_transaction(2, "-1200.00", TransactionType::Debit)?,
        create_transaction(3, "-45.50", TransactionType::Debit)?,
        create_transaction(4, "100.25", TransactionType::Credit)?,
    ];

    let stats = AggregateStats::from_transactions(&transactions);

    assert_eq!(stats.total_count, 4);
    assert_eq!(stats.total_income, Decimal::from_str("2601.00")?);
    assert_eq!(stats.total_expenses, Decimal::from_str("-1245.50")?);
    assert_eq!(stats.total_balance, Decimal::from_str("1355.50")?);
    assert_eq!(stats.total_balance, stats.total_income + stats.total_expenses);

    Ok(())
}

#[test]
fn test_aggregate_stats_of_empty_collection_are_zero() {
    assert_eq!(AggregateStats::from_transactions(&[]), AggregateStats::default());
}

#[test]
fn test_server_stats_agreement_check() -> Result<()> {
    let transactions = vec![
        create_transaction(1, "50.00", TransactionType::Credit)?,
        create_transaction(2, "-20.00", TransactionType::Debit)?,
    ];
    let stats = AggregateStats::from_transactions(&transactions);

    let matching: ServerStats = serde_json::from_str(r#"{"total_transactions":2,"total_credits":50.0,"total_debits":-20.0}"#)?;
    let stale: ServerStats = serde_json::from_str(r#"{"total_transactions":1,"total_credits":50.0,"total_debits":0}"#)?;

    assert!(matching.agrees_with(&stats));
    assert!(!stale.agrees_with(&stats));

    Ok(())
}
