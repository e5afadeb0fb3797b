//! HTTP collaborators of the dashboard.
//!
//! The sync actor only talks to the worker and the ledger through [`DashboardApi`], so it can be
//! driven by an in-memory fake in tests. [`HttpApi`] is the production implementation.

mod errors;
mod http_api;

use std::path::Path;

use async_trait::async_trait;
use serde::Deserialize;

use crate::models::{Job, ServerStats, Transaction};
use crate::types::{JobId, TransactionId};

pub use errors::ApiError;
pub use http_api::HttpApi;

#[async_trait]
pub trait DashboardApi: Send + Sync + 'static {
    async fn list_jobs(&self) -> Result<Vec<Job>, ApiError>;
    async fn submit_document(&self, document: Document) -> Result<SubmissionReceipt, ApiError>;
    /// Deletes the newest job together with the transactions extracted from it.
    async fn delete_most_recent_job(&self) -> Result<(), ApiError>;
    async fn list_transactions(&self) -> Result<Vec<Transaction>, ApiError>;
    async fn delete_transaction(&self, transaction_id: TransactionId) -> Result<(), ApiError>;
    async fn fetch_stats(&self) -> Result<ServerStats, ApiError>;
}

/// An uploaded statement, opaque to the dashboard apart from its name.
#[derive(Debug, Clone)]
pub struct Document {
    pub file_name: String,
    pub bytes: Vec<u8>
}

impl Document {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self { file_name: file_name.into(), bytes }
    }

    pub async fn read(path: &Path) -> Result<Self, ApiError> {
        let bytes = tokio::fs::read(path).await
            .map_err(|source| ApiError::Io { path: path.display().to_string(), source })?;

        let file_name = path.file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string());

        Ok(Self { file_name, bytes })
    }

    pub fn mime_type(&self) -> &'static str {
        if self.file_name.to_lowercase().ends_with(".pdf") {
            "application/pdf"
        } else {
            "application/octet-stream"
        }
    }
}

/// What the worker answers to an upload. Older workers return no id at all.
#[derive(Debug, Clone, Default, Eq, PartialEq, Deserialize)]
pub struct SubmissionReceipt {
    #[serde(default, alias = "job_id")]
    pub id: Option<JobId>
}
