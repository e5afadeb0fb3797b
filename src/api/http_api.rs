use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Response;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::api::{ApiError, DashboardApi, Document, SubmissionReceipt};
use crate::models::{Job, ServerStats, Transaction};
use crate::types::TransactionId;

/// Field name the worker expects the uploaded statement under.
const DOCUMENT_FIELD: &str = "pdfFile";

/// [`DashboardApi`] over HTTP.
///
/// Jobs live on the worker (`jobs_url`), transactions and stats on the ledger (`ledger_url`).
pub struct HttpApi {
    client: reqwest::Client,
    jobs_url: String,
    ledger_url: String
}

impl HttpApi {
    pub fn new(client: reqwest::Client, jobs_url: impl Into<String>, ledger_url: impl Into<String>) -> Self {
        Self {
            client,
            jobs_url: trim_base(jobs_url.into()),
            ledger_url: trim_base(ledger_url.into())
        }
    }

    /// Event stream endpoint of the worker.
    pub fn events_url(&self) -> String {
        format!("{}/events", self.jobs_url)
    }

    async fn ensure_success(response: Response) -> Result<Response, ApiError> {
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await
                .unwrap_or_else(|_| "<unreadable body>".to_string());

            return Err(ApiError::Status { status: status.as_u16(), body });
        }

        Ok(response)
    }

    async fn parse_response<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
        let response = Self::ensure_success(response).await?;
        Ok(response.json::<T>().await?)
    }

    async fn check_status(response: Response) -> Result<(), ApiError> {
        Self::ensure_success(response).await?;
        Ok(())
    }
}

#[async_trait]
impl DashboardApi for HttpApi {
    async fn list_jobs(&self) -> Result<Vec<Job>, ApiError> {
        let response = self.client.get(format!("{}/jobs", self.jobs_url)).send().await?;
        Self::parse_response(response).await
    }

    async fn submit_document(&self, document: Document) -> Result<SubmissionReceipt, ApiError> {
        let mime_type = document.mime_type();
        let part = Part::bytes(document.bytes)
            .file_name(document.file_name)
            .mime_str(mime_type)?;
        let form = Form::new().part(DOCUMENT_FIELD, part);

        let response = self.client.post(format!("{}/jobs", self.jobs_url))
            .multipart(form)
            .send()
            .await?;

        let body = Self::ensure_success(response).await?.text().await?;

        //NOTE: The receipt is informational, an unparseable body still means the upload was accepted
        Ok(serde_json::from_str(&body).unwrap_or_else(|error| {
            debug!("Upload receipt was not a JSON object: {error}");
            SubmissionReceipt::default()
        }))
    }

    async fn delete_most_recent_job(&self) -> Result<(), ApiError> {
        let response = self.client.delete(format!("{}/jobs/latest", self.jobs_url)).send().await?;
        Self::check_status(response).await
    }

    async fn list_transactions(&self) -> Result<Vec<Transaction>, ApiError> {
        let response = self.client.get(format!("{}/transactions", self.ledger_url)).send().await?;
        Self::parse_response(response).await
    }

    async fn delete_transaction(&self, transaction_id: TransactionId) -> Result<(), ApiError> {
        let response = self.client.delete(format!("{}/transactions/{transaction_id}", self.ledger_url)).send().await?;
        Self::check_status(response).await
    }

    async fn fetch_stats(&self) -> Result<ServerStats, ApiError> {
        let response = self.client.get(format!("{}/stats", self.ledger_url)).send().await?;
        Self::parse_response(response).await
    }
}

fn trim_base(url: String) -> String {
    url.trim_end_matches('/').to_string()
}
