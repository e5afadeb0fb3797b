use std::fmt;
use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::types::{timestamp, JobId, Timestamp};

/// Processing state of a job as reported by the worker.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Pending,
    Processing,
    Completed,
    Failed
}

impl JobStatus {
    /// `completed` and `failed` are not expected to transition any further.
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }
}

impl Display for JobStatus {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        let label = match self {
            JobStatus::Pending => "pending",
            JobStatus::Processing => "processing",
            JobStatus::Completed => "completed",
            JobStatus::Failed => "failed"
        };

        formatter.write_str(label)
    }
}

/// A server-tracked unit of asynchronous document processing.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub id: JobId,
    /// Path of the uploaded document on the worker.
    pub source_file: String,
    pub status: JobStatus,
    #[serde(deserialize_with = "timestamp::deserialize")]
    pub created_at: Timestamp,
    #[serde(deserialize_with = "timestamp::deserialize")]
    pub updated_at: Timestamp,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>
}

impl Job {
    /// The final path segment of `source_file`.
    pub fn file_name(&self) -> &str {
        file_name_of(&self.source_file)
    }
}

/// A single-job delta delivered over the push channel.
#[derive(Debug, Clone, Eq, PartialEq, Deserialize)]
pub struct JobUpdate {
    pub job_id: JobId,
    pub status: JobStatus,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub source_file: Option<String>
}

/// Reduces a path using either separator to its final segment.
pub fn file_name_of(path: &str) -> &str {
    path.rsplit(|c: char| c == '/' || c == '\\').next().unwrap_or(path)
}
