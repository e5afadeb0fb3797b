use chrono::Utc;
use tracing::debug;
use uuid::Uuid;

use crate::models::{file_name_of, Job, JobStatus};
use crate::types::{JobId, Timestamp};

/// A client-side stand-in for a submitted document the server has not reported yet.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct OptimisticJob {
    /// Locally generated, never collides with server ids.
    pub temp_id: JobId,
    pub file_name: String,
    /// Id from the upload receipt, when the worker returns one.
    pub server_id: Option<JobId>,
    pub created_at: Timestamp
}

impl OptimisticJob {
    /// Whether `job` is the server-side record of this placeholder.
    ///
    /// The receipt id is exact. The file name match is a heuristic: a registry job whose source
    /// file's final segment contains the placeholder's name is taken as the same upload, which
    /// misfires when the same file name is uploaded again.
    pub fn is_matched_by(&self, job: &Job) -> bool {
        if self.server_id.as_deref() == Some(job.id.as_str()) {
            return true;
        }

        !self.file_name.is_empty() && job.file_name().contains(self.file_name.as_str())
    }

    /// The placeholder rendered as a pending job.
    pub fn as_job(&self) -> Job {
        Job {
            id: self.temp_id.clone(),
            source_file: self.file_name.clone(),
            status: JobStatus::Pending,
            created_at: self.created_at,
            updated_at: self.created_at,
            error: None
        }
    }
}

/// Placeholders for in-flight submissions, newest first.
#[derive(Debug, Default)]
pub struct OptimisticOverlay {
    placeholders: Vec<OptimisticJob>
}

impl OptimisticOverlay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin(&mut self, file_name: &str) -> OptimisticJob {
        let placeholder = OptimisticJob {
            temp_id: format!("local-{}", Uuid::new_v4()),
            file_name: file_name_of(file_name).to_string(),
            server_id: None,
            created_at: Utc::now()
        };

        self.placeholders.insert(0, placeholder.clone());

        placeholder
    }

    /// Records the server id from the upload receipt. Returns false if the placeholder is gone.
    pub fn acknowledge(&mut self, temp_id: &str, server_id: JobId) -> bool {
        match self.placeholders.iter_mut().find(|placeholder| placeholder.temp_id == temp_id) {
            Some(placeholder) => {
                placeholder.server_id = Some(server_id);
                true
            }
            None => false
        }
    }

    /// Drops a placeholder whose submission failed.
    pub fn discard(&mut self, temp_id: &str) -> Option<OptimisticJob> {
        let position = self.placeholders.iter().position(|placeholder| placeholder.temp_id == temp_id)?;
        Some(self.placeholders.remove(position))
    }

    /// Removes every placeholder superseded by a registry job and returns how many went away.
    pub fn reconcile(&mut self, jobs: &[Job]) -> usize {
        let before = self.placeholders.len();

        self.placeholders.retain(|placeholder| {
            let superseded = jobs.iter().find(|job| placeholder.is_matched_by(job));

            if let Some(job) = superseded {
                debug!("Placeholder [{}] for [{}] superseded by job [{}]", placeholder.temp_id, placeholder.file_name, job.id);
            }

            superseded.is_none()
        });

        before - self.placeholders.len()
    }

    pub fn placeholders(&self) -> &[OptimisticJob] {
        &self.placeholders
    }

    pub fn is_empty(&self) -> bool {
        self.placeholders.is_empty()
    }
}
