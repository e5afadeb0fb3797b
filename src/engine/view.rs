use crate::models::{AggregateStats, Job, Transaction};
use crate::types::SyncError;

/// Advisory state of the push connection. Data stays readable in every state.
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub enum ConnectionState {
    #[default]
    Connecting,
    Connected,
    Disconnected(SyncError)
}

/// A job as listed on the dashboard.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct JobEntry {
    pub job: Job,
    /// Placeholder for a submission the server has not reported yet.
    pub optimistic: bool
}

/// Everything presentation reads, published as one immutable snapshot after every change.
///
/// `transactions` and `stats` always come from the same store state.
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct DashboardView {
    /// Optimistic placeholders first, newest first, followed by the registry's jobs.
    pub jobs: Vec<JobEntry>,
    pub last_completed_job: Option<Job>,
    pub transactions: Vec<Transaction>,
    pub stats: AggregateStats,
    /// Sticky until the next successful operation.
    pub error: Option<SyncError>,
    pub connection: ConnectionState
}

impl DashboardView {
    /// Jobs known to the server, without placeholders.
    pub fn server_jobs(&self) -> impl Iterator<Item = &Job> {
        self.jobs.iter().filter(|entry| !entry.optimistic).map(|entry| &entry.job)
    }

    pub fn has_placeholders(&self) -> bool {
        self.jobs.iter().any(|entry| entry.optimistic)
    }
}
