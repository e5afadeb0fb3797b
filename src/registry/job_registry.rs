use std::collections::{HashMap, HashSet};

use tracing::{debug, info};

use crate::models::{Job, JobStatus, JobUpdate};
use crate::registry::RefreshTrigger;
use crate::types::JobId;

/// What applying a single delta did to the registry.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum DeltaOutcome {
    /// The job entered `completed`; the refresh trigger was raised.
    Completed,
    Updated,
    /// The delta repeated what the registry already held.
    Unchanged,
    /// No job with this id is known, the caller should refetch the full list.
    Unknown
}

/// Authoritative in-memory view of the worker's jobs.
///
/// Jobs keep the order of the last snapshot. Ids are unique: the position index is rebuilt on
/// every snapshot and removal, and deltas only ever update existing entries.
#[derive(Debug, Default)]
pub struct JobRegistry {
    jobs: Vec<Job>,
    index: HashMap<JobId, usize>,
    last_completed: Option<JobId>,
    /// Unknown jobs reported as completed, resolved by the next snapshot.
    awaiting_snapshot: HashSet<JobId>,
    trigger: RefreshTrigger
}

impl JobRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the entire known set.
    ///
    /// Duplicate ids collapse onto the position of their first occurrence with the value of their
    /// last. Applying the same snapshot twice yields the same state.
    ///
    /// A known job that arrives as `completed` after holding another status counts as a
    /// completion, so a `completed` delta missed during a disconnect is still noticed.
    pub fn apply_snapshot(&mut self, jobs: Vec<Job>) {
        let previous: HashMap<JobId, JobStatus> = self.jobs.drain(..)
            .map(|job| (job.id, job.status))
            .collect();
        self.index.clear();

        for job in jobs {
            match self.index.get(&job.id) {
                Some(&position) => self.jobs[position] = job,
                None => {
                    self.index.insert(job.id.clone(), self.jobs.len());
                    self.jobs.push(job);
                }
            }
        }

        let resolved = self.awaiting_snapshot.drain()
            .filter_map(|job_id| self.index.get(&job_id).map(|&position| &self.jobs[position]))
            .filter(|job| job.status == JobStatus::Completed)
            .max_by_key(|job| job.updated_at)
            .map(|job| job.id.clone());

        if let Some(job_id) = resolved {
            info!("Job [{job_id}] completed before it was known, now recorded as last completed");
            self.last_completed = Some(job_id);
        }

        let completed_since = self.jobs.iter()
            .filter(|job| job.status == JobStatus::Completed)
            .filter(|job| previous.get(&job.id).is_some_and(|status| *status != JobStatus::Completed))
            .max_by_key(|job| job.updated_at)
            .map(|job| job.id.clone());

        if let Some(job_id) = completed_since {
            info!("Job [{job_id}] completed between snapshots");
            self.last_completed = Some(job_id);
            self.trigger.raise();
        }

        if self.last_completed.as_ref().is_some_and(|job_id| !self.index.contains_key(job_id)) {
            self.last_completed = None;
        }

        debug!("Job snapshot applied with {} jobs", self.jobs.len());
    }

    /// Applies a single-job delta.
    ///
    /// Status and error are overwritten verbatim (last write wins, even for a terminal status that
    /// regresses). Only a transition into `completed` from another status records the job as last
    /// completed and raises the refresh trigger, so repeated completions are no-ops.
    pub fn apply_delta(&mut self, update: &JobUpdate) -> DeltaOutcome {
        let Some(&position) = self.index.get(&update.job_id) else {
            if update.status == JobStatus::Completed && self.awaiting_snapshot.insert(update.job_id.clone()) {
                self.trigger.raise();
            }

            return DeltaOutcome::Unknown;
        };

        let job = &mut self.jobs[position];
        let previous_status = job.status;
        let source_changed = update.source_file.as_ref().is_some_and(|source_file| *source_file != job.source_file);
        let changed = previous_status != update.status || job.error != update.error || source_changed;

        job.status = update.status;
        job.error = update.error.clone();

        if let Some(source_file) = &update.source_file {
            job.source_file = source_file.clone();
        }

        if update.status == JobStatus::Completed && previous_status != JobStatus::Completed {
            self.last_completed = Some(update.job_id.clone());
            self.trigger.raise();

            return DeltaOutcome::Completed;
        }

        if changed { DeltaOutcome::Updated } else { DeltaOutcome::Unchanged }
    }

    /// Removes a job, used once the server has deleted it.
    pub fn remove(&mut self, job_id: &str) -> Option<Job> {
        let position = self.index.remove(job_id)?;
        let job = self.jobs.remove(position);

        for (index, job) in self.jobs.iter().enumerate().skip(position) {
            self.index.insert(job.id.clone(), index);
        }

        if self.last_completed.as_deref() == Some(job_id) {
            self.last_completed = None;
        }

        Some(job)
    }

    pub fn get_all(&self) -> &[Job] {
        &self.jobs
    }

    pub fn get(&self, job_id: &str) -> Option<&Job> {
        self.index.get(job_id).map(|&position| &self.jobs[position])
    }

    pub fn get_last_completed(&self) -> Option<&Job> {
        self.last_completed.as_deref().and_then(|job_id| self.get(job_id))
    }

    /// The job created last, the one a "delete most recent job" request removes.
    pub fn most_recent(&self) -> Option<&Job> {
        self.jobs.iter().max_by_key(|job| job.created_at)
    }

    pub fn refresh_requested(&self) -> bool {
        self.trigger.is_raised()
    }

    /// Consumes the refresh trigger.
    pub fn take_refresh(&mut self) -> bool {
        self.trigger.take()
    }
}
