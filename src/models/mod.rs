mod job;
mod stats;
#[cfg(test)]
mod tests;
mod transaction;

pub use job::{file_name_of, Job, JobStatus, JobUpdate};
pub use stats::{AggregateStats, ServerStats};
pub use transaction::{Transaction, TransactionType};
