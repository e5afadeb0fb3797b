mod errors;
pub mod timestamp;

pub use errors::{SyncError, TimestampError};

pub type JobId = String;
pub type TransactionId = i64;
pub type Timestamp = chrono::DateTime<chrono::Utc>;
