use std::fmt::Display;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TimestampError {
    #[error("Timestamp error: Value is an empty string")]
    Empty,
    #[error("Timestamp error: Invalid value '{0}'")]
    InvalidFormat(String)
}

/// Failures surfaced to the dashboard.
///
/// `Connection` is advisory and only ever reported through the connection state, while
/// `Fetch`, `Submission` and `Deletion` become the sticky error shown until the next
/// successful operation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyncError {
    #[error("Push channel unavailable: {reason}")]
    Connection {
        reason: String
    },
    #[error("Failed to fetch {resource}: {reason}")]
    Fetch {
        resource: &'static str,
        reason: String
    },
    #[error("Failed to submit [{file_name}]: {reason}")]
    Submission {
        file_name: String,
        reason: String
    },
    #[error("Failed to delete {target}: {reason}")]
    Deletion {
        target: String,
        reason: String
    },
    #[error("Request was superseded by a newer one")]
    Superseded,
    #[error("Sync engine is not running")]
    EngineStopped
}

impl SyncError {
    pub fn connection(reason: impl Display) -> Self {
        Self::Connection { reason: reason.to_string() }
    }

    pub fn fetch(resource: &'static str, reason: impl Display) -> Self {
        Self::Fetch { resource, reason: reason.to_string() }
    }

    pub fn submission(file_name: &str, reason: impl Display) -> Self {
        Self::Submission { file_name: file_name.to_string(), reason: reason.to_string() }
    }

    pub fn deletion(target: impl Into<String>, reason: impl Display) -> Self {
        Self::Deletion { target: target.into(), reason: reason.to_string() }
    }

    /// Whether the error should remain visible until the next successful operation.
    pub fn is_sticky(&self) -> bool {
        matches!(self, Self::Fetch { .. } | Self::Submission { .. } | Self::Deletion { .. })
    }
}
