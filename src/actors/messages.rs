use tokio::sync::oneshot;

use crate::api::{ApiError, Document, SubmissionReceipt};
use crate::models::{Job, ServerStats, Transaction};
use crate::types::{SyncError, TransactionId};

pub type Reply<T> = oneshot::Sender<Result<T, SyncError>>;

/// User actions sent to the actor by a dashboard handle.
#[derive(Debug)]
pub enum Command {
    SubmitDocument {
        document: Document,
        reply: Reply<SubmissionReceipt>
    },
    DeleteTransaction {
        transaction_id: TransactionId,
        reply: Reply<()>
    },
    DeleteMostRecentJob {
        reply: Reply<()>
    },
    Refresh {
        reply: Reply<()>
    }
}

/// Results of network calls the actor spawned, fed back so they are applied serially.
#[derive(Debug)]
pub(super) enum Completion {
    Jobs {
        generation: u64,
        result: Result<Vec<Job>, ApiError>
    },
    Transactions {
        generation: u64,
        result: Result<Vec<Transaction>, ApiError>,
        server_stats: Option<ServerStats>
    },
    Submission {
        temp_id: String,
        file_name: String,
        result: Result<SubmissionReceipt, ApiError>,
        reply: Reply<SubmissionReceipt>
    },
    TransactionDeleted {
        transaction_id: TransactionId,
        result: Result<(), ApiError>,
        reply: Reply<()>
    },
    /// `result` is `None` when a newer request cancelled this one before it finished.
    MostRecentJobDeleted {
        generation: u64,
        result: Option<Result<(), ApiError>>,
        reply: Reply<()>
    }
}
