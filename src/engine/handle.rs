use tokio::sync::{mpsc, oneshot, watch};

use crate::actors::Command;
use crate::api::{Document, SubmissionReceipt};
use crate::engine::DashboardView;
use crate::types::{SyncError, TransactionId};

/// The read/action surface handed to presentation code.
///
/// Cheap to clone. Every action resolves once the actor has applied the server's answer, so a
/// caller that awaits it observes the resulting view immediately afterwards.
#[derive(Clone)]
pub struct DashboardHandle {
    commands: mpsc::Sender<Command>,
    view: watch::Receiver<DashboardView>
}

impl DashboardHandle {
    pub(crate) fn new(commands: mpsc::Sender<Command>, view: watch::Receiver<DashboardView>) -> Self {
        Self { commands, view }
    }

    /// The latest published view.
    pub fn view(&self) -> DashboardView {
        self.view.borrow().clone()
    }

    /// A receiver notified on every view change.
    pub fn subscribe(&self) -> watch::Receiver<DashboardView> {
        self.view.clone()
    }

    /// Waits until the published view satisfies `predicate`.
    pub async fn wait_for(&self, predicate: impl FnMut(&DashboardView) -> bool) -> Result<DashboardView, SyncError> {
        let mut receiver = self.view.clone();
        let view = receiver.wait_for(predicate).await
            .map_err(|_| SyncError::EngineStopped)?;

        Ok(view.clone())
    }

    /// Uploads a document. A placeholder job is listed until the server reports the real one.
    pub async fn submit_document(&self, document: Document) -> Result<SubmissionReceipt, SyncError> {
        self.request(|reply| Command::SubmitDocument { document, reply }).await
    }

    /// Deletes a transaction on the ledger, then locally.
    pub async fn delete_transaction(&self, transaction_id: TransactionId) -> Result<(), SyncError> {
        self.request(|reply| Command::DeleteTransaction { transaction_id, reply }).await
    }

    /// Deletes the newest job and its transactions, then resynchronizes.
    ///
    /// A second call while the first is still running supersedes it: the first resolves to
    /// [`SyncError::Superseded`].
    pub async fn delete_most_recent_job(&self) -> Result<(), SyncError> {
        self.request(|reply| Command::DeleteMostRecentJob { reply }).await
    }

    /// Refetches jobs and transactions; resolves with the outcome of the transaction fetch.
    pub async fn refresh(&self) -> Result<(), SyncError> {
        self.request(|reply| Command::Refresh { reply }).await
    }

    async fn request<T>(&self, build: impl FnOnce(oneshot::Sender<Result<T, SyncError>>) -> Command) -> Result<T, SyncError> {
        let (reply, response) = oneshot::channel();

        self.commands.send(build(reply)).await
            .map_err(|_| SyncError::EngineStopped)?;

        response.await.map_err(|_| SyncError::EngineStopped)?
    }
}
