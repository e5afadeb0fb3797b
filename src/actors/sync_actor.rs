use std::future::pending;
use std::sync::Arc;
use std::time::Duration;

use tokio::spawn;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, Interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::actors::messages::{Completion, Reply};
use crate::actors::{Command, Generation};
use crate::api::{DashboardApi, Document, SubmissionReceipt};
use crate::channel::{ChannelEvent, PushMessage};
use crate::engine::{ConnectionState, DashboardHandle, DashboardView, JobEntry};
use crate::registry::{DeltaOutcome, JobRegistry, OptimisticOverlay};
use crate::storage::TransactionStore;
use crate::types::{SyncError, TransactionId};

const COMMAND_BACKPRESSURE: usize = 64;

/// The single owner of all dashboard state.
///
/// Push events, user commands and finished network calls are drained from their channels one at
/// a time and applied in full before the next is looked at. Network calls run in spawned tasks and
/// report back through the completion channel, so a slow request never delays push handling.
/// After every step the refresh trigger is consumed and a new [`DashboardView`] is published.
pub struct SyncActor {
    api: Arc<dyn DashboardApi>,
    registry: JobRegistry,
    overlay: OptimisticOverlay,
    store: TransactionStore,
    error: Option<SyncError>,
    connection: ConnectionState,
    jobs_generation: Generation,
    transactions_generation: Generation,
    delete_job_generation: Generation,
    /// Cancels the in-flight "delete most recent job" request when a newer one arrives.
    delete_job_cancel: Option<CancellationToken>,
    refresh_waiters: Vec<(u64, Reply<()>)>,
    /// Replies held back until the view reflecting them has been published.
    deferred_replies: Vec<Box<dyn FnOnce() + Send>>,
    completions: mpsc::UnboundedSender<Completion>,
    view: watch::Sender<DashboardView>
}

impl SyncActor {
    /// Spawns the actor and returns the handle presentation code talks to.
    ///
    /// The actor runs until `shutdown` is cancelled or every handle is dropped. A `resync_interval`
    /// refetches the job list periodically as a safety net for missed push messages.
    pub fn spawn(
        api: Arc<dyn DashboardApi>,
        mut channel_events: mpsc::Receiver<ChannelEvent>,
        resync_interval: Option<Duration>,
        shutdown: CancellationToken
    ) -> (DashboardHandle, JoinHandle<()>) {
        let (command_sender, mut commands) = mpsc::channel(COMMAND_BACKPRESSURE);
        let (completion_sender, mut completions) = mpsc::unbounded_channel();
        let (view_sender, view_receiver) = watch::channel(DashboardView::default());

        let mut actor = SyncActor {
            api,
            registry: JobRegistry::new(),
            overlay: OptimisticOverlay::new(),
            store: TransactionStore::new(),
            error: None,
            connection: ConnectionState::Connecting,
            jobs_generation: Generation::default(),
            transactions_generation: Generation::default(),
            delete_job_generation: Generation::default(),
            delete_job_cancel: None,
            refresh_waiters: Vec::new(),
            deferred_replies: Vec::new(),
            completions: completion_sender,
            view: view_sender
        };

        let handle = spawn(async move {
            let mut resync = resync_interval.filter(|period| !period.is_zero()).map(|period| {
                let mut resync = interval_at(Instant::now() + period, period);
                resync.set_missed_tick_behavior(MissedTickBehavior::Skip);
                resync
            });
            let mut channel_open = true;

            actor.spawn_fetch_jobs();
            actor.spawn_fetch_transactions();
            actor.publish();

            loop {
                tokio::select! {
                    _ = shutdown.cancelled() => break,
                    command = commands.recv() => match command {
                        Some(command) => actor.handle_command(command),
                        None => break
                    },
                    event = channel_events.recv(), if channel_open => match event {
                        Some(event) => actor.handle_channel_event(event),
                        None => {
                            debug!("Push channel sink closed");
                            channel_open = false;
                        }
                    },
                    Some(completion) = completions.recv() => actor.handle_completion(completion),
                    _ = next_tick(&mut resync) => {
                        debug!("Periodic job resync");
                        actor.spawn_fetch_jobs();
                    }
                }

                actor.finish_step();
            }

            if let Some(cancel) = actor.delete_job_cancel.take() {
                cancel.cancel();
            }

            info!("Sync actor stopped");
        });

        (DashboardHandle::new(command_sender, view_receiver), handle)
    }

    fn handle_command(&mut self, command: Command) {
        match command {
            Command::SubmitDocument { document, reply } => self.submit_document(document, reply),
            Command::DeleteTransaction { transaction_id, reply } => self.delete_transaction(transaction_id, reply),
            Command::DeleteMostRecentJob { reply } => self.delete_most_recent_job(reply),
            Command::Refresh { reply } => {
                self.spawn_fetch_jobs();
                let generation = self.spawn_fetch_transactions();
                self.refresh_waiters.push((generation, reply));
            }
        }
    }

    fn handle_channel_event(&mut self, event: ChannelEvent) {
        match event {
            ChannelEvent::Connected => {
                self.connection = ConnectionState::Connected;
            }
            ChannelEvent::Disconnected(reason) => {
                //NOTE: Advisory only, the last synchronized data stays visible
                self.connection = ConnectionState::Disconnected(SyncError::connection(reason));
            }
            ChannelEvent::Message(PushMessage::InitialJobs { jobs }) => {
                debug!("Initial job snapshot with {} jobs received", jobs.len());

                // Anything fetched before this snapshot is older than it
                self.jobs_generation.next();
                self.registry.apply_snapshot(jobs);
            }
            ChannelEvent::Message(PushMessage::JobUpdate(update)) => {
                match self.registry.apply_delta(&update) {
                    DeltaOutcome::Completed => info!("Job [{}] completed", update.job_id),
                    DeltaOutcome::Updated => debug!("Job [{}] is now {}", update.job_id, update.status),
                    DeltaOutcome::Unchanged => debug!("Job [{}] update changed nothing", update.job_id),
                    DeltaOutcome::Unknown => {
                        debug!("Update for unknown job [{}], refetching jobs", update.job_id);
                        self.spawn_fetch_jobs();
                    }
                }
            }
        }
    }

    fn handle_completion(&mut self, completion: Completion) {
        match completion {
            Completion::Jobs { generation, result } => {
                if !self.jobs_generation.is_current(generation) {
                    debug!("Dropping stale job list from generation {generation}, latest is {}", self.jobs_generation.current());
                    return;
                }

                match result {
                    Ok(jobs) => {
                        self.registry.apply_snapshot(jobs);
                        self.error = None;
                    }
                    Err(error) => self.fail(SyncError::fetch("jobs", error))
                }
            }
            Completion::Transactions { generation, result, server_stats } => {
                if !self.transactions_generation.is_current(generation) {
                    debug!("Dropping stale transaction list from generation {generation}, latest is {}", self.transactions_generation.current());
                    return;
                }

                let outcome = match result {
                    Ok(transactions) => {
                        self.store.replace_all(transactions);
                        self.error = None;

                        if let Some(server_stats) = server_stats {
                            self.store.check_server_stats(&server_stats);
                        }

                        Ok(())
                    }
                    Err(error) => {
                        let error = SyncError::fetch("transactions", error);
                        self.fail(error.clone());
                        Err(error)
                    }
                };

                self.answer_refresh_waiters(generation, outcome);
            }
            Completion::Submission { temp_id, file_name, result, reply } => {
                let outcome = match result {
                    Ok(receipt) => {
                        info!("Document [{file_name}] accepted by the worker");

                        if let Some(server_id) = &receipt.id {
                            self.overlay.acknowledge(&temp_id, server_id.clone());
                        }

                        self.error = None;
                        self.spawn_fetch_jobs();

                        Ok(receipt)
                    }
                    Err(error) => {
                        self.overlay.discard(&temp_id);

                        let error = SyncError::submission(&file_name, error);
                        self.fail(error.clone());
                        Err(error)
                    }
                };

                self.respond(reply, outcome);
            }
            Completion::TransactionDeleted { transaction_id, result, reply } => {
                let outcome = match result {
                    Ok(()) => {
                        if self.store.remove(transaction_id).is_none() {
                            debug!("Deleted transaction [{transaction_id}] was not in the local collection");
                        }

                        self.error = None;
                        Ok(())
                    }
                    Err(error) => {
                        let error = SyncError::deletion(format!("transaction [{transaction_id}]"), error);
                        self.fail(error.clone());
                        Err(error)
                    }
                };

                self.respond(reply, outcome);
            }
            Completion::MostRecentJobDeleted { generation, result, reply } => {
                let outcome = match result {
                    _ if !self.delete_job_generation.is_current(generation) => {
                        debug!("Delete request {generation} superseded by {}", self.delete_job_generation.current());
                        Err(SyncError::Superseded)
                    }
                    None => Err(SyncError::Superseded),
                    Some(Ok(())) => {
                        self.delete_job_cancel = None;

                        if let Some(job_id) = self.registry.most_recent().map(|job| job.id.clone()) {
                            self.registry.remove(&job_id);
                            info!("Most recent job [{job_id}] deleted");
                        }

                        self.error = None;
                        self.spawn_fetch_jobs();
                        self.spawn_fetch_transactions();

                        Ok(())
                    }
                    Some(Err(error)) => {
                        self.delete_job_cancel = None;

                        let error = SyncError::deletion("most recent job", error);
                        self.fail(error.clone());
                        Err(error)
                    }
                };

                self.respond(reply, outcome);
            }
        }
    }

    fn submit_document(&mut self, document: Document, reply: Reply<SubmissionReceipt>) {
        let placeholder = self.overlay.begin(&document.file_name);
        let file_name = placeholder.file_name.clone();
        let api = self.api.clone();
        let completions = self.completions.clone();

        debug!("Submitting [{file_name}] as placeholder [{}]", placeholder.temp_id);

        spawn(async move {
            let result = api.submit_document(document).await;
            let _ = completions.send(Completion::Submission { temp_id: placeholder.temp_id, file_name, result, reply });
        });
    }

    fn delete_transaction(&mut self, transaction_id: TransactionId, reply: Reply<()>) {
        let api = self.api.clone();
        let completions = self.completions.clone();

        spawn(async move {
            let result = api.delete_transaction(transaction_id).await;
            let _ = completions.send(Completion::TransactionDeleted { transaction_id, result, reply });
        });
    }

    fn delete_most_recent_job(&mut self, reply: Reply<()>) {
        let generation = self.delete_job_generation.next();
        let cancel = CancellationToken::new();

        if let Some(previous) = self.delete_job_cancel.replace(cancel.clone()) {
            debug!("Cancelling superseded delete request");
            previous.cancel();
        }

        let api = self.api.clone();
        let completions = self.completions.clone();

        spawn(async move {
            let result = tokio::select! {
                _ = cancel.cancelled() => None,
                result = api.delete_most_recent_job() => Some(result)
            };

            let _ = completions.send(Completion::MostRecentJobDeleted { generation, result, reply });
        });
    }

    fn spawn_fetch_jobs(&mut self) -> u64 {
        let generation = self.jobs_generation.next();
        let api = self.api.clone();
        let completions = self.completions.clone();

        spawn(async move {
            let result = api.list_jobs().await;
            let _ = completions.send(Completion::Jobs { generation, result });
        });

        generation
    }

    fn spawn_fetch_transactions(&mut self) -> u64 {
        let generation = self.transactions_generation.next();
        let api = self.api.clone();
        let completions = self.completions.clone();

        spawn(async move {
            let (result, stats) = tokio::join!(api.list_transactions(), api.fetch_stats());

            let server_stats = match stats {
                Ok(server_stats) => Some(server_stats),
                Err(error) => {
                    warn!("Ledger stats unavailable: {error}");
                    None
                }
            };
            let _ = completions.send(Completion::Transactions { generation, result, server_stats });
        });

        generation
    }

    fn answer_refresh_waiters(&mut self, generation: u64, outcome: Result<(), SyncError>) {
        let (answered, waiting) = std::mem::take(&mut self.refresh_waiters)
            .into_iter()
            .partition(|(requested, _)| *requested <= generation);

        self.refresh_waiters = waiting;

        for (_, reply) in answered {
            self.respond(reply, outcome.clone());
        }
    }

    fn respond<T: Send + 'static>(&mut self, reply: Reply<T>, outcome: Result<T, SyncError>) {
        self.deferred_replies.push(Box::new(move || {
            //NOTE: The caller may have stopped waiting, that is not an error
            let _ = reply.send(outcome);
        }));
    }

    fn fail(&mut self, error: SyncError) {
        error!("{error}");

        if error.is_sticky() {
            self.error = Some(error);
        }
    }

    /// Reconciles placeholders, consumes the refresh trigger, publishes the resulting view and
    /// only then answers the callers whose requests this step resolved.
    fn finish_step(&mut self) {
        if !self.overlay.is_empty() {
            self.overlay.reconcile(self.registry.get_all());
        }

        if self.registry.take_refresh() {
            debug!("Refresh trigger consumed, refetching transactions");
            self.spawn_fetch_transactions();
        }

        self.publish();

        for reply in self.deferred_replies.drain(..) {
            reply();
        }
    }

    fn publish(&self) {
        let jobs = self.overlay.placeholders().iter()
            .map(|placeholder| JobEntry { job: placeholder.as_job(), optimistic: true })
            .chain(self.registry.get_all().iter().map(|job| JobEntry { job: job.clone(), optimistic: false }))
            .collect();

        let next = DashboardView {
            jobs,
            last_completed_job: self.registry.get_last_completed().cloned(),
            transactions: self.store.transactions().to_vec(),
            stats: self.store.stats(),
            error: self.error.clone(),
            connection: self.connection.clone()
        };

        self.view.send_if_modified(|current| {
            if *current == next {
                return false;
            }

            *current = next;
            true
        });
    }
}

async fn next_tick(interval: &mut Option<Interval>) {
    match interval {
        Some(interval) => {
            interval.tick().await;
        }
        None => pending().await
    }
}
