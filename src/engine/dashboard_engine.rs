use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::actors::SyncActor;
use crate::api::{ApiError, HttpApi};
use crate::channel::PushChannel;
use crate::config::SyncConfig;
use crate::engine::DashboardHandle;

const CHANNEL_BACKPRESSURE: usize = 256;

/// Owns the lifecycle of a dashboard: one push connection and one sync actor.
///
/// Created once at startup with [`start`](Self::start) and torn down with
/// [`shutdown`](Self::shutdown); everything in between goes through the [`DashboardHandle`].
pub struct DashboardEngine {
    handle: DashboardHandle,
    channel: PushChannel,
    shutdown: CancellationToken,
    actor: JoinHandle<()>
}

impl DashboardEngine {
    /// Opens the push channel and starts the actor. Must be called inside a Tokio runtime.
    pub fn start(config: &SyncConfig) -> Result<Self, ApiError> {
        let api_client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()?;

        //NOTE: No total timeout here, the event stream is meant to stay open
        let stream_client = reqwest::Client::builder()
            .connect_timeout(config.request_timeout())
            .build()?;

        let api = HttpApi::new(api_client, &config.jobs_url, &config.ledger_url);
        let events_url = api.events_url();

        let (sender, receiver) = mpsc::channel(CHANNEL_BACKPRESSURE);
        let channel = PushChannel::connect(stream_client, events_url, config.reconnect(), sender);

        let shutdown = CancellationToken::new();
        let (handle, actor) = SyncActor::spawn(Arc::new(api), receiver, config.resync_interval(), shutdown.clone());

        info!("Dashboard engine started against jobs [{}] and ledger [{}]", config.jobs_url, config.ledger_url);

        Ok(Self { handle, channel, shutdown, actor })
    }

    pub fn handle(&self) -> DashboardHandle {
        self.handle.clone()
    }

    /// Closes the push channel, stops the actor and waits for both.
    pub async fn shutdown(self) {
        self.channel.close().await;
        self.shutdown.cancel();

        if let Err(error) = self.actor.await {
            warn!("Sync actor did not stop gracefully: {error}");
        }

        info!("Dashboard engine stopped");
    }
}
