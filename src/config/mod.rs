
use std::time::Duration;

use clap::Args;

use crate::channel::ReconnectConfig;

/// Connection settings of the dashboard.
///
/// Every option can also be supplied through its `STATEMENT_SYNC_*` environment variable, which
/// includes values loaded from a `.env` file.
#[derive(Debug, Clone, Args)]
pub struct SyncConfig {
    /// Base URL of the document worker (jobs, uploads, event stream)
    #[arg(long, env = "STATEMENT_SYNC_JOBS_URL", default_value = "http://localhost:8080")]
    pub jobs_url: String,

    /// Base URL of the ledger (transactions, stats)
    #[arg(long, env = "STATEMENT_SYNC_LEDGER_URL", default_value = "http://localhost:8050")]
    pub ledger_url: String,

    /// Timeout for every REST request, and for connecting the event stream, at least 1
    #[arg(long, env = "STATEMENT_SYNC_REQUEST_TIMEOUT_SECS", default_value_t = 30, value_parser = clap::value_parser!(u64).range(1..))]
    pub request_timeout_secs: u64,

    /// Interval of the safety-net job list refetch, 0 disables it
    #[arg(long, env = "STATEMENT_SYNC_RESYNC_INTERVAL_SECS", default_value_t = 60)]
    pub resync_interval_secs: u64,

    /// First delay before reconnecting the event stream, at least 1
    #[arg(long, env = "STATEMENT_SYNC_RECONNECT_INITIAL_MS", default_value_t = 1000, value_parser = clap::value_parser!(u64).range(1..))]
    pub reconnect_initial_ms: u64,

    /// Upper bound of the reconnect delay
    #[arg(long, env = "STATEMENT_SYNC_RECONNECT_MAX_SECS", default_value_t = 30)]
    pub reconnect_max_secs: u64
}

impl SyncConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn resync_interval(&self) -> Option<Duration> {
        (self.resync_interval_secs > 0).then(|| Duration::from_secs(self.resync_interval_secs))
    }

    pub fn reconnect(&self) -> ReconnectConfig {
        let initial_delay = Duration::from_millis(self.reconnect_initial_ms);

        ReconnectConfig {
            initial_delay,
            max_delay: Duration::from_secs(self.reconnect_max_secs).max(initial_delay),
            ..ReconnectConfig::default()
        }
    }
}
