//! Push channel adapter.
//!
//! Holds one long-lived `text/event-stream` connection to the worker, decodes each frame into a
//! [`PushMessage`] and forwards it, in arrival order, to a subscriber supplied sink. Connection
//! problems are forwarded as advisory [`ChannelEvent::Disconnected`] events and the adapter keeps
//! reconnecting with exponential backoff until it is closed.

mod errors;
mod push_channel;
mod reconnect;
mod sse;

use serde::Deserialize;

use crate::models::{Job, JobUpdate};

pub use errors::ChannelError;
pub use push_channel::PushChannel;
pub use reconnect::{next_delay, ReconnectConfig};
pub use sse::{SseDecoder, SseFrame, MAX_LINE_BYTES};

/// All message types the worker pushes, tagged by their `"type"` field.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PushMessage {
    /// Full job list, sent once after every (re)connect.
    InitialJobs {
        jobs: Vec<Job>
    },
    /// Delta for a single job.
    JobUpdate(JobUpdate)
}

/// What the adapter hands to its subscriber.
#[derive(Debug, Clone)]
pub enum ChannelEvent {
    Connected,
    Message(PushMessage),
    Disconnected(String)
}

/// Parse the data of one event-stream frame.
pub fn parse_message(data: &str) -> Result<PushMessage, serde_json::Error> {
    serde_json::from_str(data)
}
