use thiserror::Error;

#[derive(Debug, Error)]
pub enum ChannelError {
    #[error("Could not connect to event stream: {0}")]
    Connect(#[source] reqwest::Error),
    #[error("Event stream responded with status {0}")]
    Status(u16),
    #[error("Event stream failed: {0}")]
    Stream(#[source] reqwest::Error),
    #[error("Event stream line exceeded {0} bytes")]
    LineTooLong(usize),
    #[error("Event stream was closed by the server")]
    EndOfStream,
    #[error("Subscriber is gone")]
    SinkClosed
}
