use futures::StreamExt;
use reqwest::header::ACCEPT;
use tokio::spawn;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::channel::{next_delay, parse_message, ChannelError, ChannelEvent, ReconnectConfig, SseDecoder, MAX_LINE_BYTES};

/// The single live push connection of a dashboard.
pub struct PushChannel {
    cancel: CancellationToken,
    handle: JoinHandle<()>
}

impl PushChannel {
    /// Spawns the connection task and starts forwarding events into `sink`.
    ///
    /// `client` must not carry a total request timeout, the stream is expected to stay open
    /// indefinitely.
    pub fn connect(client: reqwest::Client, url: String, config: ReconnectConfig, sink: mpsc::Sender<ChannelEvent>) -> Self {
        let cancel = CancellationToken::new();
        let token = cancel.clone();

        let handle = spawn(async move {
            run(client, url, config, sink, token).await;
        });

        Self { cancel, handle }
    }

    /// Cancels any in-flight connection or backoff wait and waits for the task to finish.
    pub async fn close(self) {
        self.cancel.cancel();

        if let Err(error) = self.handle.await {
            warn!("Push channel task did not stop gracefully: {error}");
        }
    }
}

async fn run(client: reqwest::Client, url: String, config: ReconnectConfig, sink: mpsc::Sender<ChannelEvent>, cancel: CancellationToken) {
    let mut delay = config.initial_delay;
    let mut attempt = 0u32;

    loop {
        attempt += 1;
        let mut connected = false;

        debug!(attempt, "Connecting to event stream at {url}");

        let outcome = tokio::select! {
            _ = cancel.cancelled() => break,
            outcome = stream_events(&client, &url, &sink, &mut connected) => outcome
        };

        let error = match outcome {
            Ok(()) | Err(ChannelError::SinkClosed) => break,
            Err(error) => error
        };

        warn!(attempt, "{error}");

        if sink.send(ChannelEvent::Disconnected(error.to_string())).await.is_err() {
            break;
        }

        if connected {
            attempt = 0;
            delay = config.initial_delay;
        }

        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = sleep(delay) => {}
        }

        delay = next_delay(delay, &config);
    }

    info!("Push channel closed");
}

async fn stream_events(client: &reqwest::Client, url: &str, sink: &mpsc::Sender<ChannelEvent>, connected: &mut bool) -> Result<(), ChannelError> {
    let response = client.get(url)
        .header(ACCEPT, "text/event-stream")
        .send()
        .await
        .map_err(ChannelError::Connect)?;

    let status = response.status();

    if !status.is_success() {
        return Err(ChannelError::Status(status.as_u16()));
    }

    *connected = true;
    info!("Connected to event stream at {url}");
    forward(sink, ChannelEvent::Connected).await?;

    let mut decoder = SseDecoder::new();
    let mut stream = response.bytes_stream();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(ChannelError::Stream)?;

        for frame in decoder.feed(&chunk) {
            match parse_message(&frame.data) {
                Ok(message) => forward(sink, ChannelEvent::Message(message)).await?,
                Err(error) => warn!("Skipping undecodable push message: {error}")
            }
        }

        if decoder.pending_bytes() > MAX_LINE_BYTES {
            return Err(ChannelError::LineTooLong(MAX_LINE_BYTES));
        }
    }

    Err(ChannelError::EndOfStream)
}

async fn forward(sink: &mpsc::Sender<ChannelEvent>, event: ChannelEvent) -> Result<(), ChannelError> {
    sink.send(event).await.map_err(|_| ChannelError::SinkClosed)
}
