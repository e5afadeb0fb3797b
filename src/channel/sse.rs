/// Longest incomplete line a decoder is expected to hold before the stream is given up.
pub const MAX_LINE_BYTES: usize = 1024 * 1024;

/// One dispatched `text/event-stream` event.
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct SseFrame {
    pub event: Option<String>,
    pub id: Option<String>,
    /// All `data:` lines of the event joined by `\n`.
    pub data: String
}

/// Incremental decoder for the event-stream wire format.
///
/// Network chunks can split lines (and UTF-8 sequences) anywhere, so bytes are buffered until a
/// full line is available. Both `\n` and `\r\n` line endings are accepted.
#[derive(Debug, Default)]
pub struct SseDecoder {
    buffer: Vec<u8>,
    pending: SseFrame,
    has_data: bool
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Consumes a chunk and returns every event completed by it.
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<SseFrame> {
        self.buffer.extend_from_slice(chunk);

        let mut frames = Vec::new();
        let mut start = 0;

        while let Some(offset) = self.buffer[start..].iter().position(|byte| *byte == b'\n') {
            let end = start + offset;
            let line = String::from_utf8_lossy(&self.buffer[start..end])
                .trim_end_matches('\r')
                .to_string();
            start = end + 1;

            if let Some(frame) = self.process_line(&line) {
                frames.push(frame);
            }
        }

        self.buffer.drain(..start);

        frames
    }

    /// Bytes buffered for a line that has not ended yet.
    pub fn pending_bytes(&self) -> usize {
        self.buffer.len()
    }

    fn process_line(&mut self, line: &str) -> Option<SseFrame> {
        if line.is_empty() {
            return self.dispatch();
        }

        if line.starts_with(':') {
            return None;
        }

        let (field, value) = match line.split_once(':') {
            Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
            None => (line, "")
        };

        match field {
            "data" => {
                if self.has_data {
                    self.pending.data.push('\n');
                }
                self.pending.data.push_str(value);
                self.has_data = true;
            }
            "event" => self.pending.event = Some(value.to_string()),
            "id" => self.pending.id = Some(value.to_string()),
            _ => {}
        }

        None
    }

    fn dispatch(&mut self) -> Option<SseFrame> {
        let frame = std::mem::take(&mut self.pending);
        let has_data = std::mem::replace(&mut self.has_data, false);

        //NOTE: Events without data (heartbeats, bare `event:` lines) are dropped per the event-stream format
        has_data.then_some(frame)
    }
}
