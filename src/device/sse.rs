//! Incremental decoder for `text/event-stream` bodies.

/// Longest line kept while waiting for its newline
pub const MAX_LINE_BYTES: usize = 64 * 1024;

/// Accumulates stream chunks and yields the `data` payload of each complete
/// event. Comment lines and fields other than `data` are ignored.
///
/// Bytes are buffered until a full line arrives, so multi-byte characters
/// split across chunks decode intact. A line longer than [`MAX_LINE_BYTES`]
/// is dropped along with its event.
#[derive(Debug, Default)]
pub struct SseDecoder {
    buffer: Vec<u8>,
    data: Vec<String>,
    /// Set while skipping the rest of an oversized line
    overflowed: bool,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one chunk, returning the events it completed
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<String> {
        self.buffer.extend_from_slice(chunk);

        let mut events = Vec::new();
        while let Some(pos) = self.buffer.iter().position(|b| *b == b'\n') {
            let raw: Vec<u8> = self.buffer.drain(..=pos).collect();
            if self.overflowed {
                self.overflowed = false;
                continue;
            }

            let line = String::from_utf8_lossy(&raw);
            let line = line.trim_end_matches(['\n', '\r']);

            if line.is_empty() {
                if !self.data.is_empty() {
                    events.push(self.data.join("\n"));
                    self.data.clear();
                }
                continue;
            }

            if line.starts_with(':') {
                continue;
            }

            if let Some(value) = line.strip_prefix("data:") {
                self.data
                    .push(value.strip_prefix(' ').unwrap_or(value).to_string());
            }
        }

        if self.buffer.len() > MAX_LINE_BYTES {
            tracing::warn!(bytes = self.buffer.len(), "Dropping oversized event line");
            self.buffer.clear();
            self.data.clear();
            self.overflowed = true;
        }

        events
    }
}
