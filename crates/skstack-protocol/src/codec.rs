//! Line-based codec for SKSTACK communication.
//!
//! The modem terminates every line with `\r\n`. Leading whitespace is
//! significant: scan results are reported as lines indented by two spaces.

use bytes::BytesMut;

/// Maximum line length accepted before buffered data is discarded.
///
/// An `ERXUDP` event carrying a full-size ECHONET Lite frame stays well under
/// this.
pub const MAX_LINE_LENGTH: usize = 4096;

/// Line terminator used in both directions.
pub const LINE_TERMINATOR: &str = "\r\n";

/// A codec for reading and writing SKSTACK lines.
///
/// Accumulates received bytes until a complete line is found. Blank lines are
/// skipped.
#[derive(Debug, Default)]
pub struct LineCodec {
    /// Buffer for accumulating incoming data.
    buffer: BytesMut,
}

impl LineCodec {
    /// Create a new line codec.
    pub fn new() -> Self {
        LineCodec {
            buffer: BytesMut::with_capacity(MAX_LINE_LENGTH),
        }
    }

    /// Add received data to the buffer.
    ///
    /// If the buffer grows past [`MAX_LINE_LENGTH`] without a line ending, the
    /// partial line is dropped.
    pub fn push(&mut self, data: &[u8]) {
        self.buffer.extend_from_slice(data);

        if self.buffer.len() > MAX_LINE_LENGTH && !self.has_line_end() {
            log::warn!(
                "line buffer overflow: discarding {} bytes without a line ending",
                self.buffer.len()
            );
            self.buffer.clear();
        }
    }

    fn has_line_end(&self) -> bool {
        self.buffer.iter().any(|&b| b == b'\r' || b == b'\n')
    }

    /// Try to decode a complete line from the buffer.
    ///
    /// The returned line has its terminator stripped but keeps any leading
    /// whitespace. Returns `None` if no complete non-blank line is buffered.
    pub fn decode_line(&mut self) -> Option<String> {
        loop {
            let end = self
                .buffer
                .iter()
                .position(|&b| b == b'\r' || b == b'\n')?;

            let line_data = self.buffer.split_to(end);

            // Skip the terminator character(s)
            while !self.buffer.is_empty() && (self.buffer[0] == b'\r' || self.buffer[0] == b'\n') {
                let _ = self.buffer.split_to(1);
            }

            if line_data.iter().all(|b| b.is_ascii_whitespace()) {
                continue;
            }

            return Some(String::from_utf8_lossy(&line_data).to_string());
        }
    }

    /// Encode a text command for transmission.
    ///
    /// Appends the `\r\n` terminator.
    pub fn encode_command(cmd: &str) -> Vec<u8> {
        let mut buf = Vec::with_capacity(cmd.len() + LINE_TERMINATOR.len());
        buf.extend_from_slice(cmd.as_bytes());
        buf.extend_from_slice(LINE_TERMINATOR.as_bytes());
        buf
    }

    /// Get the number of buffered bytes.
    pub fn buffered_len(&self) -> usize {
        self.buffer.len()
    }
}
