//! Scripted transport for testing.
//!
//! [`ScriptedTransport`] replays a transcript of modem lines and expired
//! waits, and records everything written to it. Once the script runs out,
//! every read is an expired wait.
//!
//! ```rust,ignore
//! let mut transport = ScriptedTransport::new();
//! transport.push_lines(["EVER 1.2.10", "OK"]);
//! transport.push_silence(2);
//!
//! {
//!     let mut engine = CommandEngine::new(&mut transport);
//!     engine.send_await_ok(Stage::VersionCheck, &Command::Version, 1)?;
//! }
//! assert_eq!(transport.written_lines(), vec!["SKVER"]);
//! ```

use std::collections::VecDeque;
use std::io;

use crate::transport::LineTransport;

/// Transport that plays back a fixed script.
#[derive(Debug, Default)]
pub struct ScriptedTransport {
    /// Pending reads; `None` is an expired wait.
    script: VecDeque<Option<String>>,
    /// Record of every write.
    written: Vec<Vec<u8>>,
    /// Number of expired waits handed out.
    empty_reads: usize,
}

impl ScriptedTransport {
    /// Create an empty script.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue one line. An empty line is queued as an expired wait.
    pub fn push_line(&mut self, line: impl Into<String>) -> &mut Self {
        let line = line.into();
        if line.trim().is_empty() {
            self.script.push_back(None);
        } else {
            self.script.push_back(Some(line));
        }
        self
    }

    /// Queue several lines.
    pub fn push_lines<I, S>(&mut self, lines: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for line in lines {
            self.push_line(line);
        }
        self
    }

    /// Queue `count` expired waits.
    pub fn push_silence(&mut self, count: usize) -> &mut Self {
        for _ in 0..count {
            self.script.push_back(None);
        }
        self
    }

    /// Raw bytes of every write, in order.
    pub fn written(&self) -> &[Vec<u8>] {
        &self.written
    }

    /// Every write as text, without its line terminator.
    ///
    /// Binary payloads are decoded lossily.
    pub fn written_lines(&self) -> Vec<String> {
        self.written
            .iter()
            .map(|w| {
                String::from_utf8_lossy(w)
                    .trim_end_matches(['\r', '\n'])
                    .to_string()
            })
            .collect()
    }

    /// Number of expired waits returned so far.
    pub fn empty_reads(&self) -> usize {
        self.empty_reads
    }

    /// Number of scripted entries not yet consumed.
    pub fn pending(&self) -> usize {
        self.script.len()
    }
}

impl LineTransport for ScriptedTransport {
    fn write_all(&mut self, data: &[u8]) -> io::Result<()> {
        self.written.push(data.to_vec());
        Ok(())
    }

    fn read_line(&mut self) -> io::Result<Option<String>> {
        match self.script.pop_front().flatten() {
            Some(line) => Ok(Some(line)),
            None => {
                self.empty_reads += 1;
                Ok(None)
            }
        }
    }
}
