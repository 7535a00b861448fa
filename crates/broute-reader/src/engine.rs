//! Command/response engine.
//!
//! Every exchange with the modem is a command followed by a wait: lines are
//! read one at a time and handed to a per-call handler until the handler
//! reports completion. Asynchronous events arrive on the same channel, so
//! handlers must expect and skip lines that have nothing to do with them.
//!
//! Waits are bounded by a budget of *empty reads* (transport waits that
//! expired without a line), not by wall-clock time. Lines that arrive do not
//! touch the budget.

use std::fmt;

use skstack_protocol::{Command, Response};
use tracing::{debug, trace, warn};

use crate::error::{ReaderError, ReaderResult};
use crate::transport::LineTransport;

/// A step in commissioning or telemetry, used to label waits and timeouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// `SKVER`.
    VersionCheck,
    /// `SKINFO`.
    InfoQuery,
    /// `SKSETRBID`.
    SetId,
    /// `SKSETPWD`.
    SetPassword,
    /// `SKSCAN` until a complete PAN descriptor is seen.
    Scan,
    /// `SKSREG S2`.
    RegisterChannel,
    /// `SKSREG S3`.
    RegisterPanId,
    /// `SKJOIN` until PANA completes.
    Join,
    /// Property read transaction.
    Read,
    /// Property write transaction.
    Write,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::VersionCheck => "version check",
            Stage::InfoQuery => "info query",
            Stage::SetId => "set route-B id",
            Stage::SetPassword => "set route-B password",
            Stage::Scan => "PAN scan",
            Stage::RegisterChannel => "register channel",
            Stage::RegisterPanId => "register PAN id",
            Stage::Join => "PANA join",
            Stage::Read => "property read",
            Stage::Write => "property write",
        };
        f.write_str(name)
    }
}

/// What a wait handler wants to happen after seeing a line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Wait<R> {
    /// Keep waiting.
    Continue,
    /// Write these bytes, then keep waiting.
    Send(Vec<u8>),
    /// Stop waiting with this result.
    Done(R),
}

/// Receives every line the engine reads from the modem.
pub trait LineObserver {
    /// Called once per non-empty line, before the wait handler sees it.
    fn on_line(&mut self, stage: Stage, line: &str);
}

impl<F: FnMut(Stage, &str)> LineObserver for F {
    fn on_line(&mut self, stage: Stage, line: &str) {
        self(stage, line)
    }
}

/// Sends commands and waits on their outcome over a [`LineTransport`].
pub struct CommandEngine<T> {
    transport: T,
    observer: Option<Box<dyn LineObserver>>,
}

impl<T> fmt::Debug for CommandEngine<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandEngine")
            .field("observer", &self.observer.is_some())
            .finish_non_exhaustive()
    }
}

impl<T: LineTransport> CommandEngine<T> {
    /// Create an engine that exclusively owns `transport`.
    pub fn new(transport: T) -> Self {
        CommandEngine {
            transport,
            observer: None,
        }
    }

    /// Install a sink for every line read from the modem.
    pub fn set_observer(&mut self, observer: impl LineObserver + 'static) {
        self.observer = Some(Box::new(observer));
    }

    /// Get a reference to the transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Release the transport.
    pub fn into_transport(self) -> T {
        self.transport
    }

    /// Write raw bytes to the modem.
    pub fn send_raw(&mut self, data: &[u8]) -> ReaderResult<()> {
        self.transport.write_all(data)?;
        Ok(())
    }

    /// Write a command to the modem.
    pub fn send(&mut self, command: &Command) -> ReaderResult<()> {
        trace!("send: {}", command.to_log_string());
        self.send_raw(&command.encode())
    }

    /// Read lines until `on_line` reports completion.
    ///
    /// Fails with [`ReaderError::Timeout`] once `budget` reads have expired
    /// without completion. A budget of 0 behaves like 1.
    pub fn await_condition<R, F>(&mut self, stage: Stage, budget: u32, mut on_line: F) -> ReaderResult<R>
    where
        F: FnMut(&str) -> ReaderResult<Wait<R>>,
    {
        let mut empty_reads: u32 = 0;
        loop {
            match self.transport.read_line()? {
                Some(line) => {
                    debug!("{}: {}", stage, line);
                    if let Some(observer) = self.observer.as_mut() {
                        observer.on_line(stage, &line);
                    }

                    match on_line(&line)? {
                        Wait::Continue => {}
                        Wait::Send(data) => self.send_raw(&data)?,
                        Wait::Done(result) => return Ok(result),
                    }
                }
                None => {
                    empty_reads += 1;
                    trace!("{}: no line ({}/{})", stage, empty_reads, budget);
                    if empty_reads >= budget {
                        warn!("{}: timed out after {} empty reads", stage, empty_reads);
                        return Err(ReaderError::Timeout { stage });
                    }
                }
            }
        }
    }

    /// Wait for a plain `OK`, ignoring every other line.
    pub fn await_ok(&mut self, stage: Stage, budget: u32) -> ReaderResult<()> {
        self.await_condition(stage, budget, |line| {
            Ok(if is_ack(line) {
                Wait::Done(())
            } else {
                Wait::Continue
            })
        })
    }

    /// Send a command and wait for its `OK`.
    pub fn send_await_ok(&mut self, stage: Stage, command: &Command, budget: u32) -> ReaderResult<()> {
        self.send(command)?;
        self.await_ok(stage, budget)
    }
}

/// Check if a line is the literal acknowledgment token.
pub fn is_ack(line: &str) -> bool {
    matches!(Response::parse(line), Ok(Response::Ok))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedTransport;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_send_await_ok() {
        let mut transport = ScriptedTransport::new();
        transport.push_lines(["SKVER", "EVER 1.2.10", "OK"]);

        let mut engine = CommandEngine::new(&mut transport);
        engine
            .send_await_ok(Stage::VersionCheck, &Command::Version, 1)
            .unwrap();
        drop(engine);

        assert_eq!(transport.written_lines(), vec!["SKVER"]);
        assert_eq!(transport.empty_reads(), 0);
    }

    #[test]
    fn test_timeout_counts_only_empty_reads() {
        let mut transport = ScriptedTransport::new();
        transport
            .push_line("EVER 1.2.10")
            .push_silence(1)
            .push_lines(["EVENT 21 FE80::1 00", "OKAY"])
            .push_silence(1)
            .push_line("FAIL ER04")
            .push_silence(1)
            .push_line("OK");

        let mut engine = CommandEngine::new(&mut transport);
        let err = engine
            .send_await_ok(Stage::VersionCheck, &Command::Version, 3)
            .unwrap_err();
        drop(engine);

        assert!(matches!(err, ReaderError::Timeout { stage: Stage::VersionCheck }));
        assert_eq!(transport.empty_reads(), 3);
        // The OK after the third expiry was never read
        assert_eq!(transport.pending(), 1);
    }

    #[test]
    fn test_timeout_on_first_empty_read_with_budget_one() {
        let mut transport = ScriptedTransport::new();
        transport.push_silence(1).push_line("OK");

        let mut engine = CommandEngine::new(&mut transport);
        let err = engine.send_await_ok(Stage::Write, &Command::Info, 1).unwrap_err();
        drop(engine);

        assert!(err.is_timeout());
        assert_eq!(transport.empty_reads(), 1);
    }

    #[test]
    fn test_await_condition_send_and_done() {
        let mut transport = ScriptedTransport::new();
        transport.push_lines(["again", "done"]);

        let mut engine = CommandEngine::new(&mut transport);
        let result = engine
            .await_condition(Stage::Scan, 1, |line| {
                Ok(match line {
                    "again" => Wait::Send(b"RETRY\r\n".to_vec()),
                    "done" => Wait::Done(42),
                    _ => Wait::Continue,
                })
            })
            .unwrap();
        drop(engine);

        assert_eq!(result, 42);
        assert_eq!(transport.written_lines(), vec!["RETRY"]);
    }

    #[test]
    fn test_await_condition_handler_error_stops_wait() {
        let mut transport = ScriptedTransport::new();
        transport.push_lines(["bad", "OK"]);

        let mut engine = CommandEngine::new(&mut transport);
        let err = engine
            .await_condition::<(), _>(Stage::Join, 5, |_| Err(ReaderError::NotJoined))
            .unwrap_err();

        assert!(matches!(err, ReaderError::NotJoined));
    }

    #[test]
    fn test_observer_sees_every_line() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);

        let mut transport = ScriptedTransport::new();
        transport.push_lines(["SKINFO", "EINFO FE80::1 001D129012345678 21 8888 FFFE", "OK"]);

        let mut engine = CommandEngine::new(&mut transport);
        engine.set_observer(move |stage: Stage, line: &str| {
            sink.borrow_mut().push(format!("{:?} {}", stage, line));
        });
        engine.send_await_ok(Stage::InfoQuery, &Command::Info, 1).unwrap();

        assert_eq!(
            *seen.borrow(),
            vec![
                "InfoQuery SKINFO".to_string(),
                "InfoQuery EINFO FE80::1 001D129012345678 21 8888 FFFE".to_string(),
                "InfoQuery OK".to_string(),
            ]
        );
    }

    #[test]
    fn test_is_ack() {
        assert!(is_ack("OK"));
        assert!(is_ack("OK\r\n"));
        assert!(!is_ack(" OK"));
        assert!(!is_ack("OK 1"));
    }
}
