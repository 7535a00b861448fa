//! Property read/write transactions with the joined meter.
//!
//! Requests go out as `SKSENDTO` to the ECHONET Lite port. Read responses come
//! back asynchronously as `ERXUDP` events, mixed with any other traffic the
//! meter or modem produces, so only Get_Res frames from the smart meter
//! object are accepted.

use echonet_lite::{
    encode_read_request, encode_write_request, EchonetFrame, Eoj, FrameError, ECHONET_UDP_PORT,
    EPC_INSTANTANEOUS_POWER, ESV_GET_RES,
};
use skstack_protocol::{Command, Response, SEC_ENCRYPTED, UDP_HANDLE_ECHONET};
use tracing::{debug, trace, warn};

use crate::commission::LinkAddress;
use crate::engine::{CommandEngine, Stage, Wait};
use crate::error::ReaderResult;
use crate::transport::LineTransport;

/// Property transactions against one joined coordinator.
pub struct Telemetry<'a, T> {
    engine: &'a mut CommandEngine<T>,
    link: &'a LinkAddress,
    write_budget: u32,
}

impl<'a, T: LineTransport> Telemetry<'a, T> {
    /// Create a transaction context for `link`.
    pub fn new(engine: &'a mut CommandEngine<T>, link: &'a LinkAddress, write_budget: u32) -> Self {
        Telemetry {
            engine,
            link,
            write_budget,
        }
    }

    fn send_frame(&mut self, frame: Vec<u8>) -> ReaderResult<()> {
        let command = Command::SendTo {
            handle: UDP_HANDLE_ECHONET,
            address: self.link.to_string(),
            port: ECHONET_UDP_PORT,
            security: SEC_ENCRYPTED,
            payload: frame,
        };
        self.engine.send(&command)
    }

    /// Request one property and wait for the meter's Get_Res.
    ///
    /// Frames from other objects, other service codes, and undecodable
    /// payloads are skipped.
    pub fn read(&mut self, epc: u8, budget: u32) -> ReaderResult<EchonetFrame> {
        debug!("reading property 0x{:02X}", epc);
        self.send_frame(encode_read_request(epc))?;

        self.engine.await_condition(Stage::Read, budget, |line| {
            let rx = match Response::parse(line) {
                Ok(Response::RxUdp(rx)) => rx,
                Ok(_) => return Ok(Wait::Continue),
                Err(e) => {
                    warn!("ignoring malformed line: {}", e);
                    return Ok(Wait::Continue);
                }
            };

            let frame = match EchonetFrame::decode_hex(&rx.data) {
                Ok(frame) => frame,
                Err(e) => {
                    warn!("ignoring undecodable frame from {}: {}", rx.sender, e);
                    return Ok(Wait::Continue);
                }
            };

            if frame.seoj == Eoj::SMART_METER && frame.esv == ESV_GET_RES {
                Ok(Wait::Done(frame))
            } else {
                trace!(
                    "ignoring frame seoj={} esv=0x{:02X} from {}",
                    frame.seoj,
                    frame.esv,
                    rx.sender
                );
                Ok(Wait::Continue)
            }
        })
    }

    /// Read one property's data.
    pub fn read_property(&mut self, epc: u8, budget: u32) -> ReaderResult<Vec<u8>> {
        let frame = self.read(epc, budget)?;
        let property = frame
            .properties
            .into_iter()
            .find(|p| p.epc == epc)
            .ok_or(FrameError::MissingProperty(epc))?;
        Ok(property.edt)
    }

    /// Read instantaneous power in watts.
    pub fn read_moment_power(&mut self, budget: u32) -> ReaderResult<i64> {
        let frame = self.read(EPC_INSTANTANEOUS_POWER, budget)?;
        let property = frame
            .property(EPC_INSTANTANEOUS_POWER)
            .ok_or(FrameError::MissingProperty(EPC_INSTANTANEOUS_POWER))?;
        Ok(property.to_i64()?)
    }

    /// Write one property and wait for the modem's `OK`.
    pub fn write(&mut self, epc: u8, data: &[u8]) -> ReaderResult<()> {
        debug!("writing {} bytes to property 0x{:02X}", data.len(), epc);
        self.send_frame(encode_write_request(epc, data)?)?;
        self.engine.await_ok(Stage::Write, self.write_budget)
    }
}
