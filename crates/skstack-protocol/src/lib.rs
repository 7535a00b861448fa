//! SKSTACK Line Protocol
//!
//! This crate provides types and utilities for talking to Wi-SUN modems running
//! the SKSTACK command interpreter (BP35A1 and compatibles) over a serial link.
//! Unlike the ECHONET Lite payloads it carries, the modem itself speaks a
//! line-based text protocol.
//!
//! # Protocol Overview
//!
//! - **Commands** (host → modem): `SK*` text commands terminated with `\r\n`.
//!   `SKSENDTO` is the exception: its header is followed directly by the raw
//!   payload bytes.
//! - **Responses** (modem → host): `OK` or `FAIL ERxx` once a command completes.
//! - **Events** (modem → host): asynchronous lines such as `EVENT 22 ...`
//!   (scan complete), `EVENT 25 ...` (PANA join complete) and `ERXUDP ...`
//!   (UDP datagram received), interleaved freely with responses.
//! - **Scan results**: `EPANDESC` followed by indented `  Key:Value` lines.
//!
//! # Example
//!
//! ```rust,ignore
//! use skstack_protocol::{Command, Response, LineCodec};
//!
//! // Build a command
//! let bytes = Command::Version.encode();
//!
//! // Parse a line
//! let response = Response::parse("EVENT 25 FE80:0000:0000:0000:021D:1290:1234:5678")?;
//! ```

mod codec;
mod commands;
mod error;
mod responses;

pub use codec::*;
pub use commands::*;
pub use error::*;
pub use responses::*;
