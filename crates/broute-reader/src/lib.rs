//! B-route Smart Meter Reader
//!
//! This crate commissions a Wi-SUN B-route link through an SKSTACK modem and
//! then reads and writes ECHONET Lite properties on the joined smart meter.
//!
//! # Layers
//!
//! - [`transport`]: the line-oriented channel to the modem (external; wrap an
//!   opened serial port with [`StreamTransport`])
//! - [`engine`]: command/response engine with empty-read wait budgets
//! - [`commission`]: version check, credentials, scan, registers, PANA join
//! - [`telemetry`]: property read/write transactions over `SKSENDTO`/`ERXUDP`
//! - [`reader`]: the [`BRouteReader`] façade tying them together
//!
//! # Example
//!
//! ```rust,ignore
//! use broute_reader::{BRouteReader, ConnectionSettings, StreamTransport};
//!
//! let settings = ConnectionSettings::from_file("meter.yaml")?;
//! let mut reader = BRouteReader::new(StreamTransport::new(port), settings.reader.clone());
//! reader.connect(&settings.credentials)?;
//!
//! let watts = reader.read_moment_power(reader.config().read_budget)?;
//! ```

pub mod commission;
pub mod config;
pub mod engine;
pub mod error;
pub mod reader;
pub mod telemetry;
pub mod testing;
pub mod transport;

pub use commission::{commission, Commissioner, LinkAddress, PanCandidate, PanDescriptor};
pub use config::{ConnectionSettings, Credentials, ReaderConfig};
pub use engine::{CommandEngine, LineObserver, Stage, Wait};
pub use error::{ReaderError, ReaderResult};
pub use reader::BRouteReader;
pub use telemetry::Telemetry;
pub use transport::{LineTransport, StreamTransport};
