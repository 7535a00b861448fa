//! Caller-facing reader.

use echonet_lite::EchonetFrame;
use tracing::info;

use crate::commission::{commission, LinkAddress};
use crate::config::{Credentials, ReaderConfig};
use crate::engine::{CommandEngine, LineObserver};
use crate::error::{ReaderError, ReaderResult};
use crate::telemetry::Telemetry;
use crate::transport::LineTransport;

/// Reads a smart meter over the B-route through an SKSTACK modem.
///
/// The reader exclusively owns its transport. Call [`connect`](Self::connect)
/// once, then issue property reads and writes.
#[derive(Debug)]
pub struct BRouteReader<T> {
    engine: CommandEngine<T>,
    config: ReaderConfig,
    link: Option<LinkAddress>,
}

impl<T: LineTransport> BRouteReader<T> {
    /// Create a reader over `transport`.
    pub fn new(transport: T, config: ReaderConfig) -> Self {
        BRouteReader {
            engine: CommandEngine::new(transport),
            config,
            link: None,
        }
    }

    /// Install a sink that sees every line read from the modem.
    pub fn with_observer(mut self, observer: impl LineObserver + 'static) -> Self {
        self.engine.set_observer(observer);
        self
    }

    /// Get the configuration.
    pub fn config(&self) -> &ReaderConfig {
        &self.config
    }

    /// Address of the joined coordinator, once connected.
    pub fn link_address(&self) -> Option<&LinkAddress> {
        self.link.as_ref()
    }

    /// Whether commissioning has completed.
    pub fn is_joined(&self) -> bool {
        self.link.is_some()
    }

    /// Get a reference to the transport.
    pub fn transport(&self) -> &T {
        self.engine.transport()
    }

    /// Release the transport.
    pub fn into_transport(self) -> T {
        self.engine.into_transport()
    }

    /// Commission the PAN and join it.
    ///
    /// On failure any previous link is dropped; the whole sequence must be
    /// retried from the start.
    pub fn connect(&mut self, credentials: &Credentials) -> ReaderResult<&LinkAddress> {
        self.link = None;
        info!("commissioning with route-B id {}", credentials.route_b_id);
        let address = commission(&mut self.engine, credentials, &self.config)?;
        Ok(self.link.insert(address))
    }

    fn telemetry(&mut self) -> ReaderResult<Telemetry<'_, T>> {
        let link = self.link.as_ref().ok_or(ReaderError::NotJoined)?;
        Ok(Telemetry::new(&mut self.engine, link, self.config.write_budget))
    }

    /// Read one property, returning the whole Get_Res frame.
    pub fn read(&mut self, epc: u8, budget: u32) -> ReaderResult<EchonetFrame> {
        self.telemetry()?.read(epc, budget)
    }

    /// Read one property's data.
    pub fn read_property(&mut self, epc: u8, budget: u32) -> ReaderResult<Vec<u8>> {
        self.telemetry()?.read_property(epc, budget)
    }

    /// Read instantaneous power in watts.
    pub fn read_moment_power(&mut self, budget: u32) -> ReaderResult<i64> {
        self.telemetry()?.read_moment_power(budget)
    }

    /// Write one property.
    pub fn write(&mut self, epc: u8, data: &[u8]) -> ReaderResult<()> {
        self.telemetry()?.write(epc, data)
    }
}
