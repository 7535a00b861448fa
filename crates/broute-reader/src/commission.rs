//! PAN commissioning.
//!
//! Commissioning runs these steps in strict order, each one a single wait on
//! the [`CommandEngine`]:
//!
//! 1. `SKVER` / `SKINFO` - check the modem is alive
//! 2. `SKSETRBID` / `SKSETPWD` - install Route-B credentials
//! 3. `SKSCAN` - active scan until a complete PAN descriptor is collected
//! 4. `SKSREG S2` / `SKSREG S3` - register channel and PAN id
//! 5. derive the coordinator's link-local address from its MAC
//! 6. `SKJOIN` - PANA authentication until `EVENT 25`
//!
//! A failure at any step abandons the attempt; callers restart from the top.

use std::fmt;

use skstack_protocol::{
    Command, Response, EVENT_PANA_FAILED, EVENT_PANA_SUCCEEDED, EVENT_SCAN_COMPLETE,
    REGISTER_CHANNEL, REGISTER_PAN_ID,
};
use tracing::{debug, info, trace, warn};

use crate::config::{Credentials, ReaderConfig};
use crate::engine::{CommandEngine, Stage, Wait};
use crate::error::{ReaderError, ReaderResult};
use crate::transport::LineTransport;

/// Scan result key for the channel.
pub const KEY_CHANNEL: &str = "Channel";
/// Scan result key for the PAN id.
pub const KEY_PAN_ID: &str = "Pan ID";
/// Scan result key for the coordinator MAC address.
pub const KEY_ADDR: &str = "Addr";

/// Fixed prefix of the coordinator link-local address.
pub const LINK_LOCAL_PREFIX: &str = "FE80:0000:0000:0000:02";

/// PAN attributes collected from scan results.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PanCandidate {
    /// Channel number (hex text).
    pub channel: Option<String>,
    /// PAN id (hex text).
    pub pan_id: Option<String>,
    /// Coordinator MAC address (16 hex digits).
    pub addr: Option<String>,
}

impl PanCandidate {
    /// Create an empty candidate.
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge one `key:value` scan field; later values replace earlier ones.
    ///
    /// Returns `false` if the key is not one we track.
    pub fn merge(&mut self, key: &str, value: &str) -> bool {
        let slot = match key {
            KEY_CHANNEL => &mut self.channel,
            KEY_PAN_ID => &mut self.pan_id,
            KEY_ADDR => &mut self.addr,
            _ => return false,
        };
        *slot = Some(value.trim().to_string());
        true
    }

    /// Whether channel, PAN id and address have all been seen.
    pub fn is_complete(&self) -> bool {
        self.channel.is_some() && self.pan_id.is_some() && self.addr.is_some()
    }

    /// The completed descriptor, if all fields are present.
    pub fn complete(&self) -> Option<PanDescriptor> {
        Some(PanDescriptor {
            channel: self.channel.clone()?,
            pan_id: self.pan_id.clone()?,
            addr: self.addr.clone()?,
        })
    }
}

/// A fully discovered PAN.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanDescriptor {
    /// Channel number (hex text).
    pub channel: String,
    /// PAN id (hex text).
    pub pan_id: String,
    /// Coordinator MAC address (16 hex digits).
    pub addr: String,
}

/// Link-local IPv6 address of the joined coordinator.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LinkAddress(String);

impl LinkAddress {
    /// Derive the address from a 16-hex-digit MAC address.
    ///
    /// The interface id is `02` followed by MAC digits 2..16, grouped as
    /// `xx:xxxx:xxxx:xxxx`.
    pub fn from_mac(addr: &str) -> ReaderResult<Self> {
        let addr = addr.trim();
        if addr.len() != 16 || !addr.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(ReaderError::InvalidAddress(addr.to_string()));
        }

        Ok(LinkAddress(format!(
            "{}{}:{}:{}:{}",
            LINK_LOCAL_PREFIX,
            &addr[2..4],
            &addr[4..8],
            &addr[8..12],
            &addr[12..16]
        )))
    }

    /// The address text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LinkAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Drives the commissioning steps over an engine.
pub struct Commissioner<'a, T> {
    engine: &'a mut CommandEngine<T>,
    config: &'a ReaderConfig,
}

impl<'a, T: LineTransport> Commissioner<'a, T> {
    /// Create a commissioner using `config`'s budgets.
    pub fn new(engine: &'a mut CommandEngine<T>, config: &'a ReaderConfig) -> Self {
        Commissioner { engine, config }
    }

    /// Run every step and return the joined coordinator's address.
    pub fn run(&mut self, credentials: &Credentials) -> ReaderResult<LinkAddress> {
        self.command(Stage::VersionCheck, Command::Version)?;
        self.command(Stage::InfoQuery, Command::Info)?;
        self.command(
            Stage::SetId,
            Command::SetRouteBId {
                id: credentials.route_b_id.clone(),
            },
        )?;
        self.command(
            Stage::SetPassword,
            Command::SetPassword {
                password: credentials.password.clone(),
            },
        )?;

        let pan = self.scan()?;
        info!(
            "found PAN {} on channel {} (coordinator {})",
            pan.pan_id, pan.channel, pan.addr
        );

        self.command(
            Stage::RegisterChannel,
            Command::SetRegister {
                register: REGISTER_CHANNEL.to_string(),
                value: pan.channel.clone(),
            },
        )?;
        self.command(
            Stage::RegisterPanId,
            Command::SetRegister {
                register: REGISTER_PAN_ID.to_string(),
                value: pan.pan_id.clone(),
            },
        )?;

        let address = LinkAddress::from_mac(&pan.addr)?;
        self.join(&address)?;
        info!("joined PAN {} as {}", pan.pan_id, address);

        Ok(address)
    }

    fn command(&mut self, stage: Stage, command: Command) -> ReaderResult<()> {
        debug!("commissioning: {}", stage);
        self.engine
            .send_await_ok(stage, &command, self.config.command_budget)
    }

    /// Scan until a complete PAN descriptor is collected.
    ///
    /// Fields accumulate across scan cycles; each `EVENT 22` without a
    /// complete candidate starts another cycle.
    pub fn scan(&mut self) -> ReaderResult<PanDescriptor> {
        debug!("commissioning: {}", Stage::Scan);
        let scan = Command::default_scan();
        let max_cycles = self.config.max_scan_cycles.max(1);

        let mut candidate = PanCandidate::new();
        let mut cycles: u32 = 0;

        self.engine.send(&scan)?;
        self.engine
            .await_condition(Stage::Scan, self.config.scan_budget, |line| {
                match Response::parse(line) {
                    Ok(Response::ScanField { key, value }) => {
                        if !candidate.merge(&key, &value) {
                            trace!("ignoring scan field {}={}", key, value);
                        }
                        Ok(Wait::Continue)
                    }
                    Ok(response) if response.is_event(EVENT_SCAN_COMPLETE) => {
                        cycles += 1;
                        if let Some(pan) = candidate.complete() {
                            return Ok(Wait::Done(pan));
                        }
                        if cycles >= max_cycles {
                            warn!("no complete PAN after {} scan cycles", cycles);
                            return Err(ReaderError::Timeout { stage: Stage::Scan });
                        }
                        debug!("scan cycle {} incomplete, rescanning", cycles);
                        Ok(Wait::Send(scan.encode()))
                    }
                    _ => Ok(Wait::Continue),
                }
            })
    }

    /// Start PANA authentication and wait for it to succeed.
    pub fn join(&mut self, address: &LinkAddress) -> ReaderResult<()> {
        debug!("commissioning: {}", Stage::Join);
        self.engine.send(&Command::Join {
            address: address.to_string(),
        })?;
        self.engine
            .await_condition(Stage::Join, self.config.join_budget, |line| {
                match Response::parse(line) {
                    Ok(response) if response.is_event(EVENT_PANA_SUCCEEDED) => Ok(Wait::Done(())),
                    Ok(response) if response.is_event(EVENT_PANA_FAILED) => {
                        warn!("PANA authentication failed, still waiting");
                        Ok(Wait::Continue)
                    }
                    _ => Ok(Wait::Continue),
                }
            })
    }
}

/// Commission a PAN with the given credentials.
pub fn commission<T: LineTransport>(
    engine: &mut CommandEngine<T>,
    credentials: &Credentials,
    config: &ReaderConfig,
) -> ReaderResult<LinkAddress> {
    Commissioner::new(engine, config).run(credentials)
}
