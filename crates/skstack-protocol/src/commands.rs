//! Commands that can be sent to the SKSTACK modem.
//!
//! The commands cover what a B-route client needs:
//! - Firmware and stack information (`SKVER`, `SKINFO`)
//! - Route-B credentials (`SKSETRBID`, `SKSETPWD`)
//! - Active scan and PAN registers (`SKSCAN`, `SKSREG`)
//! - PANA authentication (`SKJOIN`)
//! - UDP transmission (`SKSENDTO`)

use crate::codec::LineCodec;

/// Active scan mode with Information Element (mode 2).
pub const SCAN_MODE_ACTIVE_IE: u8 = 2;
/// Channel mask covering every channel.
pub const SCAN_ALL_CHANNELS: u32 = 0xFFFF_FFFF;
/// Default per-channel scan duration exponent.
pub const SCAN_DEFAULT_DURATION: u8 = 4;

/// Virtual register holding the current channel.
pub const REGISTER_CHANNEL: &str = "S2";
/// Virtual register holding the PAN id.
pub const REGISTER_PAN_ID: &str = "S3";

/// UDP handle bound to the ECHONET Lite port.
pub const UDP_HANDLE_ECHONET: u8 = 1;
/// Security flag: encrypt the datagram.
pub const SEC_ENCRYPTED: u8 = 1;

/// Commands that can be sent to the modem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Get the firmware version (`SKVER`).
    Version,

    /// Get the current stack settings (`SKINFO`).
    Info,

    /// Set the Route-B authentication id (`SKSETRBID`).
    SetRouteBId {
        /// 32-character Route-B id.
        id: String,
    },

    /// Set the Route-B password (`SKSETPWD`).
    SetPassword {
        /// Route-B password.
        password: String,
    },

    /// Start an active scan (`SKSCAN`).
    Scan {
        /// Scan mode.
        mode: u8,
        /// Bit mask of channels to scan.
        channel_mask: u32,
        /// Per-channel duration exponent.
        duration: u8,
    },

    /// Write a virtual register (`SKSREG`).
    SetRegister {
        /// Register name, e.g. `S2`.
        register: String,
        /// Value as the modem expects it (hex text).
        value: String,
    },

    /// Start PANA authentication with a coordinator (`SKJOIN`).
    Join {
        /// Link-local IPv6 address of the coordinator.
        address: String,
    },

    /// Send a UDP datagram (`SKSENDTO`).
    SendTo {
        /// UDP handle to send from.
        handle: u8,
        /// Destination IPv6 address.
        address: String,
        /// Destination port.
        port: u16,
        /// Security flag.
        security: u8,
        /// Raw payload bytes.
        payload: Vec<u8>,
    },
}

impl Command {
    /// The default scan used during commissioning: `SKSCAN 2 FFFFFFFF 4`.
    pub fn default_scan() -> Self {
        Command::Scan {
            mode: SCAN_MODE_ACTIVE_IE,
            channel_mask: SCAN_ALL_CHANNELS,
            duration: SCAN_DEFAULT_DURATION,
        }
    }

    /// Encode the command as the bytes to write to the modem.
    ///
    /// Text commands get a `\r\n` terminator. `SKSENDTO` is written as its
    /// header followed by the raw payload with no terminator.
    pub fn encode(&self) -> Vec<u8> {
        match self {
            Command::SendTo { payload, .. } => {
                let header = self.to_command_string();
                let mut buf = Vec::with_capacity(header.len() + 1 + payload.len());
                buf.extend_from_slice(header.as_bytes());
                buf.push(b' ');
                buf.extend_from_slice(payload);
                buf
            }
            _ => LineCodec::encode_command(&self.to_command_string()),
        }
    }

    /// Get the command string without the terminator.
    ///
    /// For `SKSENDTO` this is the header only; the payload is binary.
    pub fn to_command_string(&self) -> String {
        match self {
            Command::Version => "SKVER".to_string(),
            Command::Info => "SKINFO".to_string(),
            Command::SetRouteBId { id } => format!("SKSETRBID {}", id),
            Command::SetPassword { password } => format!("SKSETPWD C {}", password),
            Command::Scan {
                mode,
                channel_mask,
                duration,
            } => format!("SKSCAN {} {:08X} {}", mode, channel_mask, duration),
            Command::SetRegister { register, value } => format!("SKSREG {} {}", register, value),
            Command::Join { address } => format!("SKJOIN {}", address),
            Command::SendTo {
                handle,
                address,
                port,
                security,
                payload,
            } => format!(
                "SKSENDTO {} {} {:04X} {} {:04X}",
                handle,
                address,
                port,
                security,
                payload.len()
            ),
        }
    }

    /// Command text safe to log: the password is masked.
    pub fn to_log_string(&self) -> String {
        match self {
            Command::SetPassword { password } => {
                format!("SKSETPWD C {}", "*".repeat(password.len()))
            }
            _ => self.to_command_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_version() {
        assert_eq!(Command::Version.encode(), b"SKVER\r\n");
        assert_eq!(Command::Info.encode(), b"SKINFO\r\n");
    }

    #[test]
    fn test_encode_credentials() {
        let cmd = Command::SetRouteBId {
            id: "00112233445566778899AABBCCDDEEFF".to_string(),
        };
        assert_eq!(cmd.encode(), b"SKSETRBID 00112233445566778899AABBCCDDEEFF\r\n");

        let cmd = Command::SetPassword {
            password: "0123456789AB".to_string(),
        };
        assert_eq!(cmd.encode(), b"SKSETPWD C 0123456789AB\r\n");
        assert_eq!(cmd.to_log_string(), "SKSETPWD C ************");
    }

    #[test]
    fn test_encode_password_keeps_fixed_marker() {
        // The C marker does not depend on the password length
        let cmd = Command::SetPassword {
            password: "secret".to_string(),
        };
        assert_eq!(cmd.encode(), b"SKSETPWD C secret\r\n");
        assert_eq!(cmd.to_log_string(), "SKSETPWD C ******");

        let cmd = Command::SetPassword {
            password: "0123456789ABCDEF".to_string(),
        };
        assert_eq!(cmd.to_command_string(), "SKSETPWD C 0123456789ABCDEF");
    }

    #[test]
    fn test_encode_scan() {
        assert_eq!(Command::default_scan().encode(), b"SKSCAN 2 FFFFFFFF 4\r\n");
    }

    #[test]
    fn test_encode_registers() {
        let cmd = Command::SetRegister {
            register: REGISTER_CHANNEL.to_string(),
            value: "21".to_string(),
        };
        assert_eq!(cmd.encode(), b"SKSREG S2 21\r\n");
    }

    #[test]
    fn test_encode_join() {
        let cmd = Command::Join {
            address: "FE80:0000:0000:0000:021D:1290:1234:5678".to_string(),
        };
        assert_eq!(cmd.encode(), b"SKJOIN FE80:0000:0000:0000:021D:1290:1234:5678\r\n");
    }

    #[test]
    fn test_encode_send_to() {
        let cmd = Command::SendTo {
            handle: UDP_HANDLE_ECHONET,
            address: "FE80:0000:0000:0000:021D:1290:1234:5678".to_string(),
            port: 0x0E1A,
            security: SEC_ENCRYPTED,
            payload: vec![0x10, 0x81, 0x00, 0x01],
        };

        let mut expected = b"SKSENDTO 1 FE80:0000:0000:0000:021D:1290:1234:5678 0E1A 1 0004 ".to_vec();
        expected.extend_from_slice(&[0x10, 0x81, 0x00, 0x01]);
        assert_eq!(cmd.encode(), expected);
    }
}
