//! Response and event parsing for the SKSTACK protocol.
//!
//! Lines from the modem can be:
//! - Command completion: `OK`, `FAIL ERxx`
//! - Events: `EVENT <code> <sender> [param]`
//! - Received datagrams: `ERXUDP <9 fields>`
//! - Scan result fields: `  Key:Value`
//! - Anything else (echo, `EVER`, `EINFO`, `EPANDESC`, ...)

use crate::error::{SkError, SkResult};

/// UDP transmission finished.
pub const EVENT_UDP_SENT: u8 = 0x21;
/// Active scan finished.
pub const EVENT_SCAN_COMPLETE: u8 = 0x22;
/// PANA authentication failed.
pub const EVENT_PANA_FAILED: u8 = 0x24;
/// PANA authentication succeeded.
pub const EVENT_PANA_SUCCEEDED: u8 = 0x25;

/// Number of whitespace-separated fields in an `ERXUDP` line.
pub const ERXUDP_FIELD_COUNT: usize = 9;

/// Indentation marking a scan result field.
pub const SCAN_FIELD_PREFIX: &str = "  ";

/// An asynchronous `EVENT` line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    /// Event code (hex on the wire).
    pub code: u8,
    /// Address of the node that raised the event, if present.
    pub sender: Option<String>,
    /// Event-specific parameter, if present.
    pub param: Option<String>,
}

/// A received UDP datagram (`ERXUDP`).
///
/// Only the payload is required. Numeric side fields that fail to parse are
/// left as `None`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RxUdp {
    /// Sender IPv6 address.
    pub sender: String,
    /// Destination IPv6 address.
    pub dest: String,
    /// Sender port.
    pub rport: Option<u16>,
    /// Destination port.
    pub lport: Option<u16>,
    /// Sender MAC address.
    pub sender_lla: String,
    /// Whether the datagram was encrypted.
    pub secured: bool,
    /// Payload length declared by the modem.
    pub data_len: Option<u16>,
    /// Payload as hex text.
    pub data: String,
}

impl RxUdp {
    fn parse(text: &str) -> SkResult<RxUdp> {
        let fields: Vec<&str> = text.split_whitespace().collect();
        if fields.len() < ERXUDP_FIELD_COUNT {
            return Err(SkError::ParseError(format!(
                "ERXUDP expects {} fields, got {}: {}",
                ERXUDP_FIELD_COUNT,
                fields.len(),
                text
            )));
        }

        Ok(RxUdp {
            sender: fields[1].to_string(),
            dest: fields[2].to_string(),
            rport: parse_hex_u16(fields[3]),
            lport: parse_hex_u16(fields[4]),
            sender_lla: fields[5].to_string(),
            secured: fields[6] != "0",
            data_len: parse_hex_u16(fields[7]),
            data: fields[8].to_string(),
        })
    }
}

fn parse_hex_u16(field: &str) -> Option<u16> {
    u16::from_str_radix(field, 16).ok()
}

/// Parsed line from the modem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    /// Command accepted.
    Ok,

    /// Command failed; carries the error code (e.g. `ER04`).
    Fail(String),

    /// Asynchronous event.
    Event(Event),

    /// One `Key:Value` field of a PAN descriptor.
    ScanField {
        /// Field name, e.g. `Pan ID`.
        key: String,
        /// Field value.
        value: String,
    },

    /// Received UDP datagram.
    RxUdp(RxUdp),

    /// Unrecognized line.
    Other(String),
}

impl Response {
    /// Parse a line.
    ///
    /// The input should have its line terminator removed. Leading whitespace
    /// is kept, since it marks scan result fields.
    pub fn parse(line: &str) -> SkResult<Response> {
        let line = line.trim_end_matches(['\r', '\n']);

        if line == "OK" {
            return Ok(Response::Ok);
        }

        if let Some(code) = line.strip_prefix("FAIL ") {
            return Ok(Response::Fail(code.trim().to_string()));
        }

        if let Some(rest) = line.strip_prefix("EVENT ") {
            return Self::parse_event(rest).map(Response::Event);
        }

        if line.starts_with("ERXUDP ") {
            return RxUdp::parse(line).map(Response::RxUdp);
        }

        if let Some(field) = line.strip_prefix(SCAN_FIELD_PREFIX) {
            if let Some((key, value)) = field.trim().split_once(':') {
                return Ok(Response::ScanField {
                    key: key.to_string(),
                    value: value.to_string(),
                });
            }
        }

        Ok(Response::Other(line.to_string()))
    }

    fn parse_event(rest: &str) -> SkResult<Event> {
        let mut parts = rest.split_whitespace();
        let code_str = parts
            .next()
            .ok_or_else(|| SkError::ParseError("EVENT without code".to_string()))?;
        let code = u8::from_str_radix(code_str, 16)
            .map_err(|_| SkError::ParseError(format!("invalid event code: {}", code_str)))?;

        Ok(Event {
            code,
            sender: parts.next().map(str::to_string),
            param: parts.next().map(str::to_string),
        })
    }

    /// Check if this is an `OK` response.
    pub fn is_ok(&self) -> bool {
        matches!(self, Response::Ok)
    }

    /// Check if this is an event with the given code.
    pub fn is_event(&self, code: u8) -> bool {
        matches!(self, Response::Event(event) if event.code == code)
    }

    /// Get the datagram if this is an `ERXUDP` line.
    pub fn as_rx_udp(&self) -> Option<&RxUdp> {
        match self {
            Response::RxUdp(rx) => Some(rx),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ERXUDP_LINE: &str = "ERXUDP FE80:0000:0000:0000:021D:1290:1234:5678 \
        FE80:0000:0000:0000:021D:1290:0000:0001 0E1A 0E1A 001D129012345678 1 0012 \
        1081000102880105FF017201E704000003E8";

    #[test]
    fn test_parse_ok_and_fail() {
        assert_eq!(Response::parse("OK").unwrap(), Response::Ok);
        assert!(Response::parse("OK").unwrap().is_ok());
        assert_eq!(
            Response::parse("FAIL ER04").unwrap(),
            Response::Fail("ER04".to_string())
        );
        // Only an exact OK completes a command
        assert!(!Response::parse("OKAY").unwrap().is_ok());
    }

    #[test]
    fn test_parse_event() {
        let response = Response::parse("EVENT 22 FE80:0000:0000:0000:021D:1290:1234:5678").unwrap();
        assert!(response.is_event(EVENT_SCAN_COMPLETE));
        match response {
            Response::Event(event) => {
                assert_eq!(event.code, 0x22);
                assert_eq!(
                    event.sender.as_deref(),
                    Some("FE80:0000:0000:0000:021D:1290:1234:5678")
                );
                assert!(event.param.is_none());
            }
            other => panic!("unexpected response: {:?}", other),
        }
    }

    #[test]
    fn test_parse_event_with_param() {
        let response = Response::parse("EVENT 21 FE80:0000:0000:0000:021D:1290:1234:5678 00").unwrap();
        assert!(response.is_event(EVENT_UDP_SENT));
        if let Response::Event(event) = response {
            assert_eq!(event.param.as_deref(), Some("00"));
        }
    }

    #[test]
    fn test_parse_bad_event_code() {
        assert!(Response::parse("EVENT ZZ").is_err());
    }

    #[test]
    fn test_parse_scan_fields() {
        assert_eq!(
            Response::parse("  Channel:21").unwrap(),
            Response::ScanField {
                key: "Channel".to_string(),
                value: "21".to_string()
            }
        );
        assert_eq!(
            Response::parse("  Pan ID:8888\r\n").unwrap(),
            Response::ScanField {
                key: "Pan ID".to_string(),
                value: "8888".to_string()
            }
        );
        // Not indented: not a scan field
        assert_eq!(
            Response::parse("Channel:21").unwrap(),
            Response::Other("Channel:21".to_string())
        );
    }

    #[test]
    fn test_parse_erxudp() {
        let response = Response::parse(ERXUDP_LINE).unwrap();
        let rx = response.as_rx_udp().expect("should be ERXUDP");
        assert_eq!(rx.sender, "FE80:0000:0000:0000:021D:1290:1234:5678");
        assert_eq!(rx.rport, Some(0x0E1A));
        assert_eq!(rx.lport, Some(0x0E1A));
        assert_eq!(rx.sender_lla, "001D129012345678");
        assert!(rx.secured);
        assert_eq!(rx.data_len, Some(0x12));
        assert_eq!(rx.data, "1081000102880105FF017201E704000003E8");
    }

    #[test]
    fn test_parse_erxudp_with_bad_side_fields() {
        let response = Response::parse(
            "ERXUDP FE80::1 FE80::2 0E1A xx 001D129012345678 1 zz \
             1081000102880105FF017201E704000003E8",
        )
        .unwrap();
        let rx = response.as_rx_udp().expect("should be ERXUDP");
        assert_eq!(rx.rport, Some(0x0E1A));
        assert_eq!(rx.lport, None);
        assert_eq!(rx.data_len, None);
        assert_eq!(rx.data, "1081000102880105FF017201E704000003E8");
    }

    #[test]
    fn test_parse_short_erxudp() {
        assert!(Response::parse("ERXUDP FE80::1 FE80::2 0E1A").is_err());
    }

    #[test]
    fn test_parse_other() {
        assert_eq!(
            Response::parse("EVER 1.2.10").unwrap(),
            Response::Other("EVER 1.2.10".to_string())
        );
        assert_eq!(
            Response::parse("SKVER").unwrap(),
            Response::Other("SKVER".to_string())
        );
    }
}
