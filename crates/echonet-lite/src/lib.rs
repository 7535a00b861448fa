//! ECHONET Lite Frames
//!
//! This crate provides the frame types and codec used to talk to a low-voltage
//! smart electricity meter over the B-route. Frames are carried as the payload
//! of UDP datagrams on port `0x0E1A`; on the SKSTACK modem they show up
//! hex-encoded inside `ERXUDP` events and are sent as raw bytes via `SKSENDTO`.
//!
//! # Frame Layout
//!
//! ```text
//! +------+------+-----+------+------+-----+-----+----------------------------+
//! | EHD1 | EHD2 | TID | SEOJ | DEOJ | ESV | OPC | { EPC | PDC | EDT[PDC] } * |
//! |  1B  |  1B  | 2B  |  3B  |  3B  | 1B  | 1B  |        OPC entries         |
//! +------+------+-----+------+------+-----+-----+----------------------------+
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use echonet_lite::{encode_read_request, EchonetFrame, EPC_INSTANTANEOUS_POWER};
//!
//! // Build a Get request for instantaneous power
//! let request = encode_read_request(EPC_INSTANTANEOUS_POWER);
//!
//! // Parse a Get_Res received in an ERXUDP event
//! let frame = EchonetFrame::decode_hex("1081000102880105FF017201E704000003E8")?;
//! ```

mod constants;
mod error;
mod frame;
mod types;

pub use constants::*;
pub use error::*;
pub use frame::*;
pub use types::*;
