//! Protocol constants
//!
//! Header markers, service codes (ESV) and property codes (EPC) used when
//! talking to a low-voltage smart electricity meter.

// ============================================================================
// Header
// ============================================================================

/// EHD1 marker for ECHONET Lite.
pub const EHD1_ECHONET_LITE: u8 = 0x10;
/// EHD2 marker for the specified message format (format 1).
pub const EHD2_FORMAT_1: u8 = 0x81;
/// Transaction id used for every request this crate builds.
pub const DEFAULT_TID: u16 = 0x0001;
/// Length of the fixed header up to and including OPC.
pub const HEADER_LEN: usize = 12;
/// Length of a property entry without its EDT (EPC + PDC).
pub const PROPERTY_HEADER_LEN: usize = 2;
/// Largest EDT a single property entry can carry.
pub const MAX_PROPERTY_DATA_LEN: usize = u8::MAX as usize;

/// UDP port ECHONET Lite nodes listen on.
pub const ECHONET_UDP_PORT: u16 = 0x0E1A;

// ============================================================================
// Service Codes (ESV)
// ============================================================================

/// Property value write request, no response required (SetI).
pub const ESV_SETI: u8 = 0x60;
/// Property value write request, response required (SetC).
pub const ESV_SETC: u8 = 0x61;
/// Property value read request (Get).
pub const ESV_GET: u8 = 0x62;
/// Property notification request (INF_REQ).
pub const ESV_INF_REQ: u8 = 0x63;
/// Property value write response (Set_Res).
pub const ESV_SET_RES: u8 = 0x71;
/// Property value read response (Get_Res).
pub const ESV_GET_RES: u8 = 0x72;
/// Property value notification (INF).
pub const ESV_INF: u8 = 0x73;
/// SetI could not be processed (SetI_SNA).
pub const ESV_SETI_SNA: u8 = 0x50;
/// SetC could not be processed (SetC_SNA).
pub const ESV_SETC_SNA: u8 = 0x51;
/// Get could not be processed (Get_SNA).
pub const ESV_GET_SNA: u8 = 0x52;

// ============================================================================
// Property Codes (EPC) - low-voltage smart electric energy meter
// ============================================================================

/// Operation status.
pub const EPC_OPERATION_STATUS: u8 = 0x80;
/// Coefficient applied to cumulative energy values.
pub const EPC_COEFFICIENT: u8 = 0xD3;
/// Number of effective digits for cumulative energy values.
pub const EPC_EFFECTIVE_DIGITS: u8 = 0xD7;
/// Cumulative energy, normal direction.
pub const EPC_CUMULATIVE_ENERGY: u8 = 0xE0;
/// Unit for cumulative energy values.
pub const EPC_CUMULATIVE_ENERGY_UNIT: u8 = 0xE1;
/// Instantaneous electric power in watts (signed, 4 bytes).
pub const EPC_INSTANTANEOUS_POWER: u8 = 0xE7;
/// Instantaneous current in 0.1 A per phase (R, T).
pub const EPC_INSTANTANEOUS_CURRENT: u8 = 0xE8;
