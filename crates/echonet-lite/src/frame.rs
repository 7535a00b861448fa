//! Frame encoding/decoding.
//!
//! Requests built here always use the controller object as source and the
//! smart meter object as destination, with a fixed transaction id.

use bytes::{Buf, BufMut};

use crate::constants::*;
use crate::error::{FrameError, FrameResult};
use crate::types::{Eoj, Property, EOJ_SIZE};

/// A decoded ECHONET Lite frame.
///
/// OPC is not stored: it is always the number of entries in `properties`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EchonetFrame {
    /// Protocol marker.
    pub ehd1: u8,
    /// Message format marker.
    pub ehd2: u8,
    /// Transaction id.
    pub tid: u16,
    /// Source object.
    pub seoj: Eoj,
    /// Destination object.
    pub deoj: Eoj,
    /// Service code.
    pub esv: u8,
    /// Property entries, in frame order.
    pub properties: Vec<Property>,
}

impl EchonetFrame {
    /// Build a controller → smart meter request with the given service code.
    pub fn request(esv: u8, properties: Vec<Property>) -> Self {
        EchonetFrame {
            ehd1: EHD1_ECHONET_LITE,
            ehd2: EHD2_FORMAT_1,
            tid: DEFAULT_TID,
            seoj: Eoj::CONTROLLER,
            deoj: Eoj::SMART_METER,
            esv,
            properties,
        }
    }

    /// Build a Get request for a single property.
    pub fn read_request(epc: u8) -> Self {
        Self::request(ESV_GET, vec![Property::empty(epc)])
    }

    /// Build a SetI request writing `data` to a single property.
    pub fn write_request(epc: u8, data: impl Into<Vec<u8>>) -> Self {
        Self::request(ESV_SETI, vec![Property::new(epc, data)])
    }

    /// Property count (OPC).
    pub fn opc(&self) -> usize {
        self.properties.len()
    }

    /// Find the first property with the given code.
    pub fn property(&self, epc: u8) -> Option<&Property> {
        self.properties.iter().find(|p| p.epc == epc)
    }

    /// Encoded length in bytes.
    pub fn encoded_len(&self) -> usize {
        HEADER_LEN
            + self
                .properties
                .iter()
                .map(|p| PROPERTY_HEADER_LEN + p.pdc())
                .sum::<usize>()
    }

    /// Encode the frame to bytes.
    ///
    /// Fails if OPC or any PDC would not fit in a single byte.
    pub fn encode(&self) -> FrameResult<Vec<u8>> {
        if self.properties.len() > u8::MAX as usize {
            return Err(FrameError::TooManyProperties(self.properties.len()));
        }

        let mut buf = Vec::with_capacity(self.encoded_len());
        buf.put_u8(self.ehd1);
        buf.put_u8(self.ehd2);
        buf.put_u16(self.tid);
        buf.put_slice(self.seoj.as_bytes());
        buf.put_slice(self.deoj.as_bytes());
        buf.put_u8(self.esv);
        buf.put_u8(self.properties.len() as u8);

        for prop in &self.properties {
            if prop.pdc() > MAX_PROPERTY_DATA_LEN {
                return Err(FrameError::PropertyTooLong {
                    epc: prop.epc,
                    len: prop.pdc(),
                });
            }
            buf.put_u8(prop.epc);
            buf.put_u8(prop.pdc() as u8);
            buf.put_slice(&prop.edt);
        }

        Ok(buf)
    }

    /// Encode the frame as upper-case hex, the form used in `ERXUDP` events.
    pub fn to_hex(&self) -> FrameResult<String> {
        Ok(hex::encode_upper(self.encode()?))
    }

    /// Decode a frame from bytes.
    ///
    /// Bytes after the last declared property are ignored.
    pub fn decode(frame: &[u8]) -> FrameResult<Self> {
        let total = frame.len();
        if total < HEADER_LEN {
            return Err(FrameError::FrameTooShort {
                expected: HEADER_LEN,
                actual: total,
            });
        }

        let mut buf = frame;
        let ehd1 = buf.get_u8();
        let ehd2 = buf.get_u8();
        let tid = buf.get_u16();
        let seoj = read_eoj(&mut buf);
        let deoj = read_eoj(&mut buf);
        let esv = buf.get_u8();
        let opc = buf.get_u8() as usize;

        let mut properties = Vec::with_capacity(opc);
        for _ in 0..opc {
            let offset = total - buf.remaining();
            if buf.remaining() < PROPERTY_HEADER_LEN {
                return Err(FrameError::FrameTooShort {
                    expected: offset + PROPERTY_HEADER_LEN,
                    actual: total,
                });
            }
            let epc = buf.get_u8();
            let pdc = buf.get_u8() as usize;
            if buf.remaining() < pdc {
                return Err(FrameError::FrameTooShort {
                    expected: offset + PROPERTY_HEADER_LEN + pdc,
                    actual: total,
                });
            }
            let edt = buf[..pdc].to_vec();
            buf.advance(pdc);
            properties.push(Property { epc, edt });
        }

        if buf.has_remaining() {
            log::trace!("ignoring {} trailing bytes after frame", buf.remaining());
        }

        Ok(EchonetFrame {
            ehd1,
            ehd2,
            tid,
            seoj,
            deoj,
            esv,
            properties,
        })
    }

    /// Decode a frame from its hex text form.
    pub fn decode_hex(text: &str) -> FrameResult<Self> {
        let bytes = hex::decode(text.trim())?;
        Self::decode(&bytes)
    }
}

fn read_eoj(buf: &mut &[u8]) -> Eoj {
    let mut bytes = [0u8; EOJ_SIZE];
    buf.copy_to_slice(&mut bytes);
    Eoj(bytes)
}

/// Encode a Get request for one property.
pub fn encode_read_request(epc: u8) -> Vec<u8> {
    let mut buf = Vec::with_capacity(HEADER_LEN + PROPERTY_HEADER_LEN);
    buf.put_u8(EHD1_ECHONET_LITE);
    buf.put_u8(EHD2_FORMAT_1);
    buf.put_u16(DEFAULT_TID);
    buf.put_slice(Eoj::CONTROLLER.as_bytes());
    buf.put_slice(Eoj::SMART_METER.as_bytes());
    buf.put_u8(ESV_GET);
    buf.put_u8(1);
    buf.put_u8(epc);
    buf.put_u8(0);
    buf
}

/// Encode a SetI request writing `data` to one property.
pub fn encode_write_request(epc: u8, data: &[u8]) -> FrameResult<Vec<u8>> {
    EchonetFrame::write_request(epc, data).encode()
}
