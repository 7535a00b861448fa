//! Common types used in frames.

use std::fmt;

use crate::error::{FrameError, FrameResult};

/// Size of an ECHONET object code (class group, class, instance).
pub const EOJ_SIZE: usize = 3;

/// An ECHONET object code naming a logical endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Eoj(pub [u8; EOJ_SIZE]);

impl Eoj {
    /// Controller object (`05FF01`), used as the source of our requests.
    pub const CONTROLLER: Eoj = Eoj([0x05, 0xFF, 0x01]);
    /// Low-voltage smart electric energy meter (`028801`).
    pub const SMART_METER: Eoj = Eoj([0x02, 0x88, 0x01]);

    /// Get the underlying bytes.
    pub fn as_bytes(&self) -> &[u8; EOJ_SIZE] {
        &self.0
    }
}

impl fmt::Display for Eoj {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02X}{:02X}{:02X}", self.0[0], self.0[1], self.0[2])
    }
}

/// A single property entry (EPC, PDC, EDT).
///
/// PDC is not stored: it is always the length of `edt`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Property {
    /// Property code.
    pub epc: u8,
    /// Property data.
    pub edt: Vec<u8>,
}

impl Property {
    /// Create a property carrying `edt`.
    pub fn new(epc: u8, edt: impl Into<Vec<u8>>) -> Self {
        Property {
            epc,
            edt: edt.into(),
        }
    }

    /// Create a property with no data, as used in Get requests.
    pub fn empty(epc: u8) -> Self {
        Property {
            epc,
            edt: Vec::new(),
        }
    }

    /// Declared data length (PDC).
    pub fn pdc(&self) -> usize {
        self.edt.len()
    }

    /// Interpret the data as a big-endian unsigned integer.
    ///
    /// Fails if the data is empty or wider than 8 bytes.
    pub fn to_u64(&self) -> FrameResult<u64> {
        self.check_integer_width()?;
        Ok(self
            .edt
            .iter()
            .fold(0u64, |acc, &byte| (acc << 8) | u64::from(byte)))
    }

    /// Interpret the data as a big-endian two's complement integer.
    ///
    /// The value is sign-extended from the width of the data, so a 4-byte
    /// `FFFFFFFF` reads as `-1`.
    pub fn to_i64(&self) -> FrameResult<i64> {
        let raw = self.to_u64()?;
        let bits = self.edt.len() as u32 * 8;
        if bits == 64 {
            return Ok(raw as i64);
        }
        let shift = 64 - bits;
        Ok(((raw << shift) as i64) >> shift)
    }

    fn check_integer_width(&self) -> FrameResult<()> {
        if self.edt.is_empty() || self.edt.len() > 8 {
            return Err(FrameError::InvalidPropertyValue {
                epc: self.epc,
                len: self.edt.len(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_eoj_display() {
        assert_eq!(Eoj::SMART_METER.to_string(), "028801");
        assert_eq!(Eoj::CONTROLLER.to_string(), "05FF01");
    }

    #[test]
    fn test_property_unsigned() {
        let prop = Property::new(0xE7, vec![0x00, 0x00, 0x03, 0xE8]);
        assert_eq!(prop.pdc(), 4);
        assert_eq!(prop.to_u64(), Ok(1000));
    }

    #[test]
    fn test_property_signed_negative() {
        let prop = Property::new(0xE7, vec![0xFF, 0xFF, 0xFF, 0x9C]);
        assert_eq!(prop.to_i64(), Ok(-100));
        assert_eq!(prop.to_u64(), Ok(0xFFFF_FF9C));
    }

    #[test]
    fn test_property_signed_short_width() {
        // 2-byte values are sign-extended from 16 bits
        let prop = Property::new(0xE8, vec![0x80, 0x00]);
        assert_eq!(prop.to_i64(), Ok(-32768));

        let prop = Property::new(0xE8, vec![0x7F, 0xFE]);
        assert_eq!(prop.to_i64(), Ok(0x7FFE));
    }

    #[test]
    fn test_property_empty_is_not_a_value() {
        let prop = Property::empty(0xE7);
        assert_eq!(
            prop.to_i64(),
            Err(FrameError::InvalidPropertyValue { epc: 0xE7, len: 0 })
        );
    }

    #[test]
    fn test_property_too_wide_is_not_a_value() {
        let prop = Property::new(0xE0, vec![0u8; 9]);
        assert!(prop.to_u64().is_err());
    }
}
