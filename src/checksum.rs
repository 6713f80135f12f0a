//! Frame checksum (Modbus CRC-16)
//!
//! Which bytes the trailer actually covers is not confirmed for this link, so
//! the covered range is selectable through [`ChecksumCoverage`]. A mismatch is
//! only ever a diagnostic.

use serde::{Deserialize, Serialize};

use crate::types::Frame;

const CRC16_INIT: u16 = 0xFFFF;
const CRC16_POLY_REFLECTED: u16 = 0xA001;

/// Modbus CRC-16: reflected polynomial 0xA001, initial value 0xFFFF.
pub fn checksum16(data: &[u8]) -> u16 {
    let mut crc = CRC16_INIT;
    for &byte in data {
        crc ^= byte as u16;
        for _ in 0..8 {
            if crc & 1 != 0 {
                crc = (crc >> 1) ^ CRC16_POLY_REFLECTED;
            } else {
                crc >>= 1;
            }
        }
    }
    crc
}

/// Byte range of a frame fed to the checksum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChecksumCoverage {
    /// Direction byte through the byte before the trailer
    #[default]
    Payload,
    /// Second marker byte through the byte before the trailer
    FromMarker,
}

impl ChecksumCoverage {
    /// Covered bytes, or `None` when the frame has no room for a trailer.
    pub fn range(self, frame: &Frame) -> Option<&[u8]> {
        let bytes = frame.as_bytes();
        if frame.payload().len() < 2 {
            return None;
        }
        let end = bytes.len() - 2;
        let start = match self {
            ChecksumCoverage::Payload => 2,
            ChecksumCoverage::FromMarker => 1,
        };
        bytes.get(start..end)
    }
}

/// Declared trailer next to the recomputed checksum.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChecksumCheck {
    /// Trailer read little-endian
    pub declared: u16,
    pub computed: u16,
}

impl ChecksumCheck {
    pub fn of(frame: &Frame, coverage: ChecksumCoverage) -> Option<Self> {
        let covered = coverage.range(frame)?;
        let payload = frame.payload();
        let trailer = &payload[payload.len() - 2..];
        Some(Self {
            declared: u16::from_le_bytes([trailer[0], trailer[1]]),
            computed: checksum16(covered),
        })
    }

    pub fn is_valid(&self) -> bool {
        self.declared == self.computed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    /// Table-free bit-at-a-time CRC over the non-reflected polynomial, reflected by hand.
    fn reference_crc(data: &[u8]) -> u16 {
        let mut crc: u16 = 0xFFFF;
        for &byte in data {
            let mut b = byte.reverse_bits() as u16;
            for _ in 0..8 {
                let top = ((crc >> 15) ^ (b >> 7)) & 1;
                crc <<= 1;
                b <<= 1;
                if top != 0 {
                    crc ^= 0x8005;
                }
            }
        }
        crc.reverse_bits()
    }

    proptest! {
        #[test]
        fn prop_matches_reference(data in prop::collection::vec(any::<u8>(), 0..128)) {
            prop_assert_eq!(checksum16(&data), reference_crc(&data));
        }
    }

    #[test]
    fn check_value() {
        assert_eq!(checksum16(b"123456789"), 0x4B37);
    }

    #[test]
    fn empty_input_is_initial_register() {
        assert_eq!(checksum16(&[]), 0xFFFF);
    }

    #[test]
    fn coverage_ranges() {
        let frame = Frame::from_bytes(vec![
            0x01, 0x00, 0x01, 0x00, 0x05, 0xAA, 0xBB, 0xCC, 0x30, 0x23, 0x00, 0x01, 0x02,
        ])
        .unwrap();

        assert_eq!(
            ChecksumCoverage::Payload.range(&frame),
            Some(&[0x01, 0x00, 0x05, 0xAA, 0xBB, 0xCC, 0x30, 0x23, 0x00][..])
        );
        assert_eq!(
            ChecksumCoverage::FromMarker.range(&frame),
            Some(&[0x00, 0x01, 0x00, 0x05, 0xAA, 0xBB, 0xCC, 0x30, 0x23, 0x00][..])
        );
    }

    #[test]
    fn valid_trailer_is_little_endian_crc() {
        let mut bytes = vec![0x01, 0x00, 0x01, 0x00, 0x05, 0xAA, 0xBB, 0xCC, 0x30, 0x23, 0x00];
        let crc = checksum16(&bytes[2..]);
        bytes.extend_from_slice(&crc.to_le_bytes());
        let frame = Frame::from_bytes(bytes).unwrap();

        let check = ChecksumCheck::of(&frame, ChecksumCoverage::Payload).unwrap();
        assert!(check.is_valid());
        assert!(!ChecksumCheck::of(&frame, ChecksumCoverage::FromMarker).unwrap().is_valid());
    }

    #[test]
    fn no_trailer_no_check() {
        let frame = Frame::from_bytes(vec![0x01, 0x00, 0, 0, 1, 0, 0, 0, 0x42]).unwrap();
        assert_eq!(ChecksumCheck::of(&frame, ChecksumCoverage::Payload), None);
    }
}
