//! Raw frames as cut from the link byte stream

use crate::error::FrameError;

/// One marker-delimited, length-prefixed unit extracted from the link.
///
/// Layout: `marker(2) | direction(1) | flags(1) | length(1) | type_code(3) | payload(length)`.
/// A constructed frame always starts with [`Frame::MARKER`] and its declared
/// length matches the number of payload bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    bytes: Vec<u8>,
}

impl Frame {
    /// Two bytes that open every frame, in arrival order
    pub const MARKER: [u8; 2] = [0x01, 0x00];
    /// Marker, direction, flags, length and type code
    pub const HEADER_SIZE: usize = 8;

    /// Validate and wrap the bytes of one frame.
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self, FrameError> {
        if bytes.len() < Self::HEADER_SIZE {
            return Err(FrameError::Truncated { len: bytes.len() });
        }

        if bytes[..2] != Self::MARKER {
            return Err(FrameError::BadMarker { found: [bytes[0], bytes[1]] });
        }

        let declared = bytes[4];
        let actual = bytes.len() - Self::HEADER_SIZE;
        if declared as usize != actual {
            return Err(FrameError::LengthMismatch { declared, actual });
        }

        Ok(Self { bytes })
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    /// Total frame size, `8 + payload_length`.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Raw direction byte; `1` marks a reply.
    pub fn direction(&self) -> u8 {
        self.bytes[2]
    }

    pub fn flags(&self) -> u8 {
        self.bytes[3]
    }

    pub fn payload_length(&self) -> u8 {
        self.bytes[4]
    }

    /// Opaque 3-byte channel/command discriminator.
    pub fn type_code(&self) -> [u8; 3] {
        [self.bytes[5], self.bytes[6], self.bytes[7]]
    }

    pub fn payload(&self) -> &[u8] {
        &self.bytes[Self::HEADER_SIZE..]
    }
}
