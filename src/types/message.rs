//! Structured view over a frame's header and payload

use serde::{Deserialize, Serialize};
use std::fmt;

use super::Frame;
use crate::error::FrameError;

/// Whether a frame travels from the control device (request) or back to it (reply).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Request,
    Reply,
}

impl Direction {
    /// Direction byte `1` is a reply; every other value is treated as a request.
    pub fn from_byte(byte: u8) -> Self {
        if byte == 0x01 { Direction::Reply } else { Direction::Request }
    }

    pub fn as_byte(self) -> u8 {
        match self {
            Direction::Request => 0x00,
            Direction::Reply => 0x01,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Request => f.pad("Request"),
            Direction::Reply => f.pad("Reply"),
        }
    }
}

/// 2-byte datapoint identifier, the object dictionary lookup key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DatapointId(pub [u8; 2]);

impl DatapointId {
    /// Parse the 4-digit hex spelling used as a dictionary key.
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        if text.len() != 4 {
            return None;
        }
        let mut id = [0u8; 2];
        hex::decode_to_slice(text, &mut id).ok()?;
        Some(Self(id))
    }
}

impl fmt::Display for DatapointId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode_upper(self.0))
    }
}

/// Structured interpretation of one frame.
///
/// The meaning of `subindex` and of `type_code` is not established; both are
/// carried through untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub direction: Direction,
    pub flags: u8,
    pub payload_length: u8,
    pub type_code: [u8; 3],
    pub datapoint_id: DatapointId,
    pub subindex: u8,
    pub data: Vec<u8>,
    /// Last two payload bytes, the candidate checksum
    pub trailer: [u8; 2],
}

impl Message {
    /// Datapoint id, subindex and trailer
    pub const MIN_PAYLOAD: usize = 5;

    pub fn from_frame(frame: &Frame) -> Result<Self, FrameError> {
        let payload = frame.payload();
        if payload.len() < Self::MIN_PAYLOAD {
            return Err(FrameError::TooShort { payload_length: frame.payload_length() });
        }

        let trailer_start = payload.len() - 2;
        Ok(Self {
            direction: Direction::from_byte(frame.direction()),
            flags: frame.flags(),
            payload_length: frame.payload_length(),
            type_code: frame.type_code(),
            datapoint_id: DatapointId([payload[0], payload[1]]),
            subindex: payload[2],
            data: payload[3..trailer_start].to_vec(),
            trailer: [payload[trailer_start], payload[trailer_start + 1]],
        })
    }

    /// Encode back into frame bytes.
    pub fn to_frame(&self) -> Result<Frame, FrameError> {
        let actual = Self::MIN_PAYLOAD + self.data.len();
        if actual != self.payload_length as usize {
            return Err(FrameError::LengthMismatch { declared: self.payload_length, actual });
        }

        let mut bytes = Vec::with_capacity(Frame::HEADER_SIZE + actual);
        bytes.extend_from_slice(&Frame::MARKER);
        bytes.push(self.direction.as_byte());
        bytes.push(self.flags);
        bytes.push(self.payload_length);
        bytes.extend_from_slice(&self.type_code);
        bytes.extend_from_slice(&self.datapoint_id.0);
        bytes.push(self.subindex);
        bytes.extend_from_slice(&self.data);
        bytes.extend_from_slice(&self.trailer);

        Frame::from_bytes(bytes)
    }

    pub fn is_reply(&self) -> bool {
        self.direction == Direction::Reply
    }

    /// Trailer read as a little-endian u16.
    pub fn declared_checksum(&self) -> u16 {
        u16::from_le_bytes(self.trailer)
    }
}
