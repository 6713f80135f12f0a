//! Test utilities for building frames and dictionaries
//!
//! Shared by unit tests and the criterion benches.

#![cfg(any(test, feature = "benchmark"))]

use std::path::{Path, PathBuf};

use crate::checksum::{ChecksumCoverage, checksum16};
use crate::types::{DatapointId, Descriptor, Dictionary, Direction, Frame, Message, ValueType};

/// Object dictionary in the JSON layout used by the capture tooling.
pub const SAMPLE_DICTIONARY_JSON: &str = r#"{
    "3023": { "type": "U16", "desc": "Flow temperature", "unit": "°C", "gain": 0.1, "is_array": false },
    "3024": { "type": "I16", "desc": "Outdoor temperature", "unit": "°C", "gain": 0.1, "is_array": false },
    "2001": { "type": "Enum", "desc": "Burner state", "is_array": false,
              "values": { "0": { "description": "off" }, "1": { "description": "on" } } },
    "4000": { "type": "TimeOfDay", "desc": "Controller clock", "is_array": false },
    "5001": { "type": "VisibleString", "desc": "Device name", "is_array": false },
    "6000": { "type": "U8", "desc": "Zone valve positions", "unit": "%", "is_array": true, "max_array_size": 4 },
    "6100": { "type": "U32", "desc": "Burner hours", "unit": "h", "is_array": false }
}"#;

/// Parsed form of [`SAMPLE_DICTIONARY_JSON`].
pub fn sample_dictionary() -> Dictionary {
    [
        (
            DatapointId([0x30, 0x23]),
            Descriptor::new(ValueType::U16, "Flow temperature").with_unit("°C").with_gain(0.1),
        ),
        (
            DatapointId([0x30, 0x24]),
            Descriptor::new(ValueType::I16, "Outdoor temperature").with_unit("°C").with_gain(0.1),
        ),
        (
            DatapointId([0x20, 0x01]),
            Descriptor::new(ValueType::Enum, "Burner state")
                .with_enum_values([("0", "off"), ("1", "on")]),
        ),
        (DatapointId([0x40, 0x00]), Descriptor::new(ValueType::TimeOfDay, "Controller clock")),
        (DatapointId([0x50, 0x01]), Descriptor::new(ValueType::VisibleString, "Device name")),
        (
            DatapointId([0x60, 0x00]),
            Descriptor::new(ValueType::U8, "Zone valve positions").with_unit("%").with_array(Some(4)),
        ),
        (DatapointId([0x61, 0x00]), Descriptor::new(ValueType::U32, "Burner hours").with_unit("h")),
    ]
    .into_iter()
    .collect()
}

/// Builder for well-formed frames.
///
/// Unless a trailer is set explicitly, the trailer is the little-endian CRC
/// over [`ChecksumCoverage::Payload`].
#[derive(Debug, Clone)]
pub struct FrameBuilder {
    direction: Direction,
    flags: u8,
    type_code: [u8; 3],
    datapoint: u16,
    subindex: u8,
    data: Vec<u8>,
    trailer: Option<[u8; 2]>,
}

impl FrameBuilder {
    pub fn request(datapoint: u16) -> Self {
        Self::new(Direction::Request, datapoint)
    }

    pub fn reply(datapoint: u16) -> Self {
        Self::new(Direction::Reply, datapoint)
    }

    fn new(direction: Direction, datapoint: u16) -> Self {
        Self {
            direction,
            flags: 0,
            type_code: [0xAA, 0xBB, 0xCC],
            datapoint,
            subindex: 0,
            data: Vec::new(),
            trailer: None,
        }
    }

    pub fn flags(mut self, flags: u8) -> Self {
        self.flags = flags;
        self
    }

    pub fn type_code(mut self, type_code: [u8; 3]) -> Self {
        self.type_code = type_code;
        self
    }

    pub fn subindex(mut self, subindex: u8) -> Self {
        self.subindex = subindex;
        self
    }

    pub fn data(mut self, data: &[u8]) -> Self {
        self.data = data.to_vec();
        self
    }

    pub fn trailer(mut self, trailer: [u8; 2]) -> Self {
        self.trailer = Some(trailer);
        self
    }

    pub fn message(&self) -> Message {
        let mut message = Message {
            direction: self.direction,
            flags: self.flags,
            payload_length: (Message::MIN_PAYLOAD + self.data.len()) as u8,
            type_code: self.type_code,
            datapoint_id: DatapointId(self.datapoint.to_be_bytes()),
            subindex: self.subindex,
            data: self.data.clone(),
            trailer: [0, 0],
        };
        message.trailer = match self.trailer {
            Some(trailer) => trailer,
            None => {
                let frame = message.to_frame().expect("builder produces consistent lengths");
                let covered = ChecksumCoverage::Payload.range(&frame).expect("payload has a trailer");
                checksum16(covered).to_le_bytes()
            }
        };
        message
    }

    pub fn build(&self) -> Frame {
        self.message().to_frame().expect("builder produces consistent lengths")
    }
}

/// Concatenate frames into one capture.
pub fn capture(frames: &[Frame]) -> Vec<u8> {
    frames.iter().flat_map(|f| f.as_bytes().iter().copied()).collect()
}

/// Error returned when a required fixture cannot be located.
#[derive(Debug, Clone)]
pub struct FixtureError {
    message: String,
}

impl std::fmt::Display for FixtureError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for FixtureError {}

/// Resolve a file under `tests/fixtures/`.
pub fn require_fixture<P: AsRef<Path>>(name: P) -> Result<PathBuf, FixtureError> {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures").join(name.as_ref());
    if path.exists() {
        Ok(path)
    } else {
        Err(FixtureError { message: format!("Missing fixture: {}", path.display()) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_trailer_is_valid_crc() {
        let frame = FrameBuilder::reply(0x3023).data(&[0x26, 0x02]).build();
        let check = crate::checksum::ChecksumCheck::of(&frame, ChecksumCoverage::Payload).unwrap();
        assert!(check.is_valid());
    }

    #[test]
    fn builder_fields() {
        let frame = FrameBuilder::request(0x3023).flags(0x80).subindex(2).trailer([1, 2]).build();
        let message = Message::from_frame(&frame).unwrap();
        assert_eq!(message.datapoint_id, DatapointId([0x30, 0x23]));
        assert_eq!(message.flags, 0x80);
        assert_eq!(message.subindex, 2);
        assert_eq!(message.trailer, [1, 2]);
        assert!(!message.is_reply());
    }

    #[test]
    fn sample_dictionary_fixture_exists() {
        let path = require_fixture("object-dictionary.json").unwrap();
        assert!(path.ends_with("object-dictionary.json"));
        assert!(require_fixture("missing.json").is_err());
    }
}
