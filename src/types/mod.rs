//! Core types for link data representation.
//!
//! ## Architecture
//!
//! The types follow the path a byte takes through the decoder:
//! - [`Frame`] is one marker-delimited unit cut from the byte stream
//! - [`Message`] is the structured view of a frame's header and payload
//! - [`Dictionary`] maps a [`DatapointId`] to its [`Descriptor`]
//! - [`ValueType`] is the closed set of semantic types a descriptor can name
//! - [`DecodedValue`] is what the value decode engine produces
//! - [`Diagnostic`] is an anomaly delivered to a [`DiagnosticSink`]
//!
//! ## Usage Example
//!
//! ```rust
//! use heatlink::types::{Descriptor, Dictionary, DatapointId, Frame, Message, ValueType};
//!
//! let dictionary: Dictionary = [(
//!     DatapointId([0x30, 0x23]),
//!     Descriptor::new(ValueType::U16, "Flow temperature").with_gain(0.5).with_unit("°C"),
//! )]
//! .into_iter()
//! .collect();
//!
//! let frame = Frame::from_bytes(vec![
//!     0x01, 0x00, 0x01, 0x00, 0x07, 0xAA, 0xBB, 0xCC, // header, reply
//!     0x30, 0x23, 0x00, 0xB9, 0x01, 0x00, 0x00,       // id, subindex, data, trailer
//! ])
//! .unwrap();
//! let message = Message::from_frame(&frame).unwrap();
//!
//! let descriptor = dictionary.get(&message.datapoint_id).unwrap();
//! let decoded = heatlink::decode(&message.data, descriptor).unwrap();
//! assert_eq!(decoded.value.to_string(), "220.5");
//! ```

mod descriptor;
mod diagnostic;
mod frame;
mod message;
mod value;
mod value_type;

pub use descriptor::{Descriptor, Dictionary, EnumEntry};
pub use diagnostic::{AttributedDiagnostic, Diagnostic, DiagnosticSink, TracingSink};
pub use frame::Frame;
pub use message::{DatapointId, Direction, Message};
pub use value::{DecodedValue, EnumValue, Number, Timestamp};
pub use value_type::ValueType;

#[cfg(test)]
mod tests {
    use super::*;

    use proptest::prelude::*;

    proptest! {
        #[test]
        fn prop_frame_parsing_with_fuzzed_bytes(bytes in prop::collection::vec(any::<u8>(), 0..64)) {
            // Arbitrary bytes either form a consistent frame or are rejected, never panic
            match Frame::from_bytes(bytes.clone()) {
                Ok(frame) => {
                    prop_assert_eq!(&bytes[..2], &Frame::MARKER);
                    prop_assert_eq!(frame.payload().len(), frame.payload_length() as usize);
                    match Message::from_frame(&frame) {
                        Ok(message) => {
                            prop_assert!(frame.payload_length() >= 5);
                            prop_assert_eq!(message.data.len() + 5, frame.payload().len());
                        }
                        Err(_) => prop_assert!(frame.payload_length() < 5),
                    }
                }
                Err(_) => {
                    let consistent = bytes.len() >= Frame::HEADER_SIZE
                        && bytes[..2] == Frame::MARKER
                        && bytes[4] as usize == bytes.len() - Frame::HEADER_SIZE;
                    prop_assert!(!consistent);
                }
            }
        }

        #[test]
        fn prop_datapoint_id_display_parses_back(id in any::<[u8; 2]>()) {
            let id = DatapointId(id);
            prop_assert_eq!(DatapointId::parse(&id.to_string()), Some(id));
        }
    }
}
