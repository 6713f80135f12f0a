//! Diagnostics: anomalies reported beside, never inside, the message report

use std::fmt;
use tracing::warn;

use super::{DatapointId, Direction, ValueType};
use crate::error::{DecodeError, FrameError};

/// A non-fatal anomaly observed while decoding the link.
#[derive(Debug, Clone, PartialEq)]
pub enum Diagnostic {
    /// Bytes seen before a marker (or after the last frame) that belong to no frame
    SpuriousBytes(Vec<u8>),
    /// A synchronized frame that could not be interpreted
    MalformedFrame { error: FrameError, frame: Vec<u8> },
    /// Recomputed checksum differs from the trailer
    ChecksumMismatch { declared: u16, computed: u16 },
    /// Reply for a datapoint absent from the dictionary
    UnknownDatapoint { id: DatapointId, data: Vec<u8> },
    /// Integer data whose length is not a multiple of the element width
    TrailingBytes { value_type: ValueType, count: usize },
    /// More array elements than the descriptor allows
    ArrayTooLarge { size: usize, max_allowed: usize },
    /// Several elements decoded for a scalar datapoint; only the first is reported
    ExtraElements { value_type: ValueType, count: usize },
    /// Value could not be rendered as text; raw bytes are reported instead
    RawFallback { error: DecodeError },
    /// Value decoding failed; the message is reported with raw bytes
    DecodeFailed { id: DatapointId, error: DecodeError },
    /// Two requests or two replies in a row
    UnexpectedOrdering { previous: Direction, current: Direction },
    /// Input ended inside a frame
    IncompleteFrame { expected: usize, got: usize },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::SpuriousBytes(bytes) => {
                write!(f, "[SPURIOUS DATA] {}", hex::encode(bytes))
            }
            Diagnostic::MalformedFrame { error, frame } => {
                write!(f, "[INVALID FRAME] {} ({})", hex::encode(frame), error)
            }
            Diagnostic::ChecksumMismatch { declared, computed } => {
                write!(f, "checksum mismatch (trailer={:04x}, crc={:04x})", declared, computed)
            }
            Diagnostic::UnknownDatapoint { id, data } => {
                write!(f, "UNKNOWN OBJECT {} data={}", id, hex::encode(data))
            }
            Diagnostic::TrailingBytes { value_type, count } => {
                write!(f, "{} trailing bytes while parsing {}", count, value_type)
            }
            Diagnostic::ArrayTooLarge { size, max_allowed } => write!(
                f,
                "array size larger than allowed (size={}, max allowed={})",
                size, max_allowed
            ),
            Diagnostic::ExtraElements { value_type, count } => write!(
                f,
                "{} elements decoded for scalar {}; reporting the first",
                count, value_type
            ),
            Diagnostic::RawFallback { error } => {
                write!(f, "unable to convert bytes to ASCII ({}); reporting raw bytes", error)
            }
            Diagnostic::DecodeFailed { id, error } => {
                write!(f, "formatting {} failed: {}", id, error)
            }
            Diagnostic::UnexpectedOrdering { previous, current } => {
                write!(f, "unexpected ordering: {} followed by {}", previous, current)
            }
            Diagnostic::IncompleteFrame { expected, got } => {
                write!(f, "input ended mid-frame (expected {} bytes, got {})", expected, got)
            }
        }
    }
}

/// A diagnostic tied to the frame it concerns.
///
/// `frame` is the zero-based index of the synchronized frame, or `None` for
/// anomalies between frames.
#[derive(Debug, Clone, PartialEq)]
pub struct AttributedDiagnostic {
    pub frame: Option<usize>,
    pub diagnostic: Diagnostic,
}

/// Receiver of the diagnostic channel.
pub trait DiagnosticSink {
    fn emit(&mut self, frame: Option<usize>, diagnostic: Diagnostic);
}

impl DiagnosticSink for Vec<AttributedDiagnostic> {
    fn emit(&mut self, frame: Option<usize>, diagnostic: Diagnostic) {
        self.push(AttributedDiagnostic { frame, diagnostic });
    }
}

/// Forwards every diagnostic to `tracing` at WARN level.
///
/// Combined with [`crate::logging::init`] this writes diagnostics to stderr.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn emit(&mut self, frame: Option<usize>, diagnostic: Diagnostic) {
        match frame {
            Some(index) => warn!(frame = index, "{}", diagnostic),
            None => warn!("{}", diagnostic),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vec_sink_keeps_attribution() {
        let mut sink: Vec<AttributedDiagnostic> = Vec::new();
        sink.emit(None, Diagnostic::SpuriousBytes(vec![0xFF, 0xFF]));
        sink.emit(Some(3), Diagnostic::ChecksumMismatch { declared: 1, computed: 2 });

        assert_eq!(sink.len(), 2);
        assert_eq!(sink[0].frame, None);
        assert_eq!(sink[1].frame, Some(3));
    }

    #[test]
    fn display_matches_capture_tooling_wording() {
        assert_eq!(Diagnostic::SpuriousBytes(vec![0xFF, 0xFF]).to_string(), "[SPURIOUS DATA] ffff");
        assert_eq!(
            Diagnostic::ArrayTooLarge { size: 3, max_allowed: 2 }.to_string(),
            "array size larger than allowed (size=3, max allowed=2)"
        );
        assert_eq!(
            Diagnostic::TrailingBytes { value_type: ValueType::U16, count: 1 }.to_string(),
            "1 trailing bytes while parsing U16"
        );
        assert_eq!(
            Diagnostic::UnknownDatapoint { id: DatapointId([0x12, 0x34]), data: vec![0xAB] }
                .to_string(),
            "UNKNOWN OBJECT 1234 data=ab"
        );
    }

    #[test]
    fn tracing_sink_accepts_diagnostics() {
        let _ = tracing_subscriber::fmt::try_init();
        let mut sink = TracingSink;
        sink.emit(Some(0), Diagnostic::UnexpectedOrdering {
            previous: Direction::Request,
            current: Direction::Request,
        });
        sink.emit(None, Diagnostic::IncompleteFrame { expected: 13, got: 9 });
    }
}
