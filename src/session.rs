//! Session driver
//!
//! Pulls frames from the synchronizer until the input ends, interprets each
//! one against the dictionary and writes the report. Every per-frame problem
//! becomes a [`Diagnostic`]; only I/O failures stop a session early, and a
//! capture cut off mid-frame ends it normally with `truncated` set.

use serde::Serialize;
use std::io::Write;
use std::path::Path;
use tracing::{debug, info, trace};

use crate::checksum::ChecksumCheck;
use crate::config::DecoderConfig;
use crate::decode::decode;
use crate::error::DecodeError;
use crate::report::render_record;
use crate::source::ByteSource;
use crate::sync::{FrameSynchronizer, SyncEvent};
use crate::types::{
    DecodedValue, Descriptor, Diagnostic, DiagnosticSink, Dictionary, Direction, Frame, Message,
};
use crate::{LinkError, Result};

/// What became of a message's data.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Requests carry no value; only identifying fields are reported
    Request,
    /// Reply for a datapoint missing from the dictionary
    Unknown,
    /// Reply decoded with its descriptor
    Value(DecodedValue),
    /// Reply whose data did not fit its descriptor; reported raw
    Failed(DecodeError),
}

/// One interpreted message, ready for the report.
#[derive(Debug, Clone, PartialEq)]
pub struct Record<'d> {
    /// Zero-based index of the synchronized frame
    pub index: usize,
    pub frame: Frame,
    pub message: Message,
    /// `None` when checksum verification is disabled
    pub checksum: Option<ChecksumCheck>,
    pub descriptor: Option<&'d Descriptor>,
    pub outcome: Outcome,
}

/// Counters for one pass over a capture.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SessionSummary {
    pub frames: usize,
    pub requests: usize,
    pub replies: usize,
    pub decoded: usize,
    pub decode_failures: usize,
    pub unknown: usize,
    pub malformed: usize,
    pub checksum_mismatches: usize,
    pub spurious_bytes: usize,
    pub ordering_anomalies: usize,
    /// Input ended inside a frame
    pub truncated: bool,
}

/// Single-pass decoder over one capture.
pub struct Session<'d, S> {
    frames: FrameSynchronizer<S>,
    dictionary: &'d Dictionary,
    config: DecoderConfig,
    /// Index and direction of the last well-formed message
    previous: Option<(usize, Direction)>,
    summary: SessionSummary,
}

impl<'d> Session<'d, Box<dyn ByteSource>> {
    /// Open a capture file in the configured input format.
    pub fn open<P: AsRef<Path>>(
        path: P,
        dictionary: &'d Dictionary,
        config: &DecoderConfig,
    ) -> Result<Self> {
        let source = config.input.open_path(path)?;
        Ok(Self::new(source, dictionary, config))
    }
}

impl<'d, S: ByteSource> Session<'d, S> {
    pub fn new(source: S, dictionary: &'d Dictionary, config: &DecoderConfig) -> Self {
        Self {
            frames: FrameSynchronizer::new(source),
            dictionary,
            config: config.clone(),
            previous: None,
            summary: SessionSummary::default(),
        }
    }

    /// Counters so far.
    pub fn summary(&self) -> &SessionSummary {
        &self.summary
    }

    /// Get the next record
    ///
    /// Returns:
    /// - `Ok(Some(record))` - Next well-formed message
    /// - `Ok(None)` - Input ended, cleanly or mid-frame
    /// - `Err(e)` - Reading the source failed
    ///
    /// Spurious bytes and malformed frames are reported to `sink` and skipped.
    pub fn next_record(&mut self, sink: &mut dyn DiagnosticSink) -> Result<Option<Record<'d>>> {
        loop {
            let Some(event) = self.frames.next() else {
                return Ok(None);
            };

            match event {
                Ok(SyncEvent::Spurious(bytes)) => {
                    self.summary.spurious_bytes += bytes.len();
                    sink.emit(None, Diagnostic::SpuriousBytes(bytes));
                }
                Ok(SyncEvent::Frame(frame)) => {
                    let index = self.summary.frames;
                    self.summary.frames += 1;

                    match Message::from_frame(&frame) {
                        Ok(message) => {
                            return Ok(Some(self.process_message(index, frame, message, sink)));
                        }
                        Err(error) => {
                            self.summary.malformed += 1;
                            sink.emit(
                                Some(index),
                                Diagnostic::MalformedFrame { error, frame: frame.into_bytes() },
                            );
                        }
                    }
                }
                Err(LinkError::IncompleteFrame { expected, got }) => {
                    self.summary.truncated = true;
                    sink.emit(Some(self.summary.frames), Diagnostic::IncompleteFrame { expected, got });
                    return Ok(None);
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Interpret one well-formed message.
    ///
    /// Checks request/reply alternation and the checksum, then decodes replies
    /// whose datapoint is in the dictionary.
    pub fn process_message(
        &mut self,
        index: usize,
        frame: Frame,
        message: Message,
        sink: &mut dyn DiagnosticSink,
    ) -> Record<'d> {
        let direction = message.direction;
        if let Some((previous_index, previous)) = self.previous.filter(|(_, d)| *d == direction) {
            self.summary.ordering_anomalies += 1;
            // Both messages of the pair carry the diagnostic
            for frame in [previous_index, index] {
                sink.emit(Some(frame), Diagnostic::UnexpectedOrdering { previous, current: direction });
            }
        }
        self.previous = Some((index, direction));

        match direction {
            Direction::Request => self.summary.requests += 1,
            Direction::Reply => self.summary.replies += 1,
        }

        let checksum = if self.config.verify_checksum {
            ChecksumCheck::of(&frame, self.config.checksum)
        } else {
            None
        };
        if let Some(check) = checksum.filter(|c| !c.is_valid()) {
            self.summary.checksum_mismatches += 1;
            sink.emit(
                Some(index),
                Diagnostic::ChecksumMismatch { declared: check.declared, computed: check.computed },
            );
        }

        let dictionary: &'d Dictionary = self.dictionary;
        let descriptor = dictionary.get(&message.datapoint_id);

        let outcome = match (direction, descriptor) {
            (Direction::Request, _) => Outcome::Request,
            (Direction::Reply, None) => {
                self.summary.unknown += 1;
                sink.emit(
                    Some(index),
                    Diagnostic::UnknownDatapoint { id: message.datapoint_id, data: message.data.clone() },
                );
                Outcome::Unknown
            }
            (Direction::Reply, Some(descriptor)) => match decode(&message.data, descriptor) {
                Ok(decoded) => {
                    self.summary.decoded += 1;
                    for diagnostic in decoded.diagnostics {
                        sink.emit(Some(index), diagnostic);
                    }
                    Outcome::Value(decoded.value)
                }
                Err(error) => {
                    self.summary.decode_failures += 1;
                    sink.emit(
                        Some(index),
                        Diagnostic::DecodeFailed { id: message.datapoint_id, error: error.clone() },
                    );
                    Outcome::Failed(error)
                }
            },
        };

        trace!(frame = index, id = %message.datapoint_id, ?outcome, "Processed message");
        Record { index, frame, message, checksum, descriptor, outcome }
    }

    /// Decode the whole capture, writing one report block per message to `out`.
    pub fn run<W: Write>(
        mut self,
        out: &mut W,
        sink: &mut dyn DiagnosticSink,
    ) -> Result<SessionSummary> {
        info!(
            datapoints = self.dictionary.len(),
            coverage = ?self.config.checksum,
            verify = self.config.verify_checksum,
            "Decoding session started"
        );

        while let Some(record) = self.next_record(sink)? {
            writeln!(out, "{}", render_record(&record))?;
            writeln!(out)?;
        }
        out.flush()?;

        if self.summary.truncated {
            debug!(frames = self.summary.frames, "Capture ended mid-frame");
        }
        let s = &self.summary;
        info!(
            frames = s.frames,
            requests = s.requests,
            replies = s.replies,
            decoded = s.decoded,
            unknown = s.unknown,
            malformed = s.malformed,
            checksum_mismatches = s.checksum_mismatches,
            spurious_bytes = s.spurious_bytes,
            "Decoding session ended"
        );
        Ok(self.summary)
    }
}
