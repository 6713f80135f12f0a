//! Frame synchronizer
//!
//! Turns a [`ByteSource`] into a lazy, single-pass sequence of frames. Bytes are
//! accumulated one at a time until the buffer ends with the `01 00` marker;
//! whatever preceded the marker is reported as spurious, then the header and
//! the declared payload are read. Scanning restarts from an empty buffer after
//! each frame, so marker bytes inside a payload are never seen by the scanner.
//!
//! ## Usage Example
//!
//! ```rust
//! use heatlink::{BinarySource, FrameSynchronizer, SyncEvent};
//!
//! fn count_frames() -> heatlink::Result<usize> {
//!     let capture: &[u8] = &[0xFF, 0x01, 0x00, 0x00, 0x00, 0x05, 0xAA, 0xBB, 0xCC, 0x30, 0x23, 0x00, 0x01, 0x02];
//!     let mut frames = 0;
//!     for event in FrameSynchronizer::new(BinarySource::new(capture)) {
//!         match event? {
//!             SyncEvent::Frame(frame) => {
//!                 println!("frame of {} bytes", frame.len());
//!                 frames += 1;
//!             }
//!             SyncEvent::Spurious(bytes) => println!("skipped {} bytes", bytes.len()),
//!         }
//!     }
//!     Ok(frames)
//! }
//! # assert_eq!(count_frames().unwrap(), 1);
//! ```

use tracing::{debug, trace};

use crate::source::ByteSource;
use crate::types::Frame;
use crate::{LinkError, Result};

/// Item produced by the synchronizer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncEvent {
    /// Bytes that belong to no frame, in arrival order
    Spurious(Vec<u8>),
    /// A complete frame
    Frame(Frame),
}

/// Lazy frame iterator over a byte source.
///
/// Yields `Err(LinkError::IncompleteFrame { .. })` once if the input ends inside
/// a frame, and `Err(LinkError::Io(..))` if the source fails; both end the
/// sequence.
pub struct FrameSynchronizer<S> {
    source: S,
    buffer: Vec<u8>,
    marker_pending: bool,
    exhausted: bool,
    frames_read: usize,
    bytes_read: usize,
}

impl<S: ByteSource> FrameSynchronizer<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            buffer: Vec::new(),
            marker_pending: false,
            exhausted: false,
            frames_read: 0,
            bytes_read: 0,
        }
    }

    /// Number of complete frames produced so far.
    pub fn frames_read(&self) -> usize {
        self.frames_read
    }

    /// Number of bytes consumed from the source so far.
    pub fn bytes_read(&self) -> usize {
        self.bytes_read
    }

    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    fn next_byte(&mut self) -> std::io::Result<Option<u8>> {
        let byte = self.source.read_byte()?;
        if byte.is_some() {
            self.bytes_read += 1;
        }
        Ok(byte)
    }

    /// Append exactly `count` bytes to `frame`, or report the truncation.
    fn read_into(&mut self, frame: &mut Vec<u8>, count: usize, expected: usize) -> Result<()> {
        for _ in 0..count {
            match self.next_byte()? {
                Some(byte) => frame.push(byte),
                None => return Err(LinkError::incomplete_frame(expected, frame.len())),
            }
        }
        Ok(())
    }

    /// Read the rest of a frame whose marker has just been consumed.
    fn read_frame(&mut self) -> Result<Frame> {
        let mut bytes = Vec::with_capacity(Frame::HEADER_SIZE);
        bytes.extend_from_slice(&Frame::MARKER);

        // direction, flags, length
        self.read_into(&mut bytes, 3, Frame::HEADER_SIZE)?;
        let length = bytes[4] as usize;
        let expected = Frame::HEADER_SIZE + length;
        bytes.reserve(3 + length);

        // type code + payload
        self.read_into(&mut bytes, 3 + length, expected)?;

        let frame = Frame::from_bytes(bytes)?;
        self.frames_read += 1;
        debug!(
            frame = self.frames_read - 1,
            direction = frame.direction(),
            length,
            "Synchronized frame"
        );
        Ok(frame)
    }

    fn finish_with<T>(&mut self, result: Result<T>) -> Result<T> {
        if result.is_err() {
            self.exhausted = true;
        }
        result
    }
}

impl<S: ByteSource> Iterator for FrameSynchronizer<S> {
    type Item = Result<SyncEvent>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.exhausted {
            return None;
        }

        if self.marker_pending {
            self.marker_pending = false;
            let result = self.read_frame();
            return Some(self.finish_with(result).map(SyncEvent::Frame));
        }

        loop {
            let byte = match self.next_byte() {
                Ok(Some(byte)) => byte,
                Ok(None) => {
                    self.exhausted = true;
                    if self.buffer.is_empty() {
                        debug!(frames = self.frames_read, "End of input at frame boundary");
                        return None;
                    }
                    trace!(bytes = self.buffer.len(), "Unsynchronized bytes at end of input");
                    return Some(Ok(SyncEvent::Spurious(std::mem::take(&mut self.buffer))));
                }
                Err(e) => {
                    self.exhausted = true;
                    return Some(Err(e.into()));
                }
            };

            self.buffer.push(byte);
            if !self.buffer.ends_with(&Frame::MARKER) {
                continue;
            }

            self.buffer.truncate(self.buffer.len() - Frame::MARKER.len());
            trace!(offset = self.bytes_read - Frame::MARKER.len(), "Marker found");

            if !self.buffer.is_empty() {
                self.marker_pending = true;
                return Some(Ok(SyncEvent::Spurious(std::mem::take(&mut self.buffer))));
            }

            let result = self.read_frame();
            return Some(self.finish_with(result).map(SyncEvent::Frame));
        }
    }
}

impl<S: ByteSource> std::iter::FusedIterator for FrameSynchronizer<S> {}
