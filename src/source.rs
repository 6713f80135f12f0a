//! Byte sources feeding the frame synchronizer

use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, ErrorKind, Read};
use std::path::Path;
use tracing::trace;

use crate::{LinkError, Result};

/// Single-byte reader over captured link traffic.
///
/// Sources may block inside `read_byte`; end-of-input is reported as
/// `Ok(None)` and is final.
pub trait ByteSource {
    /// Get the next byte
    ///
    /// Returns:
    /// - `Ok(Some(byte))` - Next byte of the capture
    /// - `Ok(None)` - Input ended
    /// - `Err(e)` - The underlying reader failed
    fn read_byte(&mut self) -> std::io::Result<Option<u8>>;
}

impl<S: ByteSource + ?Sized> ByteSource for Box<S> {
    fn read_byte(&mut self) -> std::io::Result<Option<u8>> {
        (**self).read_byte()
    }
}

/// Raw binary capture.
pub struct BinarySource<R> {
    reader: BufReader<R>,
}

impl<R: Read> BinarySource<R> {
    pub fn new(reader: R) -> Self {
        Self { reader: BufReader::new(reader) }
    }
}

impl<R: Read> ByteSource for BinarySource<R> {
    fn read_byte(&mut self) -> std::io::Result<Option<u8>> {
        read_one(&mut self.reader)
    }
}

/// Hex text capture; every character that is not a hex digit is skipped.
///
/// A lone nibble at end of input counts as end of input.
pub struct HexSource<R> {
    reader: BufReader<R>,
}

impl<R: Read> HexSource<R> {
    pub fn new(reader: R) -> Self {
        Self { reader: BufReader::new(reader) }
    }

    fn next_nibble(&mut self) -> std::io::Result<Option<u8>> {
        loop {
            let Some(ch) = read_one(&mut self.reader)? else {
                return Ok(None);
            };
            if let Some(nibble) = (ch as char).to_digit(16) {
                return Ok(Some(nibble as u8));
            }
        }
    }
}

impl<R: Read> ByteSource for HexSource<R> {
    fn read_byte(&mut self) -> std::io::Result<Option<u8>> {
        let Some(high) = self.next_nibble()? else {
            return Ok(None);
        };
        let Some(low) = self.next_nibble()? else {
            trace!(nibble = high, "Dangling hex nibble at end of input");
            return Ok(None);
        };
        Ok(Some((high << 4) | low))
    }
}

fn read_one<R: Read>(reader: &mut R) -> std::io::Result<Option<u8>> {
    let mut buf = [0u8; 1];
    loop {
        match reader.read(&mut buf) {
            Ok(0) => return Ok(None),
            Ok(_) => return Ok(Some(buf[0])),
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
}

/// How a capture encodes its bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputFormat {
    #[default]
    Binary,
    Hex,
}

impl InputFormat {
    /// Wrap a reader in the matching byte source.
    pub fn open<R: Read + 'static>(self, reader: R) -> Box<dyn ByteSource> {
        match self {
            InputFormat::Binary => Box::new(BinarySource::new(reader)),
            InputFormat::Hex => Box::new(HexSource::new(reader)),
        }
    }

    /// Open a capture file in this format.
    pub fn open_path<P: AsRef<Path>>(self, path: P) -> Result<Box<dyn ByteSource>> {
        let file = File::open(&path)
            .map_err(|e| LinkError::file_error(path.as_ref().to_path_buf(), e))?;
        Ok(self.open(file))
    }
}
