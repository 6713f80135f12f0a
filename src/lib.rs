//! Decoder for the serial request/reply link of a heating controller.
//!
//! heatlink turns a captured byte stream into a line-oriented report of
//! decoded datapoints, with every anomaly sent to a separate diagnostic
//! channel.
//!
//! # Features
//!
//! - **Frame synchronization**: marker scan with spurious byte reporting
//! - **Checksums**: Modbus CRC-16 with selectable coverage
//! - **Object dictionary**: JSON or YAML descriptors, validated at load time
//! - **Typed decoding**: integers, arrays, enums, time of day and strings
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use heatlink::{DecoderConfig, HeatLink, TracingSink};
//!
//! fn main() -> heatlink::Result<()> {
//!     heatlink::logging::init();
//!
//!     let config = DecoderConfig::load("heatlink.yaml")?;
//!     let link = HeatLink::load("object-dictionary.json", config)?;
//!
//!     let session = link.open("capture.bin")?;
//!     let summary = session.run(&mut std::io::stdout().lock(), &mut TracingSink)?;
//!     eprintln!("{} frames, {} decoded", summary.frames, summary.decoded);
//!     Ok(())
//! }
//! ```

// Core types and error handling
mod error;
#[cfg_attr(any(test, feature = "benchmark"), path = "test_utils.rs")]
#[cfg(any(test, feature = "benchmark"))]
pub mod test_utils;
pub mod types;

// Codec
pub mod checksum;
pub mod decode;
pub mod dictionary;
pub mod source;
pub mod sync;

// Session and output
pub mod config;
pub mod logging;
pub mod report;
pub mod session;

// Core exports
pub use error::*;
pub use types::*;

pub use checksum::{ChecksumCheck, ChecksumCoverage, checksum16};
pub use config::DecoderConfig;
pub use decode::{Decoded, decode};
pub use session::{Outcome, Record, Session, SessionSummary};
pub use source::{BinarySource, ByteSource, HexSource, InputFormat};
pub use sync::{FrameSynchronizer, SyncEvent};

use std::path::Path;

/// Loaded dictionary plus configuration, the entry point for decoding captures.
///
/// # Examples
///
/// ```rust
/// use heatlink::{BinarySource, DecoderConfig, Dictionary, HeatLink};
///
/// let link = HeatLink::new(Dictionary::default(), DecoderConfig::default());
/// let capture: &[u8] = &[0x01, 0x00, 0x00, 0x00, 0x05, 0xAA, 0xBB, 0xCC, 0x30, 0x23, 0x00, 0x01, 0x02];
///
/// let mut report: Vec<u8> = Vec::new();
/// let mut diagnostics: Vec<heatlink::AttributedDiagnostic> = Vec::new();
/// let summary = link.session(BinarySource::new(capture)).run(&mut report, &mut diagnostics)?;
/// assert_eq!(summary.requests, 1);
/// # Ok::<(), heatlink::LinkError>(())
/// ```
#[derive(Debug, Clone)]
pub struct HeatLink {
    dictionary: Dictionary,
    config: DecoderConfig,
}

impl HeatLink {
    pub fn new(dictionary: Dictionary, config: DecoderConfig) -> Self {
        Self { dictionary, config }
    }

    /// Load the object dictionary from a file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or any descriptor is
    /// invalid. Unknown type tags are rejected when `config.strict_types` is
    /// set.
    pub fn load<P: AsRef<Path>>(dictionary_path: P, config: DecoderConfig) -> Result<Self> {
        let dictionary = Dictionary::load(dictionary_path, config.strict_types)?;
        Ok(Self::new(dictionary, config))
    }

    pub fn dictionary(&self) -> &Dictionary {
        &self.dictionary
    }

    pub fn config(&self) -> &DecoderConfig {
        &self.config
    }

    /// Start a session over any byte source.
    pub fn session<S: ByteSource>(&self, source: S) -> Session<'_, S> {
        Session::new(source, &self.dictionary, &self.config)
    }

    /// Start a session over a capture file, read in the configured input format.
    pub fn open<P: AsRef<Path>>(&self, capture: P) -> Result<Session<'_, Box<dyn ByteSource>>> {
        Session::open(capture, &self.dictionary, &self.config)
    }
}
