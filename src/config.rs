//! Decoder configuration

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

use crate::checksum::ChecksumCoverage;
use crate::source::InputFormat;
use crate::{LinkError, Result};

/// Knobs for a decode session.
///
/// Every field has a default, so a YAML document only needs the keys it
/// overrides:
///
/// ```yaml
/// checksum: from_marker
/// input: hex
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DecoderConfig {
    /// Bytes covered by the frame checksum
    pub checksum: ChecksumCoverage,
    /// Recompute the checksum and flag mismatches
    pub verify_checksum: bool,
    /// Encoding of the capture
    pub input: InputFormat,
    /// Reject dictionary entries with unknown type tags
    pub strict_types: bool,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            checksum: ChecksumCoverage::default(),
            verify_checksum: true,
            input: InputFormat::default(),
            strict_types: true,
        }
    }
}

impl DecoderConfig {
    pub fn from_yaml_str(text: &str) -> Result<Self> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml_ng::from_str(text)
            .map_err(|e| LinkError::config(e.to_string()))
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| LinkError::file_error(path.to_path_buf(), e))?;
        let config = Self::from_yaml_str(&text)?;
        debug!(path = %path.display(), ?config, "Loaded decoder configuration");
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = DecoderConfig::default();
        assert_eq!(config.checksum, ChecksumCoverage::Payload);
        assert!(config.verify_checksum);
        assert_eq!(config.input, InputFormat::Binary);
        assert!(config.strict_types);
        assert_eq!(DecoderConfig::from_yaml_str("").unwrap(), config);
    }

    #[test]
    fn partial_override() {
        let config = DecoderConfig::from_yaml_str("checksum: from_marker\ninput: hex\n").unwrap();
        assert_eq!(config.checksum, ChecksumCoverage::FromMarker);
        assert_eq!(config.input, InputFormat::Hex);
        assert!(config.verify_checksum);
        assert!(config.strict_types);
    }

    #[test]
    fn unknown_key_is_config_error() {
        let err = DecoderConfig::from_yaml_str("chksum: payload\n").unwrap_err();
        assert!(matches!(err, LinkError::Config { .. }));
        assert!(!err.recovery_suggestions().is_empty());
    }

    #[test]
    fn missing_file_is_file_error() {
        let err = DecoderConfig::load("/nonexistent/heatlink.yaml").unwrap_err();
        assert!(matches!(err, LinkError::File { .. }));
    }
}
