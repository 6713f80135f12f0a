//! Object dictionary loading
//!
//! The dictionary is a JSON or YAML document mapping an uppercase 4-digit hex
//! datapoint id to its descriptor:
//!
//! ```json
//! {
//!   "3023": { "type": "U16", "desc": "Flow temperature", "unit": "°C", "gain": 0.1, "is_array": false },
//!   "2001": { "type": "Enum", "desc": "Burner state", "is_array": false,
//!             "values": { "0": { "description": "off" }, "1": { "description": "on" } } }
//! }
//! ```
//!
//! JSON is parsed through `serde_yaml_ng`, so both spellings load the same way.
//! Validation happens once here; decoding trusts the descriptors afterwards.

use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info, warn};

use crate::error::DictionaryError;
use crate::types::{DatapointId, Descriptor, Dictionary, EnumEntry, ValueType};

/// Descriptor exactly as written in the document, before validation.
#[derive(Debug, Deserialize)]
struct RawDescriptor {
    #[serde(rename = "type")]
    type_name: Option<String>,
    desc: Option<String>,
    unit: Option<String>,
    gain: Option<f64>,
    is_array: Option<bool>,
    max_array_size: Option<usize>,
    values: Option<BTreeMap<String, EnumEntry>>,
}

impl RawDescriptor {
    fn validate(self, key: &str, strict_types: bool) -> Result<Descriptor, DictionaryError> {
        let missing = |field| DictionaryError::MissingField { key: key.to_string(), field };

        let type_name = self.type_name.ok_or_else(|| missing("type"))?;
        let description = self.desc.ok_or_else(|| missing("desc"))?;
        let is_array = self.is_array.ok_or_else(|| missing("is_array"))?;

        let value_type = ValueType::from_tag(&type_name);
        if let ValueType::Unsupported(name) = &value_type {
            if strict_types {
                return Err(DictionaryError::UnknownType {
                    key: key.to_string(),
                    type_name: name.clone(),
                });
            }
            debug!(key, type_name = %name, "Datapoint keeps unsupported type");
        }

        if let Some(values) = &self.values {
            if value_type != ValueType::Enum {
                return Err(DictionaryError::EnumOnNonEnum { key: key.to_string(), value_type });
            }
            if let Some(bad) = values.keys().find(|k| k.trim().parse::<i64>().is_err()) {
                return Err(DictionaryError::InvalidEnumKey {
                    key: key.to_string(),
                    value: bad.clone(),
                });
            }
        }

        if self.max_array_size == Some(0) {
            return Err(DictionaryError::InvalidArraySize { key: key.to_string() });
        }

        Ok(Descriptor {
            value_type,
            description,
            unit: self.unit,
            gain: self.gain,
            is_array,
            max_array_size: self.max_array_size,
            enum_values: self.values,
        })
    }
}

impl Dictionary {
    /// Parse a dictionary document.
    ///
    /// With `strict_types`, a type tag outside the known set is an error;
    /// otherwise the entry is kept as [`ValueType::Unsupported`].
    pub fn parse(text: &str, strict_types: bool) -> Result<Self, DictionaryError> {
        let raw: BTreeMap<String, RawDescriptor> = serde_yaml_ng::from_str(text)
            .map_err(|e| DictionaryError::Syntax { details: e.to_string() })?;

        let mut entries = HashMap::with_capacity(raw.len());
        for (key, raw_descriptor) in raw {
            let id = DatapointId::parse(&key)
                .ok_or_else(|| DictionaryError::InvalidKey { key: key.clone() })?;
            let descriptor = raw_descriptor.validate(&key, strict_types)?;
            if entries.insert(id, descriptor).is_some() {
                warn!(id = %id, "Datapoint defined more than once; keeping the last entry");
            }
        }

        let dictionary = Dictionary::new(entries);
        let unsupported = dictionary
            .iter()
            .filter(|(_, d)| matches!(d.value_type, ValueType::Unsupported(_)))
            .count();
        info!(datapoints = dictionary.len(), unsupported, "Loaded object dictionary");
        Ok(dictionary)
    }

    /// Read and parse a dictionary document.
    pub fn from_reader<R: Read>(mut reader: R, strict_types: bool) -> Result<Self, DictionaryError> {
        let mut text = String::new();
        reader.read_to_string(&mut text).map_err(|e| DictionaryError::Syntax {
            details: format!("Failed to read dictionary text: {}", e),
        })?;
        Self::parse(&text, strict_types)
    }

    /// Load a dictionary file.
    pub fn load<P: AsRef<Path>>(path: P, strict_types: bool) -> Result<Self, DictionaryError> {
        let path = path.as_ref();
        let unreadable =
            |source| DictionaryError::Unreadable { path: path.to_path_buf(), source };

        let mut file = File::open(path).map_err(unreadable)?;
        let mut text = String::new();
        file.read_to_string(&mut text).map_err(unreadable)?;

        debug!(path = %path.display(), "Parsing object dictionary");
        Self::parse(&text, strict_types)
    }
}
