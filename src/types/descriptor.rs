//! Datapoint descriptors and the object dictionary

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

use super::{DatapointId, ValueType};

/// Label attached to one enum member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumEntry {
    pub description: String,
}

/// Externally supplied metadata for one datapoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Descriptor {
    /// Semantic type the reply data is decoded as
    pub value_type: ValueType,
    /// Human-readable description
    pub description: String,
    /// Engineering unit (e.g. "°C", "bar", "h")
    pub unit: Option<String>,
    /// Multiplicative scale applied to numeric elements
    pub gain: Option<f64>,
    /// Whether several elements are expected
    pub is_array: bool,
    /// Upper bound on element count for arrays; 1 when absent
    pub max_array_size: Option<usize>,
    /// Enum labels keyed by the member's decimal spelling; only for `Enum`
    pub enum_values: Option<BTreeMap<String, EnumEntry>>,
}

impl Descriptor {
    /// Create a scalar descriptor with no unit, gain or enum table.
    pub fn new(value_type: ValueType, description: impl Into<String>) -> Self {
        Self {
            value_type,
            description: description.into(),
            unit: None,
            gain: None,
            is_array: false,
            max_array_size: None,
            enum_values: None,
        }
    }

    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = Some(unit.into());
        self
    }

    pub fn with_gain(mut self, gain: f64) -> Self {
        self.gain = Some(gain);
        self
    }

    pub fn with_array(mut self, max_array_size: Option<usize>) -> Self {
        self.is_array = true;
        self.max_array_size = max_array_size;
        self
    }

    pub fn with_enum_values<I, K, V>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.enum_values = Some(
            values
                .into_iter()
                .map(|(k, v)| (k.into(), EnumEntry { description: v.into() }))
                .collect(),
        );
        self
    }

    /// Allowed element count for array datapoints.
    pub fn max_elements(&self) -> usize {
        self.max_array_size.unwrap_or(1)
    }

    /// Dictionary label for an enum member.
    pub fn enum_label(&self, raw: u8) -> Option<&str> {
        self.enum_values
            .as_ref()?
            .get(&raw.to_string())
            .map(|entry| entry.description.as_str())
    }
}

/// The object dictionary: datapoint id to descriptor.
///
/// Built once at startup and shared read-only with every component that
/// decodes values.
#[derive(Debug, Clone, Default)]
pub struct Dictionary {
    entries: HashMap<DatapointId, Descriptor>,
}

impl Dictionary {
    pub fn new(entries: HashMap<DatapointId, Descriptor>) -> Self {
        Self { entries }
    }

    /// Look up a datapoint. `None` marks an unmodeled datapoint, not an error.
    pub fn get(&self, id: &DatapointId) -> Option<&Descriptor> {
        self.entries.get(id)
    }

    pub fn contains(&self, id: &DatapointId) -> bool {
        self.entries.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&DatapointId, &Descriptor)> {
        self.entries.iter()
    }
}

impl FromIterator<(DatapointId, Descriptor)> for Dictionary {
    fn from_iter<T: IntoIterator<Item = (DatapointId, Descriptor)>>(iter: T) -> Self {
        Self { entries: iter.into_iter().collect() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enum_label_lookup_uses_decimal_spelling() {
        let descriptor = Descriptor::new(ValueType::Enum, "Burner state")
            .with_enum_values([("0", "off"), ("1", "on")]);

        assert_eq!(descriptor.enum_label(0), Some("off"));
        assert_eq!(descriptor.enum_label(1), Some("on"));
        assert_eq!(descriptor.enum_label(2), None);
    }

    #[test]
    fn max_elements_defaults_to_one() {
        let scalar = Descriptor::new(ValueType::U8, "x").with_array(None);
        assert_eq!(scalar.max_elements(), 1);
        let array = Descriptor::new(ValueType::U8, "x").with_array(Some(4));
        assert_eq!(array.max_elements(), 4);
    }

    #[test]
    fn dictionary_lookup() {
        let dictionary: Dictionary = [(
            DatapointId([0x30, 0x23]),
            Descriptor::new(ValueType::U16, "Flow temperature").with_unit("°C"),
        )]
        .into_iter()
        .collect();

        assert_eq!(dictionary.len(), 1);
        assert!(dictionary.contains(&DatapointId([0x30, 0x23])));
        assert!(dictionary.get(&DatapointId([0x00, 0x01])).is_none());
    }
}
