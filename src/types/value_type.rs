//! Datapoint value type definitions

use serde::{Deserialize, Serialize};
use std::fmt;

/// Semantic value types a datapoint can declare in the object dictionary.
///
/// The set is closed: the dictionary only chooses among these and supplies
/// data (gain, unit, bounds, enum text) for them. `Unsupported` exists so a
/// lenient dictionary can keep entries whose type this decoder does not know.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValueType {
    /// 8-bit unsigned integer
    U8,
    /// 16-bit unsigned integer, little-endian
    U16,
    /// 32-bit unsigned integer, little-endian
    U32,
    /// 8-bit signed integer
    I8,
    /// 16-bit signed integer, little-endian
    I16,
    /// 32-bit signed integer, little-endian
    I32,
    /// Milliseconds of day (u32) followed by day count (u16) since 1984-01-01
    TimeOfDay,
    /// Single byte looked up in the descriptor's enum table
    Enum,
    /// NUL padded ASCII text
    VisibleString,
    /// Type name the decoder has no rule for
    Unsupported(String),
}

impl ValueType {
    /// Parse a dictionary type tag. Unknown tags map to `Unsupported`.
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "U8" => ValueType::U8,
            "U16" => ValueType::U16,
            "U32" => ValueType::U32,
            "I8" => ValueType::I8,
            "I16" => ValueType::I16,
            "I32" => ValueType::I32,
            "TimeOfDay" => ValueType::TimeOfDay,
            "Enum" => ValueType::Enum,
            "VisibleString" => ValueType::VisibleString,
            other => ValueType::Unsupported(other.to_string()),
        }
    }

    /// Dictionary spelling of this type.
    pub fn tag(&self) -> &str {
        match self {
            ValueType::U8 => "U8",
            ValueType::U16 => "U16",
            ValueType::U32 => "U32",
            ValueType::I8 => "I8",
            ValueType::I16 => "I16",
            ValueType::I32 => "I32",
            ValueType::TimeOfDay => "TimeOfDay",
            ValueType::Enum => "Enum",
            ValueType::VisibleString => "VisibleString",
            ValueType::Unsupported(name) => name,
        }
    }

    /// Width in bytes of one element, or `None` for variable-length types.
    pub const fn element_size(&self) -> Option<usize> {
        match self {
            ValueType::U8 | ValueType::I8 | ValueType::Enum => Some(1),
            ValueType::U16 | ValueType::I16 => Some(2),
            ValueType::U32 | ValueType::I32 => Some(4),
            ValueType::TimeOfDay => Some(6),
            ValueType::VisibleString | ValueType::Unsupported(_) => None,
        }
    }

    /// Whether gain scaling applies to values of this type.
    pub const fn is_numeric(&self) -> bool {
        matches!(
            self,
            ValueType::U8
                | ValueType::U16
                | ValueType::U32
                | ValueType::I8
                | ValueType::I16
                | ValueType::I32
        )
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tags_round_trip() {
        for tag in ["U8", "U16", "U32", "I8", "I16", "I32", "TimeOfDay", "Enum", "VisibleString"] {
            let value_type = ValueType::from_tag(tag);
            assert!(!matches!(value_type, ValueType::Unsupported(_)), "{tag}");
            assert_eq!(value_type.tag(), tag);
        }
    }

    #[test]
    fn unknown_tag_is_unsupported() {
        assert_eq!(ValueType::from_tag("Float"), ValueType::Unsupported("Float".into()));
        assert_eq!(ValueType::from_tag("u8"), ValueType::Unsupported("u8".into()));
    }

    #[test]
    fn element_sizes() {
        assert_eq!(ValueType::U8.element_size(), Some(1));
        assert_eq!(ValueType::I16.element_size(), Some(2));
        assert_eq!(ValueType::U32.element_size(), Some(4));
        assert_eq!(ValueType::TimeOfDay.element_size(), Some(6));
        assert_eq!(ValueType::VisibleString.element_size(), None);
        assert!(ValueType::I32.is_numeric());
        assert!(!ValueType::Enum.is_numeric());
    }
}
