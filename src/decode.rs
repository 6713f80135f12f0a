//! Value decode engine
//!
//! Dispatches a reply's data bytes on the descriptor's [`ValueType`]. The
//! dictionary only provides data (gain, unit, bounds, enum text); every
//! decoding rule lives here.
//!
//! Recoverable oddities (trailing bytes, oversized arrays, extra elements for
//! a scalar, non-ASCII strings) never fail the decode. They are returned as
//! [`Diagnostic`]s next to the value.

use chrono::DateTime;
use tracing::{debug, trace};

use crate::error::DecodeError;
use crate::types::{
    DecodedValue, Descriptor, Diagnostic, EnumValue, Number, Timestamp, ValueType,
};

/// 1984-01-01T00:00:00Z as Unix seconds, the `TimeOfDay` epoch.
pub const TIME_OF_DAY_EPOCH: i64 = 441_763_200;

const SECONDS_PER_DAY: i64 = 24 * 60 * 60;

/// A decoded value and the diagnostics raised while producing it.
#[derive(Debug, Clone, PartialEq)]
pub struct Decoded {
    pub value: DecodedValue,
    pub diagnostics: Vec<Diagnostic>,
}

/// Fixed-width little-endian integer element.
pub trait LeElement: Sized {
    const WIDTH: usize;

    /// Parse from exactly `WIDTH` bytes.
    fn from_le(bytes: &[u8]) -> Self;

    fn to_number(self) -> Number;
}

macro_rules! le_element {
    ($($ty:ty => $width:literal),* $(,)?) => {
        $(
            impl LeElement for $ty {
                const WIDTH: usize = $width;

                fn from_le(bytes: &[u8]) -> Self {
                    let mut buf = [0u8; $width];
                    buf.copy_from_slice(&bytes[..$width]);
                    <$ty>::from_le_bytes(buf)
                }

                fn to_number(self) -> Number {
                    Number::Int(i64::from(self))
                }
            }
        )*
    };
}

le_element!(u8 => 1, u16 => 2, u32 => 4, i8 => 1, i16 => 2, i32 => 4);

/// Decode every whole element of `data`.
///
/// Leftover bytes are reported, not fatal. Fails only when not even one
/// element fits.
pub fn decode_elements<T: LeElement>(
    data: &[u8],
    value_type: &ValueType,
    diagnostics: &mut Vec<Diagnostic>,
) -> Result<Vec<Number>, DecodeError> {
    let trailing = data.len() % T::WIDTH;
    if trailing != 0 {
        diagnostics.push(Diagnostic::TrailingBytes { value_type: value_type.clone(), count: trailing });
    }

    let elements: Vec<Number> =
        data.chunks_exact(T::WIDTH).map(|chunk| T::from_le(chunk).to_number()).collect();

    if elements.is_empty() {
        return Err(DecodeError::WrongSize {
            value_type: value_type.clone(),
            expected: T::WIDTH,
            got: data.len(),
        });
    }
    Ok(elements)
}

/// `TimeOfDay`: u32 milliseconds of day, then u16 days since 1984-01-01.
pub fn decode_time_of_day(data: &[u8]) -> Result<Timestamp, DecodeError> {
    if data.len() != 6 {
        return Err(DecodeError::WrongSize {
            value_type: ValueType::TimeOfDay,
            expected: 6,
            got: data.len(),
        });
    }

    let millis = u32::from_le_bytes([data[0], data[1], data[2], data[3]]);
    let days = u16::from_le_bytes([data[4], data[5]]);
    let epoch_seconds =
        TIME_OF_DAY_EPOCH + i64::from(millis / 1000) + i64::from(days) * SECONDS_PER_DAY;

    let iso8601 = DateTime::from_timestamp(epoch_seconds, 0)
        .map(|dt| dt.to_rfc3339())
        .unwrap_or_else(|| epoch_seconds.to_string());

    Ok(Timestamp { epoch_seconds, iso8601 })
}

/// `Enum`: one byte looked up in the descriptor's table; unknown members pass through.
pub fn decode_enum(
    data: &[u8],
    descriptor: &Descriptor,
    diagnostics: &mut Vec<Diagnostic>,
) -> Result<EnumValue, DecodeError> {
    let Some(&raw) = data.first() else {
        return Err(DecodeError::WrongSize { value_type: ValueType::Enum, expected: 1, got: 0 });
    };
    if data.len() > 1 {
        diagnostics.push(Diagnostic::ExtraElements { value_type: ValueType::Enum, count: data.len() });
    }

    let label = descriptor.enum_label(raw).map(str::to_string);
    if label.is_none() {
        trace!(raw, "Enum member has no label");
    }
    Ok(EnumValue { raw, label })
}

/// `VisibleString`: printable ASCII up to the first NUL.
///
/// The whole span must be ASCII, NUL padding included, and the text before
/// the NUL must be printable. Anything else yields the raw bytes plus a
/// diagnostic.
pub fn decode_visible_string(data: &[u8], diagnostics: &mut Vec<Diagnostic>) -> DecodedValue {
    let end = data.iter().position(|&b| b == 0).unwrap_or(data.len());
    let text = &data[..end];

    let invalid = text
        .iter()
        .position(|b| !(0x20..=0x7E).contains(b))
        .or_else(|| data.iter().position(|b| !b.is_ascii()));
    if let Some(offset) = invalid {
        diagnostics.push(Diagnostic::RawFallback {
            error: DecodeError::InvalidEncoding { offset, byte: data[offset] },
        });
        return DecodedValue::Raw(data.to_vec());
    }

    // Every byte is printable ASCII, so this conversion is lossless.
    DecodedValue::Text(String::from_utf8_lossy(text).into_owned())
}

fn decode_numeric<T: LeElement>(
    data: &[u8],
    descriptor: &Descriptor,
    diagnostics: &mut Vec<Diagnostic>,
) -> Result<DecodedValue, DecodeError> {
    let mut elements = decode_elements::<T>(data, &descriptor.value_type, diagnostics)?;

    if let Some(gain) = descriptor.gain {
        for element in elements.iter_mut() {
            *element = element.scaled(gain);
        }
    }

    if descriptor.is_array {
        let max_allowed = descriptor.max_elements();
        if elements.len() > max_allowed {
            diagnostics.push(Diagnostic::ArrayTooLarge { size: elements.len(), max_allowed });
        }
        return Ok(DecodedValue::Array(elements));
    }

    if elements.len() > 1 {
        diagnostics.push(Diagnostic::ExtraElements {
            value_type: descriptor.value_type.clone(),
            count: elements.len(),
        });
    }
    match elements.first() {
        Some(first) => Ok(DecodedValue::Number(*first)),
        None => Err(DecodeError::WrongSize {
            value_type: descriptor.value_type.clone(),
            expected: T::WIDTH,
            got: data.len(),
        }),
    }
}

/// Decode a reply's data span with its descriptor.
pub fn decode(data: &[u8], descriptor: &Descriptor) -> Result<Decoded, DecodeError> {
    let mut diagnostics = Vec::new();

    if descriptor.gain.is_some() && !descriptor.value_type.is_numeric() {
        debug!(value_type = %descriptor.value_type, "Gain ignored for non-numeric type");
    }

    let value = match &descriptor.value_type {
        ValueType::U8 => decode_numeric::<u8>(data, descriptor, &mut diagnostics)?,
        ValueType::U16 => decode_numeric::<u16>(data, descriptor, &mut diagnostics)?,
        ValueType::U32 => decode_numeric::<u32>(data, descriptor, &mut diagnostics)?,
        ValueType::I8 => decode_numeric::<i8>(data, descriptor, &mut diagnostics)?,
        ValueType::I16 => decode_numeric::<i16>(data, descriptor, &mut diagnostics)?,
        ValueType::I32 => decode_numeric::<i32>(data, descriptor, &mut diagnostics)?,
        ValueType::TimeOfDay => DecodedValue::Time(decode_time_of_day(data)?),
        ValueType::Enum => DecodedValue::Enum(decode_enum(data, descriptor, &mut diagnostics)?),
        ValueType::VisibleString => decode_visible_string(data, &mut diagnostics),
        ValueType::Unsupported(name) => {
            return Err(DecodeError::UnsupportedType { type_name: name.clone() });
        }
    };

    trace!(value_type = %descriptor.value_type, %value, "Decoded value");
    Ok(Decoded { value, diagnostics })
}
