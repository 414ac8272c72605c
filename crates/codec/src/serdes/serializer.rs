//! Canonical byte sink.
//!
//! Field payloads are appended in canonical field order by the codec
//! orchestration; this module owns the two wire-format details that
//! apply uniformly to every field: the compact field-ID tag and the
//! variable-length prefix scheme.

use crate::definitions::FieldInstance;
use crate::error::{Result, VariableLengthOverflowSnafu};
use snafu::ensure;

/// Longest payload expressible by the three-byte length prefix.
/// 12481 + (254 - 241) * 65536 + 65535.
const MAX_VL_LENGTH: usize = 918_744;

/// Breakpoints of the variable-length prefix scheme.
const VL_ONE_BYTE_MAX: usize = 192;
const VL_TWO_BYTE_MAX: usize = 12_480;

/// Encodes a payload length as a 1-, 2-, or 3-byte prefix.
///
/// - `length <= 192`: one byte holding the length itself.
/// - `193..=12480`: two bytes; `193 + ((length - 193) >> 8)` then the
///   low byte of `length - 193`.
/// - `12481..=918744`: three bytes; `241 + ((length - 12481) >> 16)`
///   then the remaining 16 bits big-endian.
///
/// # Errors
///
/// Returns `VariableLengthOverflow` for lengths above 918744.
pub fn encode_variable_length(length: usize) -> Result<Vec<u8>> {
    ensure!(length <= MAX_VL_LENGTH, VariableLengthOverflowSnafu { length });

    if length <= VL_ONE_BYTE_MAX {
        Ok(vec![length as u8])
    } else if length <= VL_TWO_BYTE_MAX {
        let rem = length - (VL_ONE_BYTE_MAX + 1);
        Ok(vec![193 + (rem >> 8) as u8, (rem & 0xFF) as u8])
    } else {
        let rem = length - (VL_TWO_BYTE_MAX + 1);
        Ok(vec![241 + (rem >> 16) as u8, ((rem >> 8) & 0xFF) as u8, (rem & 0xFF) as u8])
    }
}

/// Encodes a `(type_code, field_code)` pair as a compact field-ID tag.
///
/// Codes below 16 pack into a single byte (high nibble = type, low
/// nibble = field); a code of 16 or above leaves a zero nibble and is
/// appended as a full byte, type first.
pub(crate) fn field_header(type_code: i32, field_code: u8) -> Vec<u8> {
    debug_assert!((1..=255).contains(&type_code));
    debug_assert!(field_code >= 1);

    let type_code = type_code as u8;
    match (type_code < 16, field_code < 16) {
        (true, true) => vec![(type_code << 4) | field_code],
        (true, false) => vec![type_code << 4, field_code],
        (false, true) => vec![field_code, type_code],
        (false, false) => vec![0, type_code, field_code],
    }
}

/// Accumulates the canonical byte stream during encode.
#[derive(Debug, Default)]
pub struct BinarySerializer {
    buf: Vec<u8>,
}

impl BinarySerializer {
    /// Creates an empty serializer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends raw bytes verbatim.
    pub fn put(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    /// Appends a variable-length prefix followed by the payload.
    ///
    /// # Errors
    ///
    /// Returns `VariableLengthOverflow` if the payload exceeds the
    /// three-byte prefix maximum.
    pub fn put_vl(&mut self, bytes: &[u8]) -> Result<()> {
        let prefix = encode_variable_length(bytes.len())?;
        self.buf.extend_from_slice(&prefix);
        self.buf.extend_from_slice(bytes);
        Ok(())
    }

    /// Appends the field-ID tag for `field`.
    pub(crate) fn put_field_header(&mut self, field: &FieldInstance) {
        let header = field_header(field.type_code, field.field_code);
        self.buf.extend_from_slice(&header);
    }

    /// Appends a field's tag and payload, inserting the VL prefix when
    /// the field is variable-length.
    ///
    /// # Errors
    ///
    /// Returns `VariableLengthOverflow` for oversized VL payloads.
    pub(crate) fn put_field(&mut self, field: &FieldInstance, payload: &[u8]) -> Result<()> {
        self.put_field_header(field);
        if field.is_vl_encoded {
            self.put_vl(payload)
        } else {
            self.put(payload);
            Ok(())
        }
    }

    /// Consumes the serializer and returns the accumulated bytes.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    /// Current length of the accumulated stream.
    #[must_use]
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Whether nothing has been written yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::error::CodecError;

    #[test]
    fn test_vl_one_byte_region() {
        assert_eq!(encode_variable_length(0).unwrap(), vec![0]);
        assert_eq!(encode_variable_length(1).unwrap(), vec![1]);
        assert_eq!(encode_variable_length(192).unwrap(), vec![192]);
    }

    #[test]
    fn test_vl_two_byte_region() {
        assert_eq!(encode_variable_length(193).unwrap(), vec![193, 0]);
        assert_eq!(encode_variable_length(194).unwrap(), vec![193, 1]);
        assert_eq!(encode_variable_length(12480).unwrap(), vec![240, 255]);
    }

    #[test]
    fn test_vl_three_byte_region() {
        assert_eq!(encode_variable_length(12481).unwrap(), vec![241, 0, 0]);
        assert_eq!(encode_variable_length(918_744).unwrap(), vec![254, 255, 255]);
    }

    #[test]
    fn test_vl_overflow() {
        let err = encode_variable_length(918_745).unwrap_err();
        assert!(matches!(err, CodecError::VariableLengthOverflow { length: 918_745 }));
    }

    #[test]
    fn test_field_header_packing() {
        // Both codes below 16: single packed byte.
        assert_eq!(field_header(1, 2), vec![0x12]);
        assert_eq!(field_header(8, 1), vec![0x81]);
        // Field code escapes to a full byte.
        assert_eq!(field_header(2, 39), vec![0x20, 39]);
        // Type code escapes to a full byte.
        assert_eq!(field_header(16, 1), vec![0x01, 16]);
        // Both escape, type first.
        assert_eq!(field_header(17, 100), vec![0x00, 17, 100]);
    }

    #[test]
    fn test_put_vl_prefixes_payload() {
        let mut ser = BinarySerializer::new();
        ser.put_vl(&[0xAB; 3]).unwrap();
        assert_eq!(ser.into_bytes(), vec![3, 0xAB, 0xAB, 0xAB]);
    }
}
