//! Cursor over a canonical byte stream.

use snafu::ensure;

use crate::error::{MalformedInputSnafu, Result};

/// Reads a canonical byte stream front to back.
///
/// Every read checks the remaining length first; a truncated stream
/// surfaces as `MalformedInput` at the exact read that ran dry.
#[derive(Debug)]
pub struct BinaryParser<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> BinaryParser<'a> {
    /// Creates a parser over `bytes`.
    #[must_use]
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    /// Number of unread bytes.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.bytes.len() - self.pos
    }

    /// Whether the stream is fully consumed.
    #[must_use]
    pub fn is_end(&self) -> bool {
        self.pos == self.bytes.len()
    }

    /// Reads exactly `n` bytes.
    ///
    /// # Errors
    ///
    /// Returns `MalformedInput` if fewer than `n` bytes remain.
    pub fn read(&mut self, n: usize) -> Result<&'a [u8]> {
        ensure!(
            self.remaining() >= n,
            MalformedInputSnafu {
                message: format!("unexpected end of input: wanted {n} bytes, {} remain", self.remaining()),
            }
        );
        let slice = &self.bytes[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    /// Reads a single byte.
    ///
    /// # Errors
    ///
    /// Returns `MalformedInput` at end of input.
    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.read(1)?[0])
    }

    /// Reads a field-ID tag and returns `(type_code, field_code)`.
    ///
    /// Inverse of the encoder's packing: a zero high nibble means the
    /// type code follows as a full byte, a zero low nibble means the
    /// field code does, type byte first when both escape.
    ///
    /// # Errors
    ///
    /// Returns `MalformedInput` on truncation or on an escaped byte
    /// below 16 (which would make the tag ambiguous).
    pub fn read_field_header(&mut self) -> Result<(i32, u8)> {
        let first = self.read_u8()?;
        let mut type_code = i32::from(first >> 4);
        let mut field_code = first & 0x0F;

        if type_code == 0 {
            type_code = i32::from(self.read_u8()?);
            ensure!(
                type_code >= 16,
                MalformedInputSnafu { message: format!("escaped type code {type_code} below 16") }
            );
        }
        if field_code == 0 {
            field_code = self.read_u8()?;
            ensure!(
                field_code >= 16,
                MalformedInputSnafu { message: format!("escaped field code {field_code} below 16") }
            );
        }
        Ok((type_code, field_code))
    }

    /// Reads a variable-length prefix and returns the payload length.
    ///
    /// # Errors
    ///
    /// Returns `MalformedInput` on truncation or a 255 lead byte,
    /// which no valid length produces.
    pub fn read_variable_length(&mut self) -> Result<usize> {
        let first = usize::from(self.read_u8()?);
        if first <= 192 {
            Ok(first)
        } else if first <= 240 {
            let second = usize::from(self.read_u8()?);
            Ok(193 + ((first - 193) << 8) + second)
        } else if first <= 254 {
            let second = usize::from(self.read_u8()?);
            let third = usize::from(self.read_u8()?);
            Ok(12_481 + ((first - 241) << 16) + (second << 8) + third)
        } else {
            MalformedInputSnafu { message: "invalid variable-length prefix byte 255".to_string() }
                .fail()
        }
    }

    /// Reads a variable-length prefix followed by that many bytes.
    ///
    /// # Errors
    ///
    /// Returns `MalformedInput` on truncation or an invalid prefix.
    pub fn read_vl_bytes(&mut self) -> Result<&'a [u8]> {
        let length = self.read_variable_length()?;
        self.read(length)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::serdes::encode_variable_length;

    #[test]
    fn test_read_past_end() {
        let mut parser = BinaryParser::new(&[1, 2]);
        assert!(parser.read(3).is_err());
        // Failed reads consume nothing.
        assert_eq!(parser.read(2).unwrap(), &[1, 2]);
        assert!(parser.is_end());
    }

    #[test]
    fn test_field_header_roundtrip() {
        for &(type_code, field_code) in
            &[(1, 2), (8, 1), (15, 15), (2, 39), (16, 1), (17, 100), (255, 255)]
        {
            let header = super::super::serializer::field_header(type_code, field_code);
            let mut parser = BinaryParser::new(&header);
            assert_eq!(parser.read_field_header().unwrap(), (type_code, field_code));
            assert!(parser.is_end());
        }
    }

    #[test]
    fn test_variable_length_roundtrip_boundaries() {
        for length in [0usize, 1, 192, 193, 12_480, 12_481, 918_744] {
            let prefix = encode_variable_length(length).unwrap();
            let mut parser = BinaryParser::new(&prefix);
            assert_eq!(parser.read_variable_length().unwrap(), length, "length {length}");
            assert!(parser.is_end());
        }
    }

    #[test]
    fn test_invalid_vl_lead_byte() {
        let mut parser = BinaryParser::new(&[255, 0, 0]);
        assert!(parser.read_variable_length().is_err());
    }

    #[test]
    fn test_ambiguous_escaped_codes_rejected() {
        // 0x01 in the escaped type byte should have been packed.
        let mut parser = BinaryParser::new(&[0x05, 0x01]);
        assert!(parser.read_field_header().is_err());
    }
}
