//! Fixed-width hashes (128, 160, and 256 bits), hex in JSON.

use serde_json::Value;
use snafu::ensure;

use crate::error::{InvalidLengthSnafu, MalformedInputSnafu, Result};
use crate::serdes::BinaryParser;

pub(crate) fn encode(value: &Value, what: &'static str, width: usize) -> Result<Vec<u8>> {
    let Value::String(hex_digits) = value else {
        return MalformedInputSnafu { message: format!("expected {what} hex string, got {value}") }
            .fail();
    };
    let bytes = hex::decode(hex_digits).map_err(|_| {
        MalformedInputSnafu { message: format!("invalid {what} hex: {hex_digits:?}") }.build()
    })?;
    ensure!(
        bytes.len() == width,
        InvalidLengthSnafu { what, expected: width, actual: bytes.len() }
    );
    Ok(bytes)
}

pub(crate) fn decode(parser: &mut BinaryParser<'_>, width: usize) -> Result<Value> {
    let bytes = parser.read(width)?;
    Ok(Value::from(hex::encode_upper(bytes)))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_width_is_enforced() {
        let h256 = "00".repeat(32);
        assert_eq!(encode(&json!(h256), "Hash256", 32).unwrap(), vec![0u8; 32]);
        assert!(encode(&json!(h256), "Hash160", 20).is_err());
        assert!(encode(&json!("zz"), "Hash128", 16).is_err());
        assert!(encode(&json!(7), "Hash128", 16).is_err());
    }

    #[test]
    fn test_decode_uppercases() {
        let mut parser = BinaryParser::new(&[0xAB, 0xCD, 0xEF, 0x01]);
        // Width 4 never occurs on the wire but exercises the cursor.
        assert_eq!(decode(&mut parser, 4).unwrap(), json!("ABCDEF01"));
        assert!(parser.is_end());
    }
}
