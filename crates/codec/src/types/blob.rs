//! Opaque byte strings, hex in JSON, always variable-length encoded.

use serde_json::Value;

use crate::error::{MalformedInputSnafu, Result};
use crate::serdes::BinaryParser;

pub(crate) fn encode(value: &Value) -> Result<Vec<u8>> {
    let Value::String(hex_digits) = value else {
        return MalformedInputSnafu { message: format!("expected Blob hex string, got {value}") }
            .fail();
    };
    hex::decode(hex_digits).map_err(|_| {
        MalformedInputSnafu { message: format!("invalid Blob hex: {hex_digits:?}") }.build()
    })
}

/// Reads all bytes remaining in the delimited payload. The caller has
/// already consumed the variable-length prefix.
pub(crate) fn decode(parser: &mut BinaryParser<'_>) -> Result<Value> {
    let bytes = parser.read(parser.remaining())?;
    Ok(Value::from(hex::encode_upper(bytes)))
}
