//! Vectors of 256-bit hashes, variable-length encoded as a whole.

use serde_json::Value;
use snafu::ensure;

use crate::error::{InvalidLengthSnafu, MalformedInputSnafu, Result};
use crate::serdes::BinaryParser;

const HASH_WIDTH: usize = 32;

pub(crate) fn encode(value: &Value) -> Result<Vec<u8>> {
    let Value::Array(entries) = value else {
        return MalformedInputSnafu {
            message: format!("expected array of hashes, got {value}"),
        }
        .fail();
    };
    let mut out = Vec::with_capacity(entries.len() * HASH_WIDTH);
    for entry in entries {
        out.extend_from_slice(&super::hash::encode(entry, "Vector256 entry", HASH_WIDTH)?);
    }
    Ok(out)
}

/// Decodes the delimited payload as a whole number of 256-bit hashes.
pub(crate) fn decode(parser: &mut BinaryParser<'_>) -> Result<Value> {
    ensure!(
        parser.remaining() % HASH_WIDTH == 0,
        InvalidLengthSnafu {
            what: "Vector256",
            expected: parser.remaining() / HASH_WIDTH * HASH_WIDTH,
            actual: parser.remaining(),
        }
    );
    let mut entries = Vec::with_capacity(parser.remaining() / HASH_WIDTH);
    while !parser.is_end() {
        entries.push(super::hash::decode(parser, HASH_WIDTH)?);
    }
    Ok(Value::Array(entries))
}
