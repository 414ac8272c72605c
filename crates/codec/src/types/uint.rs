//! Fixed-width unsigned integers, big-endian.
//!
//! `UInt8`/`UInt16`/`UInt32` travel as JSON numbers. `UInt64` travels
//! as a 16-hex-digit string because its full range exceeds what JSON
//! consumers can hold in a double; a JSON number is also accepted on
//! encode. The `TransactionType` and `LedgerEntryType` fields
//! additionally accept registry names and decode back to them.

use serde_json::Value;
use snafu::OptionExt;

use crate::definitions::{Definitions, FieldInstance};
use crate::error::{MalformedInputSnafu, Result};
use crate::serdes::BinaryParser;

fn expect_uint(value: &Value, width: &'static str, max: u64) -> Result<u64> {
    let n = value
        .as_u64()
        .with_context(|| MalformedInputSnafu { message: format!("expected {width}, got {value}") })?;
    if n > max {
        return MalformedInputSnafu { message: format!("{n} does not fit in {width}") }.fail();
    }
    Ok(n)
}

pub(crate) fn encode_u8(value: &Value) -> Result<Vec<u8>> {
    Ok(vec![expect_uint(value, "UInt8", u64::from(u8::MAX))? as u8])
}

pub(crate) fn encode_u16(
    field: &FieldInstance,
    value: &Value,
    defs: &Definitions,
) -> Result<Vec<u8>> {
    let n = match value {
        Value::String(name) if field.name == "TransactionType" => {
            let code = defs.transaction_type_code(name)?;
            u16::try_from(code).map_err(|_| {
                MalformedInputSnafu {
                    message: format!("transaction type {name} has non-encodable code {code}"),
                }
                .build()
            })?
        },
        Value::String(name) if field.name == "LedgerEntryType" => {
            let code = defs.ledger_entry_type_code(name).with_context(|| MalformedInputSnafu {
                message: format!("unknown ledger entry type: {name}"),
            })?;
            u16::try_from(code).map_err(|_| {
                MalformedInputSnafu {
                    message: format!("ledger entry type {name} has non-encodable code {code}"),
                }
                .build()
            })?
        },
        _ => expect_uint(value, "UInt16", u64::from(u16::MAX))? as u16,
    };
    Ok(n.to_be_bytes().to_vec())
}

pub(crate) fn encode_u32(value: &Value) -> Result<Vec<u8>> {
    Ok((expect_uint(value, "UInt32", u64::from(u32::MAX))? as u32).to_be_bytes().to_vec())
}

pub(crate) fn encode_u64(value: &Value) -> Result<Vec<u8>> {
    let n = match value {
        Value::String(hex_digits) => {
            if hex_digits.len() != 16 {
                return MalformedInputSnafu {
                    message: format!("UInt64 strings must be 16 hex digits, got {hex_digits:?}"),
                }
                .fail();
            }
            u64::from_str_radix(hex_digits, 16).map_err(|_| {
                MalformedInputSnafu { message: format!("invalid UInt64 hex: {hex_digits:?}") }
                    .build()
            })?
        },
        _ => expect_uint(value, "UInt64", u64::MAX)?,
    };
    Ok(n.to_be_bytes().to_vec())
}

pub(crate) fn decode_u8(parser: &mut BinaryParser<'_>) -> Result<Value> {
    Ok(Value::from(parser.read_u8()?))
}

pub(crate) fn decode_u16(
    parser: &mut BinaryParser<'_>,
    field: &FieldInstance,
    defs: &Definitions,
) -> Result<Value> {
    let bytes = parser.read(2)?;
    let n = u16::from_be_bytes([bytes[0], bytes[1]]);

    // Type-code fields decode back to their registry names when known,
    // and stay numeric otherwise so unnamed codes still round-trip.
    let name = match field.name.as_str() {
        "TransactionType" => defs.transaction_type_name(i32::from(n)),
        "LedgerEntryType" => defs.ledger_entry_type_name(i32::from(n)),
        _ => None,
    };
    Ok(name.map_or_else(|| Value::from(n), Value::from))
}

pub(crate) fn decode_u32(parser: &mut BinaryParser<'_>) -> Result<Value> {
    let bytes = parser.read(4)?;
    Ok(Value::from(u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])))
}

pub(crate) fn decode_u64(parser: &mut BinaryParser<'_>) -> Result<Value> {
    let bytes = parser.read(8)?;
    let mut array = [0u8; 8];
    array.copy_from_slice(bytes);
    Ok(Value::from(format!("{:016X}", u64::from_be_bytes(array))))
}
