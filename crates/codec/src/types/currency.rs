//! 160-bit currency codes.
//!
//! Three JSON forms map onto the 20-byte wire form:
//!
//! * the native ticker `"XAR"`, which is all twenty bytes zero;
//! * a three-character alphanumeric ISO-style code, placed at bytes
//!   12..15 of an otherwise zeroed buffer;
//! * forty hex digits, taken verbatim, for nonstandard codes.

use serde_json::Value;
use snafu::ensure;

use crate::error::{InvalidLengthSnafu, MalformedInputSnafu, Result};

pub(crate) const WIDTH: usize = 20;

/// Ticker of the native asset. Its wire form is the zero code.
pub(crate) const NATIVE_TICKER: &str = "XAR";

const ISO_OFFSET: usize = 12;

pub(crate) fn encode(value: &Value) -> Result<[u8; WIDTH]> {
    let Value::String(code) = value else {
        return MalformedInputSnafu { message: format!("expected currency code, got {value}") }
            .fail();
    };

    let mut bytes = [0u8; WIDTH];
    if code == NATIVE_TICKER {
        return Ok(bytes);
    }

    if code.len() == 3 && code.bytes().all(|b| b.is_ascii_alphanumeric()) {
        bytes[ISO_OFFSET..ISO_OFFSET + 3].copy_from_slice(code.as_bytes());
        return Ok(bytes);
    }

    if code.len() == 2 * WIDTH {
        let raw = hex::decode(code).map_err(|_| {
            MalformedInputSnafu { message: format!("invalid currency hex: {code:?}") }.build()
        })?;
        bytes.copy_from_slice(&raw);
        // The zero code spells the native ticker; forcing it through
        // the hex form would make two JSON spellings of one wire form.
        ensure!(
            bytes != [0u8; WIDTH],
            MalformedInputSnafu {
                message: format!("the all-zero currency code must be written {NATIVE_TICKER:?}"),
            }
        );
        return Ok(bytes);
    }

    MalformedInputSnafu { message: format!("unrecognized currency code form: {code:?}") }.fail()
}

pub(crate) fn decode(bytes: &[u8]) -> Result<Value> {
    ensure!(
        bytes.len() == WIDTH,
        InvalidLengthSnafu { what: "currency code", expected: WIDTH, actual: bytes.len() }
    );

    if bytes.iter().all(|&b| b == 0) {
        return Ok(Value::from(NATIVE_TICKER));
    }

    let iso = &bytes[ISO_OFFSET..ISO_OFFSET + 3];
    let rest_zero = bytes[..ISO_OFFSET].iter().all(|&b| b == 0)
        && bytes[ISO_OFFSET + 3..].iter().all(|&b| b == 0);
    if rest_zero && iso.iter().all(u8::is_ascii_alphanumeric) {
        // Only-ASCII by construction of the guard above.
        return Ok(Value::from(String::from_utf8_lossy(iso).into_owned()));
    }

    Ok(Value::from(hex::encode_upper(bytes)))
}
