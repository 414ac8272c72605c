//! Payment path sets.
//!
//! A path set is one or more paths separated by `0xFF` and terminated
//! by `0x00`. Each path is a run of steps; a step is a type byte (the
//! OR of the flags below) followed by the 20-byte fields the flags
//! declare, always in account, currency, issuer order.

use serde_json::{Map, Value};
use snafu::ensure;

use crate::error::{MalformedInputSnafu, Result};
use crate::serdes::BinaryParser;
use crate::types::{account, currency, EncodeCtx};

const STEP_ACCOUNT: u8 = 0x01;
const STEP_CURRENCY: u8 = 0x10;
const STEP_ISSUER: u8 = 0x20;

const PATH_SEPARATOR: u8 = 0xFF;
const PATH_SET_END: u8 = 0x00;

pub(crate) fn encode(value: &Value, ctx: &EncodeCtx<'_>) -> Result<Vec<u8>> {
    let Value::Array(paths) = value else {
        return MalformedInputSnafu { message: format!("expected path array, got {value}") }
            .fail();
    };
    ensure!(
        !paths.is_empty(),
        MalformedInputSnafu { message: "a path set must contain at least one path".to_string() }
    );

    let mut out = Vec::new();
    for (index, path) in paths.iter().enumerate() {
        if index > 0 {
            out.push(PATH_SEPARATOR);
        }
        let Value::Array(steps) = path else {
            return MalformedInputSnafu {
                message: format!("expected step array, got {path}"),
            }
            .fail();
        };
        ensure!(
            !steps.is_empty(),
            MalformedInputSnafu { message: "a path must contain at least one step".to_string() }
        );
        for step in steps {
            encode_step(step, ctx, &mut out)?;
        }
    }
    out.push(PATH_SET_END);
    Ok(out)
}

fn encode_step(step: &Value, ctx: &EncodeCtx<'_>, out: &mut Vec<u8>) -> Result<()> {
    let Value::Object(fields) = step else {
        return MalformedInputSnafu { message: format!("expected step object, got {step}") }
            .fail();
    };

    let mut type_byte = 0u8;
    let mut body = Vec::new();
    if let Some(value) = fields.get("account") {
        type_byte |= STEP_ACCOUNT;
        body.extend_from_slice(&account::encode(value, ctx)?);
    }
    if let Some(value) = fields.get("currency") {
        type_byte |= STEP_CURRENCY;
        body.extend_from_slice(&currency::encode(value)?);
    }
    if let Some(value) = fields.get("issuer") {
        type_byte |= STEP_ISSUER;
        body.extend_from_slice(&account::encode(value, ctx)?);
    }
    ensure!(
        type_byte != 0,
        MalformedInputSnafu {
            message: "a step needs at least one of account, currency, issuer".to_string(),
        }
    );

    out.push(type_byte);
    out.extend_from_slice(&body);
    Ok(())
}

pub(crate) fn decode(parser: &mut BinaryParser<'_>) -> Result<Value> {
    let mut paths = Vec::new();
    let mut steps = Vec::new();
    loop {
        let type_byte = parser.read_u8()?;
        match type_byte {
            PATH_SET_END => break,
            PATH_SEPARATOR => {
                ensure!(
                    !steps.is_empty(),
                    MalformedInputSnafu { message: "empty path in path set".to_string() }
                );
                paths.push(Value::Array(std::mem::take(&mut steps)));
            },
            _ => steps.push(decode_step(parser, type_byte)?),
        }
    }
    ensure!(
        !steps.is_empty(),
        MalformedInputSnafu { message: "empty path in path set".to_string() }
    );
    paths.push(Value::Array(steps));
    Ok(Value::Array(paths))
}

fn decode_step(parser: &mut BinaryParser<'_>, type_byte: u8) -> Result<Value> {
    ensure!(
        type_byte & !(STEP_ACCOUNT | STEP_CURRENCY | STEP_ISSUER) == 0,
        MalformedInputSnafu { message: format!("unknown path step type {type_byte:#04X}") }
    );

    let mut step = Map::new();
    if type_byte & STEP_ACCOUNT != 0 {
        step.insert(
            "account".to_string(),
            Value::from(hex::encode_upper(parser.read(account::WIDTH)?)),
        );
    }
    if type_byte & STEP_CURRENCY != 0 {
        let code = currency::decode(parser.read(currency::WIDTH)?)?;
        step.insert("currency".to_string(), code);
    }
    if type_byte & STEP_ISSUER != 0 {
        step.insert(
            "issuer".to_string(),
            Value::from(hex::encode_upper(parser.read(account::WIDTH)?)),
        );
    }
    Ok(Value::Object(step))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::definitions::Definitions;
    use serde_json::json;

    fn ctx(defs: &Definitions) -> EncodeCtx<'_> {
        EncodeCtx { defs, strict: true, address_codec: None }
    }

    const HOP: &str = "5E7B112523F68D2F5E879DB4EAC51C6698A69304";
    const ISSUER: &str = "B5F762798A53D543A014CAF8B297CFF8F2F937E8";

    #[test]
    fn test_single_path_roundtrip() {
        let defs = Definitions::bundled();
        let paths = json!([[
            { "account": HOP },
            { "currency": "USD", "issuer": ISSUER },
        ]]);
        let bytes = encode(&paths, &ctx(defs)).unwrap();
        assert_eq!(bytes[0], STEP_ACCOUNT);
        assert_eq!(bytes[21], STEP_CURRENCY | STEP_ISSUER);
        assert_eq!(*bytes.last().unwrap(), PATH_SET_END);

        let mut parser = BinaryParser::new(&bytes);
        assert_eq!(decode(&mut parser).unwrap(), paths);
        assert!(parser.is_end());
    }

    #[test]
    fn test_paths_are_separated() {
        let defs = Definitions::bundled();
        let paths = json!([
            [{ "account": HOP }],
            [{ "currency": "EUR", "issuer": ISSUER }],
        ]);
        let bytes = encode(&paths, &ctx(defs)).unwrap();
        assert_eq!(bytes[21], PATH_SEPARATOR);

        let mut parser = BinaryParser::new(&bytes);
        assert_eq!(decode(&mut parser).unwrap(), paths);
    }

    #[test]
    fn test_rejects_empty_shapes() {
        let defs = Definitions::bundled();
        assert!(encode(&json!([]), &ctx(defs)).is_err());
        assert!(encode(&json!([[]]), &ctx(defs)).is_err());
        assert!(encode(&json!([[{}]]), &ctx(defs)).is_err());
    }

    #[test]
    fn test_rejects_unknown_step_type() {
        let mut parser = BinaryParser::new(&[0x40, 0x00]);
        assert!(decode(&mut parser).is_err());
    }
}
