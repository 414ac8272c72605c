//! Canonically ordered field maps.
//!
//! An object serializes as its fields sorted by `(type_code,
//! field_code)`, each as tag, optional variable-length prefix, and
//! payload. The top-level object has no delimiter; a nested object
//! closes with the object-end sentinel. Input key order is irrelevant
//! by construction, which is what makes the encoding canonical.

use serde_json::{Map, Value};
use snafu::ensure;

use crate::definitions::Definitions;
use crate::error::{
    MalformedInputSnafu, Result, UnknownFieldCodeSnafu, UnknownFieldSnafu,
};
use crate::serdes::{BinaryParser, BinarySerializer};
use crate::types::{decode_value, encode_value, sentinel, EncodeCtx};

/// Encodes a top-level object as its bare canonical field stream.
///
/// Fields whose registry entry has `is_serialized` false never reach
/// the wire. With `signing_only` set, fields marked as excluded from
/// signing (signatures themselves, chiefly) are dropped as well.
/// Unknown field names abort a strict encode and are skipped with a
/// debug log otherwise.
pub(crate) fn encode_field_stream(
    object: &Map<String, Value>,
    ctx: &EncodeCtx<'_>,
    signing_only: bool,
) -> Result<Vec<u8>> {
    let mut present = Vec::with_capacity(object.len());
    for (name, value) in object {
        let Some(field) = ctx.defs.field(name) else {
            if ctx.strict {
                return UnknownFieldSnafu { name: name.clone() }.fail();
            }
            tracing::debug!(field = %name, "skipping unknown field");
            continue;
        };
        if !field.is_serialized {
            continue;
        }
        if signing_only && !field.is_signing_field {
            continue;
        }
        present.push((field, value));
    }
    present.sort_by_key(|(field, _)| field.ordinal());

    let mut serializer = BinarySerializer::new();
    for (field, value) in present {
        let payload = encode_value(field, value, ctx)?;
        serializer.put_field(field, &payload)?;
    }
    Ok(serializer.into_bytes())
}

/// Encodes a nested object: its field stream plus the object-end
/// sentinel.
pub(crate) fn encode_object_value(value: &Value, ctx: &EncodeCtx<'_>) -> Result<Vec<u8>> {
    let Value::Object(object) = value else {
        return MalformedInputSnafu { message: format!("expected object, got {value}") }.fail();
    };

    let mut out = encode_field_stream(object, ctx, false)?;
    let end = sentinel(ctx.defs, "ObjectEndMarker")?;
    out.extend_from_slice(&crate::serdes::field_header(end.type_code, end.field_code));
    Ok(out)
}

/// Decodes a top-level field stream, consuming the parser to its end.
///
/// Decode has no lenient mode: every code pair must resolve, and the
/// container sentinels may not appear at the top level.
pub(crate) fn decode_object_fields(
    parser: &mut BinaryParser<'_>,
    defs: &Definitions,
) -> Result<Map<String, Value>> {
    let mut object = Map::new();
    while !parser.is_end() {
        let (type_code, field_code) = parser.read_field_header()?;
        let Some(field) = defs.field_by_code(type_code, field_code) else {
            return UnknownFieldCodeSnafu { type_code, field_code }.fail();
        };
        ensure!(
            field.name != "ObjectEndMarker" && field.name != "ArrayEndMarker",
            MalformedInputSnafu {
                message: format!("container sentinel {} at the top level", field.name),
            }
        );
        let value = decode_value(parser, field, defs)?;
        object.insert(field.name.clone(), value);
    }
    Ok(object)
}

/// Decodes a nested object, stopping at the object-end sentinel.
pub(crate) fn decode_object_value(
    parser: &mut BinaryParser<'_>,
    defs: &Definitions,
) -> Result<Value> {
    let mut object = Map::new();
    loop {
        let (type_code, field_code) = parser.read_field_header()?;
        let Some(field) = defs.field_by_code(type_code, field_code) else {
            return UnknownFieldCodeSnafu { type_code, field_code }.fail();
        };
        if field.name == "ObjectEndMarker" {
            break;
        }
        ensure!(
            field.name != "ArrayEndMarker",
            MalformedInputSnafu { message: "array sentinel inside an object".to_string() }
        );
        let value = decode_value(parser, field, defs)?;
        object.insert(field.name.clone(), value);
    }
    Ok(Value::Object(object))
}
