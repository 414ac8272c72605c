//! Per-type binary serializers.
//!
//! One encode/decode implementation per protocol value type, all
//! stateless. Dispatch is data-driven: the registry resolves every
//! field to a [`TypeKind`], and [`encode_value`] / [`decode_value`]
//! match on the kind. A registry extension therefore reuses an
//! existing serializer through type aliasing rather than adding
//! logic here.

pub mod account;
pub mod amount;
mod blob;
mod currency;
mod hash;
mod path_set;
mod stobject;
mod uint;
mod vector256;

pub use account::AddressCodec;

use serde_json::Value;
use snafu::ensure;

use crate::definitions::{Definitions, FieldInstance, TypeKind};
use crate::error::{MalformedInputSnafu, Result};
use crate::serdes::BinaryParser;

pub(crate) use stobject::{decode_object_fields, encode_field_stream};

/// Shared state threaded through an encode call.
pub(crate) struct EncodeCtx<'a> {
    /// Active definitions registry.
    pub defs: &'a Definitions,
    /// Whether unknown field names abort the encode.
    pub strict: bool,
    /// Optional collaborator for human-readable account addresses.
    pub address_codec: Option<&'a dyn AddressCodec>,
}

/// Encodes one field's JSON value to its payload bytes.
///
/// The payload excludes the field-ID tag and any variable-length
/// prefix; those belong to the serializer writing the field stream.
pub(crate) fn encode_value(
    field: &FieldInstance,
    value: &Value,
    ctx: &EncodeCtx<'_>,
) -> Result<Vec<u8>> {
    match field.kind {
        TypeKind::UInt8 => uint::encode_u8(value),
        TypeKind::UInt16 => uint::encode_u16(field, value, ctx.defs),
        TypeKind::UInt32 => uint::encode_u32(value),
        TypeKind::UInt64 => uint::encode_u64(value),
        TypeKind::Hash128 => hash::encode(value, "Hash128", 16),
        TypeKind::Hash160 => hash::encode(value, "Hash160", 20),
        TypeKind::Hash256 => hash::encode(value, "Hash256", 32),
        TypeKind::Blob => blob::encode(value),
        TypeKind::AccountId => account::encode(value, ctx).map(|id| id.to_vec()),
        TypeKind::Amount => amount::encode(value, ctx),
        TypeKind::Object => stobject::encode_object_value(value, ctx),
        TypeKind::Array => starray_encode(value, ctx),
        TypeKind::PathSet => path_set::encode(value, ctx),
        TypeKind::Vector256 => vector256::encode(value),
    }
}

/// Decodes one field's value from the byte stream.
///
/// Variable-length fields read their length prefix here and decode
/// from the delimited slice; the slice must be consumed exactly.
pub(crate) fn decode_value(
    parser: &mut BinaryParser<'_>,
    field: &FieldInstance,
    defs: &Definitions,
) -> Result<Value> {
    if field.is_vl_encoded {
        let bytes = parser.read_vl_bytes()?;
        let mut sub = BinaryParser::new(bytes);
        let value = decode_kind(&mut sub, field, defs)?;
        ensure!(
            sub.is_end(),
            MalformedInputSnafu {
                message: format!(
                    "field {}: {} trailing bytes inside variable-length payload",
                    field.name,
                    sub.remaining()
                ),
            }
        );
        Ok(value)
    } else {
        decode_kind(parser, field, defs)
    }
}

fn decode_kind(
    parser: &mut BinaryParser<'_>,
    field: &FieldInstance,
    defs: &Definitions,
) -> Result<Value> {
    match field.kind {
        TypeKind::UInt8 => uint::decode_u8(parser),
        TypeKind::UInt16 => uint::decode_u16(parser, field, defs),
        TypeKind::UInt32 => uint::decode_u32(parser),
        TypeKind::UInt64 => uint::decode_u64(parser),
        TypeKind::Hash128 => hash::decode(parser, 16),
        TypeKind::Hash160 => hash::decode(parser, 20),
        TypeKind::Hash256 => hash::decode(parser, 32),
        TypeKind::Blob => {
            ensure_vl(field)?;
            blob::decode(parser)
        },
        TypeKind::AccountId => account::decode(parser, field),
        TypeKind::Amount => amount::decode(parser),
        TypeKind::Object => stobject::decode_object_value(parser, defs),
        TypeKind::Array => starray_decode(parser, defs),
        TypeKind::PathSet => path_set::decode(parser),
        TypeKind::Vector256 => {
            ensure_vl(field)?;
            vector256::decode(parser)
        },
    }
}

/// Blob and Vector256 have no intrinsic width; without the VL prefix
/// their extent in the stream is undefined.
fn ensure_vl(field: &FieldInstance) -> Result<()> {
    ensure!(
        field.is_vl_encoded,
        MalformedInputSnafu {
            message: format!("field {} requires variable-length encoding", field.name),
        }
    );
    Ok(())
}

// The array serializer lives here rather than in its own module: it
// is a thin wrapper over the object field stream.

/// Encodes an array of single-key wrapper objects.
///
/// Each element names the object field it is wrapped under (`Memo`,
/// `SignerEntry`, ...); the element encodes as that field's tag, the
/// inner object's field stream, and the object-end sentinel. The
/// array itself terminates with the array-end sentinel.
fn starray_encode(value: &Value, ctx: &EncodeCtx<'_>) -> Result<Vec<u8>> {
    let Value::Array(elements) = value else {
        return MalformedInputSnafu { message: format!("expected array, got {value}") }.fail();
    };

    let mut out = Vec::new();
    for element in elements {
        let Value::Object(wrapper) = element else {
            return MalformedInputSnafu {
                message: format!("array element must be an object, got {element}"),
            }
            .fail();
        };
        let mut entries = wrapper.iter();
        let (Some((name, inner)), None) = (entries.next(), entries.next()) else {
            return MalformedInputSnafu {
                message: "array element must wrap exactly one field".to_string(),
            }
            .fail();
        };
        let Some(field) = ctx.defs.field(name) else {
            return crate::error::UnknownFieldSnafu { name: name.clone() }.fail();
        };
        ensure!(
            field.kind == TypeKind::Object,
            MalformedInputSnafu { message: format!("array element field {name} is not an object") }
        );
        out.extend_from_slice(&crate::serdes::field_header(
            field.type_code,
            field.field_code,
        ));
        out.extend_from_slice(&stobject::encode_object_value(inner, ctx)?);
    }

    let end = sentinel(ctx.defs, "ArrayEndMarker")?;
    out.extend_from_slice(&crate::serdes::field_header(
        end.type_code,
        end.field_code,
    ));
    Ok(out)
}

/// Decodes an array of single-key wrapper objects, stopping at the
/// array-end sentinel.
fn starray_decode(parser: &mut BinaryParser<'_>, defs: &Definitions) -> Result<Value> {
    let mut elements = Vec::new();
    loop {
        let (type_code, field_code) = parser.read_field_header()?;
        let Some(field) = defs.field_by_code(type_code, field_code) else {
            return crate::error::UnknownFieldCodeSnafu { type_code, field_code }.fail();
        };
        if field.name == "ArrayEndMarker" {
            break;
        }
        ensure!(
            field.kind == TypeKind::Object,
            MalformedInputSnafu {
                message: format!("array element field {} is not an object", field.name),
            }
        );
        let inner = stobject::decode_object_value(parser, defs)?;
        let mut wrapper = serde_json::Map::new();
        wrapper.insert(field.name.clone(), inner);
        elements.push(Value::Object(wrapper));
    }
    Ok(Value::Array(elements))
}

/// Resolves a sentinel marker field through the registry.
///
/// The codec never hard-codes field tags; a registry without the
/// sentinel cannot encode containers.
pub(crate) fn sentinel<'a>(defs: &'a Definitions, name: &str) -> Result<&'a FieldInstance> {
    defs.field(name)
        .ok_or_else(|| crate::error::UnknownFieldSnafu { name: name.to_string() }.build())
}
