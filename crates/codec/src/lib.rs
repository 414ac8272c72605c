//! Canonical binary codec for ledger objects.
//!
//! Transactions and ledger entries travel and hash as a canonical byte
//! stream: fields sorted by their numeric codes, each tagged with a
//! compact field ID and encoded by its registry type. This crate maps
//! JSON objects to that stream and back.
//!
//! The field and type tables are data, not code. [`Definitions`] loads
//! them from a JSON document (a bundled one ships in the crate), so a
//! protocol extension is a registry change rather than a codec change.
//!
//! ```
//! use arbor_ledger_codec::{decode, encode, Definitions};
//! use serde_json::json;
//!
//! # fn main() -> arbor_ledger_codec::Result<()> {
//! let defs = Definitions::bundled();
//! let tx = json!({
//!     "TransactionType": "Payment",
//!     "Flags": 0,
//!     "Sequence": 1,
//!     "Amount": "1000",
//!     "Fee": "10",
//!     "Account": "5E7B112523F68D2F5E879DB4EAC51C6698A69304",
//!     "Destination": "B5F762798A53D543A014CAF8B297CFF8F2F937E8",
//! });
//! let blob = encode(&tx, defs)?;
//! assert_eq!(decode(&blob, defs)?, tx);
//! # Ok(())
//! # }
//! ```

pub mod definitions;
pub mod error;
pub mod hash_prefixes;
pub mod serdes;
pub mod types;

pub use definitions::{Definitions, FieldInstance, TypeKind};
pub use error::{CodecError, Result};
pub use hash_prefixes::HashPrefix;
pub use types::AddressCodec;

use serde_json::Value;
use snafu::ensure;

use error::MalformedInputSnafu;
use serdes::BinaryParser;
use types::EncodeCtx;

/// Knobs for [`encode_with_options`].
///
/// The defaults reproduce [`encode`]: lenient toward unknown field
/// names, all serialized fields, no prefix, no address scheme.
pub struct EncodeOptions<'a> {
    /// Emit only fields that participate in signing.
    pub signing_only: bool,
    /// Fail on field names the registry does not define. The default
    /// encode skips them with a debug log, tolerating data from a
    /// newer registry than the active one; set this to refuse such
    /// data instead.
    pub strict: bool,
    /// Bytes prepended to the stream before any field, typically a
    /// [`HashPrefix`] and any domain bytes that follow it.
    pub prefix: Option<Vec<u8>>,
    /// Translator for human-readable account addresses.
    pub address_codec: Option<&'a dyn AddressCodec>,
}

impl Default for EncodeOptions<'_> {
    fn default() -> Self {
        Self { signing_only: false, strict: false, prefix: None, address_codec: None }
    }
}

/// Encodes a JSON object to its canonical hex form.
///
/// Input key order does not matter; the output field order is fixed by
/// the registry codes. The returned hex is uppercase. Field names the
/// registry does not define are skipped with a debug log; use
/// [`encode_with_options`] with `strict` set to refuse them instead.
///
/// # Errors
///
/// Whatever the per-type serializers raise for ill-shaped values.
pub fn encode(object: &Value, defs: &Definitions) -> Result<String> {
    encode_with_options(object, defs, &EncodeOptions::default())
}

/// [`encode`] with explicit options.
///
/// # Errors
///
/// As [`encode`], plus `UnknownField` in strict mode.
pub fn encode_with_options(
    object: &Value,
    defs: &Definitions,
    options: &EncodeOptions<'_>,
) -> Result<String> {
    let Value::Object(fields) = object else {
        return MalformedInputSnafu { message: format!("expected object, got {object}") }.fail();
    };

    let ctx = EncodeCtx { defs, strict: options.strict, address_codec: options.address_codec };
    let stream = types::encode_field_stream(fields, &ctx, options.signing_only)?;

    let mut out = Vec::with_capacity(
        options.prefix.as_ref().map_or(0, Vec::len) + stream.len(),
    );
    if let Some(prefix) = &options.prefix {
        out.extend_from_slice(prefix);
    }
    out.extend_from_slice(&stream);
    Ok(hex::encode_upper(out))
}

/// Encodes the single-signature signing payload: the signing hash
/// prefix followed by the signing fields only.
///
/// # Errors
///
/// As [`encode`].
pub fn encode_for_signing(object: &Value, defs: &Definitions) -> Result<String> {
    encode_with_options(
        object,
        defs,
        &EncodeOptions {
            signing_only: true,
            prefix: Some(HashPrefix::Signing.bytes().to_vec()),
            ..EncodeOptions::default()
        },
    )
}

/// Encodes the multi-signature signing payload for one signer: the
/// multi-signing prefix, the signer's 20-byte account ID, then the
/// signing fields. Binding the signer into the prefix makes each
/// cosigner's payload distinct.
///
/// # Errors
///
/// As [`encode`], plus `MalformedInput` when `signer_account_id` is
/// not forty hex digits.
pub fn encode_for_multi_signing(
    object: &Value,
    signer_account_id: &str,
    defs: &Definitions,
) -> Result<String> {
    let signer = hex::decode(signer_account_id).map_err(|_| {
        MalformedInputSnafu {
            message: format!("invalid signer account ID hex: {signer_account_id:?}"),
        }
        .build()
    })?;
    ensure!(
        signer.len() == 20,
        MalformedInputSnafu {
            message: format!("signer account ID must be 20 bytes, got {}", signer.len()),
        }
    );

    let mut prefix = HashPrefix::MultiSigning.bytes().to_vec();
    prefix.extend_from_slice(&signer);
    encode_with_options(
        object,
        defs,
        &EncodeOptions { signing_only: true, prefix: Some(prefix), ..EncodeOptions::default() },
    )
}

/// Decodes canonical hex back to a JSON object.
///
/// Accepts either hex case and consumes the whole input. Decode is
/// always strict: a code pair outside the registry is an error, since
/// the stream beyond an unknown field cannot be framed.
///
/// # Errors
///
/// `MalformedInput` for non-hex input, truncation, or a container
/// sentinel at the top level; `UnknownFieldCode` for unregistered code
/// pairs.
pub fn decode(blob: &str, defs: &Definitions) -> Result<Value> {
    let bytes = hex::decode(blob).map_err(|_| {
        MalformedInputSnafu { message: "input is not valid hex".to_string() }.build()
    })?;
    let mut parser = BinaryParser::new(&bytes);
    let object = types::decode_object_fields(&mut parser, defs)?;
    Ok(Value::Object(object))
}
