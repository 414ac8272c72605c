//! 160-bit account identifiers.
//!
//! The wire form is always the raw 20-byte ID. In JSON the ID is
//! written as forty hex digits; deployments with a human-readable
//! address scheme plug it in through [`AddressCodec`], and the encoder
//! consults it for any value that is not already hex.

use serde_json::Value;
use snafu::ensure;

use crate::definitions::FieldInstance;
use crate::error::{MalformedInputSnafu, Result};
use crate::serdes::BinaryParser;

pub(crate) const WIDTH: usize = 20;

/// Translation between human-readable addresses and raw account IDs.
///
/// The codec itself is address-scheme agnostic; implement this to let
/// encode accept addresses in whatever checksummed base encoding the
/// deployment uses. Decode always yields hex and never consults the
/// codec, so decoded output stays canonical.
pub trait AddressCodec {
    /// Resolves an address string to its 20-byte account ID, or `None`
    /// if the string is not a valid address in this scheme.
    fn account_id(&self, address: &str) -> Option<[u8; WIDTH]>;
}

pub(crate) fn encode(value: &Value, ctx: &super::EncodeCtx<'_>) -> Result<[u8; WIDTH]> {
    let Value::String(text) = value else {
        return MalformedInputSnafu { message: format!("expected account ID, got {value}") }.fail();
    };

    if text.len() == 2 * WIDTH {
        if let Ok(raw) = hex::decode(text) {
            let mut id = [0u8; WIDTH];
            id.copy_from_slice(&raw);
            return Ok(id);
        }
    }

    if let Some(codec) = ctx.address_codec {
        if let Some(id) = codec.account_id(text) {
            return Ok(id);
        }
    }

    MalformedInputSnafu { message: format!("unresolvable account ID: {text:?}") }.fail()
}

/// Decodes the 20-byte ID from its delimited payload.
pub(crate) fn decode(parser: &mut BinaryParser<'_>, field: &FieldInstance) -> Result<Value> {
    ensure!(
        parser.remaining() == WIDTH,
        MalformedInputSnafu {
            message: format!(
                "field {}: account ID payload is {} bytes, expected {WIDTH}",
                field.name,
                parser.remaining()
            ),
        }
    );
    let bytes = parser.read(WIDTH)?;
    Ok(Value::from(hex::encode_upper(bytes)))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::definitions::Definitions;
    use serde_json::json;

    fn ctx<'a>(
        defs: &'a Definitions,
        address_codec: Option<&'a dyn AddressCodec>,
    ) -> super::super::EncodeCtx<'a> {
        super::super::EncodeCtx { defs, strict: true, address_codec }
    }

    struct TestAddresses;

    impl AddressCodec for TestAddresses {
        fn account_id(&self, address: &str) -> Option<[u8; WIDTH]> {
            (address == "alice").then(|| [0xAA; WIDTH])
        }
    }

    #[test]
    fn test_hex_id_passthrough() {
        let defs = Definitions::bundled();
        let id = encode(&json!("5E7B112523F68D2F5E879DB4EAC51C6698A69304"), &ctx(defs, None))
            .unwrap();
        assert_eq!(id[0], 0x5E);
        assert_eq!(id[19], 0x04);
    }

    #[test]
    fn test_address_codec_fallback() {
        let defs = Definitions::bundled();
        let addresses = TestAddresses;
        assert_eq!(
            encode(&json!("alice"), &ctx(defs, Some(&addresses))).unwrap(),
            [0xAA; WIDTH]
        );
        assert!(encode(&json!("mallory"), &ctx(defs, Some(&addresses))).is_err());
        assert!(encode(&json!("alice"), &ctx(defs, None)).is_err());
    }

    #[test]
    fn test_decode_requires_exact_width() {
        let defs = Definitions::bundled();
        let account = defs.field("Account").unwrap();
        let mut parser = BinaryParser::new(&[0x11; WIDTH]);
        assert_eq!(decode(&mut parser, account).unwrap(), json!("11".repeat(20).to_uppercase()));

        let mut short = BinaryParser::new(&[0x11; 19]);
        assert!(decode(&mut short, account).is_err());
    }
}
