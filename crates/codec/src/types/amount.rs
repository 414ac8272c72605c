//! Amounts, native and issued.
//!
//! A native amount is eight bytes: bit 63 clear, bit 62 set, and the
//! drop count in the low 62 bits. An issued amount is forty-eight
//! bytes: an eight-byte packed value (bit 63 set, bit 62 the sign,
//! bits 61..54 the exponent biased by 97, bits 53..0 the mantissa),
//! then the 20-byte currency code and the 20-byte issuer ID. The
//! mantissa is normalized to sixteen decimal digits, so two JSON
//! spellings of one number always pack identically.

use serde_json::Value;
use snafu::ensure;

use crate::error::{
    AmountOverflowSnafu, MalformedInputSnafu, PrecisionLossSnafu, Result,
};
use crate::serdes::BinaryParser;
use crate::types::{account, currency, EncodeCtx};

const NOT_NATIVE_BIT: u64 = 1 << 63;
const SIGN_BIT: u64 = 1 << 62;
const MANTISSA_MASK: u64 = (1 << 54) - 1;

/// Largest native magnitude, in drops.
const MAX_NATIVE: u64 = 100_000_000_000_000_000;

const MANTISSA_MIN: u64 = 1_000_000_000_000_000;
const MANTISSA_MAX: u64 = 9_999_999_999_999_999;
const EXP_MIN: i32 = -96;
const EXP_MAX: i32 = 80;
const EXP_BIAS: i32 = 97;

/// Packed form of an issued zero, the one value outside the normalized
/// mantissa range. Sign bit set, exponent and mantissa zero.
const ZERO_ISSUED: u64 = NOT_NATIVE_BIT | SIGN_BIT;

pub(crate) fn encode(value: &Value, ctx: &EncodeCtx<'_>) -> Result<Vec<u8>> {
    match value {
        Value::String(drops) => encode_native(drops),
        Value::Object(fields) => encode_issued(fields, ctx),
        _ => MalformedInputSnafu {
            message: format!("expected drop string or issued-amount object, got {value}"),
        }
        .fail(),
    }
}

fn encode_native(drops: &str) -> Result<Vec<u8>> {
    ensure!(
        !drops.is_empty() && drops.bytes().all(|b| b.is_ascii_digit()),
        MalformedInputSnafu {
            message: format!("native amounts are unsigned decimal drop counts, got {drops:?}"),
        }
    );
    let magnitude: u64 = drops
        .parse()
        .map_err(|_| AmountOverflowSnafu { value: drops.to_string() }.build())?;
    ensure!(magnitude <= MAX_NATIVE, AmountOverflowSnafu { value: drops.to_string() });
    Ok((SIGN_BIT | magnitude).to_be_bytes().to_vec())
}

fn encode_issued(
    fields: &serde_json::Map<String, Value>,
    ctx: &EncodeCtx<'_>,
) -> Result<Vec<u8>> {
    let (Some(currency_value), Some(issuer_value), Some(amount_value)) =
        (fields.get("currency"), fields.get("issuer"), fields.get("value"))
    else {
        return MalformedInputSnafu {
            message: "issued amounts need currency, issuer, and value".to_string(),
        }
        .fail();
    };

    let currency_bytes = currency::encode(currency_value)?;
    ensure!(
        currency_bytes != [0u8; currency::WIDTH],
        MalformedInputSnafu {
            message: format!(
                "issued amounts may not use the native currency {:?}",
                currency::NATIVE_TICKER
            ),
        }
    );
    let issuer = account::encode(issuer_value, ctx)?;

    let text = match amount_value {
        Value::String(text) => text.clone(),
        Value::Number(number) => number.to_string(),
        other => {
            return MalformedInputSnafu {
                message: format!("expected decimal value, got {other}"),
            }
            .fail();
        },
    };
    let packed = pack_issued_value(&text)?;

    let mut out = Vec::with_capacity(8 + 2 * currency::WIDTH);
    out.extend_from_slice(&packed.to_be_bytes());
    out.extend_from_slice(&currency_bytes);
    out.extend_from_slice(&issuer);
    Ok(out)
}

/// Parses a signed decimal string and packs it into the eight-byte
/// issued-value form.
fn pack_issued_value(text: &str) -> Result<u64> {
    let parsed = Decimal::parse(text)?;
    if parsed.digits.is_empty() {
        return Ok(ZERO_ISSUED);
    }

    let sig_len = i32::try_from(parsed.digits.len()).unwrap_or(i32::MAX);
    ensure!(sig_len <= 16, PrecisionLossSnafu { value: text.to_string() });

    let shift = 16 - sig_len;
    #[allow(clippy::expect_used)]
    let sig: u64 = parsed.digits.parse().expect("at most 16 ascii digits");
    let mantissa = sig * 10u64.pow(shift as u32);
    let exponent = parsed.exponent - shift;
    ensure!(
        (EXP_MIN..=EXP_MAX).contains(&exponent),
        AmountOverflowSnafu { value: text.to_string() }
    );
    debug_assert!((MANTISSA_MIN..=MANTISSA_MAX).contains(&mantissa));

    let sign = if parsed.negative { 0 } else { SIGN_BIT };
    let biased = (exponent + EXP_BIAS) as u64;
    Ok(NOT_NATIVE_BIT | sign | (biased << 54) | mantissa)
}

pub(crate) fn decode(parser: &mut BinaryParser<'_>) -> Result<Value> {
    let first = parser.read(8)?;
    let mut raw_bytes = [0u8; 8];
    raw_bytes.copy_from_slice(first);
    let raw = u64::from_be_bytes(raw_bytes);

    if raw & NOT_NATIVE_BIT == 0 {
        ensure!(
            raw & SIGN_BIT != 0,
            MalformedInputSnafu { message: "native amount without its positive bit".to_string() }
        );
        let magnitude = raw & !(NOT_NATIVE_BIT | SIGN_BIT);
        ensure!(
            magnitude <= MAX_NATIVE,
            MalformedInputSnafu { message: format!("native amount {magnitude} out of range") }
        );
        return Ok(Value::from(magnitude.to_string()));
    }

    let currency_value = currency::decode(parser.read(currency::WIDTH)?)?;
    ensure!(
        currency_value != Value::from(currency::NATIVE_TICKER),
        MalformedInputSnafu {
            message: "issued amount carries the native currency code".to_string(),
        }
    );
    let issuer = hex::encode_upper(parser.read(account::WIDTH)?);

    let rendered = if raw == ZERO_ISSUED {
        "0".to_string()
    } else {
        let negative = raw & SIGN_BIT == 0;
        let exponent = ((raw >> 54) & 0xFF) as i32 - EXP_BIAS;
        let mantissa = raw & MANTISSA_MASK;
        ensure!(
            (MANTISSA_MIN..=MANTISSA_MAX).contains(&mantissa)
                && (EXP_MIN..=EXP_MAX).contains(&exponent),
            MalformedInputSnafu {
                message: format!("non-canonical issued value {raw:#018X}"),
            }
        );
        render_decimal(negative, mantissa, exponent)
    };

    let mut object = serde_json::Map::new();
    object.insert("currency".to_string(), currency_value);
    object.insert("issuer".to_string(), Value::from(issuer));
    object.insert("value".to_string(), Value::from(rendered));
    Ok(Value::Object(object))
}

/// Shortest decimal rendering of `±mantissa * 10^exponent`, with no
/// exponent notation and no trailing fraction zeros.
fn render_decimal(negative: bool, mantissa: u64, exponent: i32) -> String {
    let mut digits = mantissa.to_string();
    let mut exponent = exponent;
    while digits.len() > 1 && digits.ends_with('0') {
        digits.pop();
        exponent += 1;
    }

    let len = i32::try_from(digits.len()).unwrap_or(i32::MAX);
    let body = if exponent >= 0 {
        format!("{digits}{}", "0".repeat(exponent as usize))
    } else if -exponent < len {
        let point = (len + exponent) as usize;
        format!("{}.{}", &digits[..point], &digits[point..])
    } else {
        format!("0.{}{digits}", "0".repeat((-exponent - len) as usize))
    };

    if negative { format!("-{body}") } else { body }
}

/// A parsed decimal: significant digits with no leading or trailing
/// zeros, and the power of ten they sit at. Zero parses to an empty
/// digit string.
struct Decimal {
    negative: bool,
    digits: String,
    exponent: i32,
}

impl Decimal {
    fn parse(text: &str) -> Result<Self> {
        let malformed = || {
            MalformedInputSnafu { message: format!("invalid decimal value: {text:?}") }.build()
        };

        let mut rest = text;
        let negative = match rest.as_bytes().first() {
            Some(b'-') => {
                rest = &rest[1..];
                true
            },
            Some(b'+') => {
                rest = &rest[1..];
                false
            },
            _ => false,
        };

        let (mantissa_part, exp_part) = match rest.find(['e', 'E']) {
            Some(pos) => (&rest[..pos], Some(&rest[pos + 1..])),
            None => (rest, None),
        };
        let (int_part, frac_part) = match mantissa_part.find('.') {
            Some(pos) => (&mantissa_part[..pos], &mantissa_part[pos + 1..]),
            None => (mantissa_part, ""),
        };
        if int_part.is_empty() && frac_part.is_empty() {
            return Err(malformed());
        }
        if !int_part.bytes().all(|b| b.is_ascii_digit())
            || !frac_part.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(malformed());
        }

        let mut exponent: i32 = match exp_part {
            Some(exp_text) => exp_text.parse().map_err(|_| malformed())?,
            None => 0,
        };
        exponent -= i32::try_from(frac_part.len()).map_err(|_| malformed())?;

        let mut digits: String =
            int_part.chars().chain(frac_part.chars()).skip_while(|&c| c == '0').collect();
        while digits.ends_with('0') {
            digits.pop();
            exponent += 1;
        }
        if digits.is_empty() {
            exponent = 0;
        }

        Ok(Self { negative, digits, exponent })
    }
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

    const ISSUER: &str = "B5F762798A53D543A014CAF8B297CFF8F2F937E8";

    fn issued(value: &str) -> Value {
        json!({ "currency": "USD", "issuer": ISSUER, "value": value })
    }

    #[test]
    fn test_native_encoding() {
        let defs = Definitions::bundled();
        assert_eq!(
            encode(&json!("1000"), &ctx(defs)).unwrap(),
            0x4000_0000_0000_03E8u64.to_be_bytes()
        );
        assert_eq!(
            encode(&json!("0"), &ctx(defs)).unwrap(),
            0x4000_0000_0000_0000u64.to_be_bytes()
        );
        assert!(encode(&json!("100000000000000001"), &ctx(defs)).is_err());
        assert!(encode(&json!("-5"), &ctx(defs)).is_err());
        assert!(encode(&json!("1.5"), &ctx(defs)).is_err());
    }

    #[test]
    fn test_issued_one_packs_canonically() {
        let defs = Definitions::bundled();
        let bytes = encode(&issued("1"), &ctx(defs)).unwrap();
        assert_eq!(bytes.len(), 48);
        assert_eq!(&bytes[..8], &0xD483_8D7E_A4C6_8000u64.to_be_bytes());
    }

    #[test]
    fn test_trailing_zeros_do_not_change_packing() {
        let defs = Definitions::bundled();
        let plain = encode(&issued("1"), &ctx(defs)).unwrap();
        let padded = encode(&issued("1.000000000000000"), &ctx(defs)).unwrap();
        assert_eq!(plain, padded);
    }

    #[test]
    fn test_issued_zero_form() {
        let defs = Definitions::bundled();
        let bytes = encode(&issued("0"), &ctx(defs)).unwrap();
        assert_eq!(&bytes[..8], &ZERO_ISSUED.to_be_bytes());
        assert_eq!(encode(&issued("0.000"), &ctx(defs)).unwrap()[..8], bytes[..8]);
        assert_eq!(encode(&issued("-0"), &ctx(defs)).unwrap()[..8], bytes[..8]);
    }

    #[test]
    fn test_negative_issued_clears_sign_bit() {
        let defs = Definitions::bundled();
        let bytes = encode(&issued("-1"), &ctx(defs)).unwrap();
        let raw = u64::from_be_bytes(bytes[..8].try_into().unwrap());
        assert_eq!(raw & SIGN_BIT, 0);
        assert_ne!(raw & NOT_NATIVE_BIT, 0);
    }

    #[test]
    fn test_precision_loss_at_seventeen_digits() {
        let defs = Definitions::bundled();
        assert!(encode(&issued("1234567812345678"), &ctx(defs)).is_ok());
        let err = encode(&issued("12345678123456781"), &ctx(defs)).unwrap_err();
        assert!(err.to_string().contains("precision"));
    }

    #[test]
    fn test_exponent_range() {
        let defs = Definitions::bundled();
        // Largest: 9999999999999999 * 10^80. Smallest positive:
        // 1000000000000000 * 10^-96, which is 1e-81.
        assert!(encode(&issued("9999999999999999e80"), &ctx(defs)).is_ok());
        assert!(encode(&issued("1e97"), &ctx(defs)).is_err());
        assert!(encode(&issued("1e-81"), &ctx(defs)).is_ok());
        assert!(encode(&issued("1e-82"), &ctx(defs)).is_err());
    }

    #[test]
    fn test_native_currency_refused_in_issued() {
        let defs = Definitions::bundled();
        let bad = json!({ "currency": "XAR", "issuer": ISSUER, "value": "1" });
        assert!(encode(&bad, &ctx(defs)).is_err());
    }

    #[test]
    fn test_decode_roundtrip_renders_shortest() {
        let defs = Definitions::bundled();
        for (input, rendered) in [
            ("1", "1"),
            ("1.000000000000000", "1"),
            ("123.456", "123.456"),
            ("0.0001", "0.0001"),
            ("-42.5", "-42.5"),
            ("1000000", "1000000"),
            ("0", "0"),
        ] {
            let bytes = encode(&issued(input), &ctx(defs)).unwrap();
            let mut parser = BinaryParser::new(&bytes);
            let decoded = decode(&mut parser).unwrap();
            assert!(parser.is_end());
            assert_eq!(decoded["value"], json!(rendered), "for input {input}");
            assert_eq!(decoded["currency"], json!("USD"));
            assert_eq!(decoded["issuer"], json!(ISSUER));
        }
    }

    #[test]
    fn test_decode_native() {
        let bytes = 0x4000_0000_0000_03E8u64.to_be_bytes();
        let mut parser = BinaryParser::new(&bytes);
        assert_eq!(decode(&mut parser).unwrap(), json!("1000"));
    }

    #[test]
    fn test_exponent_parse_forms() {
        let defs = Definitions::bundled();
        let scientific = encode(&issued("1.5e3"), &ctx(defs)).unwrap();
        let plain = encode(&issued("1500"), &ctx(defs)).unwrap();
        assert_eq!(scientific, plain);
    }
}
