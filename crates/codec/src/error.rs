//! Error types for the canonical codec, using snafu.
//!
//! Every encode/decode failure is surfaced immediately to the caller.
//! Silently mis-encoding protocol data would produce bytes that fail
//! downstream signature and hash verification, so there is no local
//! recovery anywhere in this crate. The one sanctioned exception is
//! skipping registry-unknown fields on encode in non-strict mode; see
//! [`crate::EncodeOptions::strict`].

use snafu::{Location, Snafu};

/// Unified result type for codec operations.
pub type Result<T, E = CodecError> = std::result::Result<T, E>;

/// Error type for canonical encode/decode operations.
///
/// # Recovery Guide
///
/// | Variant                  | Recovery Action                                          |
/// | ------------------------ | -------------------------------------------------------- |
/// | `UnknownField`           | Add the field to the definitions document, or drop it    |
/// | `UnknownFieldCode`       | Decode with a registry that defines the code pair        |
/// | `UnknownType`            | Register the type name, aliasing it onto a base kind     |
/// | `UnknownTransactionType` | Add the transaction type to the definitions document     |
/// | `InvalidLength`          | Fix the fixed-width value to the stated byte length      |
/// | `VariableLengthOverflow` | Payload exceeds the wire format's 918744-byte maximum    |
/// | `AmountOverflow`         | Amount magnitude exceeds the protocol's representable range |
/// | `PrecisionLoss`          | Reduce the value to at most 16 significant digits        |
/// | `MalformedInput`         | Input is not valid hex, is truncated, or is ill-typed    |
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum CodecError {
    /// The field name is not defined by the active registry.
    ///
    /// Raised on encode only in strict mode; non-strict encode skips
    /// unknown names. Never raised on decode, which works from code
    /// pairs, not names.
    #[snafu(display("Unknown field: {name}"))]
    UnknownField {
        /// The unresolved field name.
        name: String,
    },

    /// A decoded `(type_code, field_code)` pair is not defined by the
    /// active registry. Decode is always strict: an unknown pair makes
    /// the remainder of the byte stream unparseable.
    #[snafu(display("Unknown field code: type {type_code}, field {field_code}"))]
    UnknownFieldCode {
        /// Numeric type code from the field-ID tag.
        type_code: i32,
        /// Numeric field code from the field-ID tag.
        field_code: u8,
    },

    /// A type name in the definitions document resolves to no base
    /// serializer kind and no registered alias.
    #[snafu(display("Unknown type: {name}"))]
    UnknownType {
        /// The unresolved type name.
        name: String,
    },

    /// A transaction type name has no numeric code in the active registry.
    #[snafu(display("Unknown transaction type: {name}"))]
    UnknownTransactionType {
        /// The unresolved transaction type name.
        name: String,
    },

    /// A fixed-width value has the wrong byte length.
    #[snafu(display("Invalid length for {what}: expected {expected} bytes, got {actual}"))]
    InvalidLength {
        /// Which value kind was being coded.
        what: &'static str,
        /// Expected byte length.
        expected: usize,
        /// Actual byte length.
        actual: usize,
    },

    /// A variable-length payload exceeds the three-byte prefix maximum
    /// of 918744 bytes.
    #[snafu(display("Variable-length payload of {length} bytes exceeds the encodable maximum"))]
    VariableLengthOverflow {
        /// The offending payload length.
        length: usize,
    },

    /// An amount magnitude is outside the protocol's representable range.
    #[snafu(display("Amount out of range: {value}"))]
    AmountOverflow {
        /// The rejected amount, as supplied by the caller.
        value: String,
    },

    /// An issued-currency value cannot be represented within the
    /// protocol's 16-digit mantissa without losing precision.
    #[snafu(display("Amount requires more precision than representable: {value}"))]
    PrecisionLoss {
        /// The rejected amount, as supplied by the caller.
        value: String,
    },

    /// The input is not valid hex, is truncated, or carries a value of
    /// the wrong JSON shape for its field type.
    #[snafu(display("Malformed input at {location}: {message}"))]
    MalformedInput {
        /// What was wrong with the input.
        message: String,
        /// Source location.
        #[snafu(implicit)]
        location: Location,
    },
}
