//! Error taxonomy for ledger hashing.

use snafu::Snafu;

use arbor_ledger_codec::CodecError;

/// Errors surfaced by tree building and ledger hashing.
///
/// Nothing here is recoverable in place: a hash computed over
/// mis-encoded bytes would fail verification downstream, so every
/// error propagates to the caller.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum HashError {
    /// A transaction submitted for ID hashing carries neither
    /// `TxnSignature` nor `Signers`. Unsigned transactions have no
    /// network-meaningful ID.
    #[snafu(display("Cannot hash an unsigned transaction"))]
    MissingSignature,

    /// A tree key is not 64 hex digits.
    #[snafu(display("Malformed tree key: {input:?}"))]
    MalformedKey {
        /// The rejected key text.
        input: String,
    },

    /// A canonical hex blob failed to parse back to bytes. Encode
    /// output is always valid hex, so this signals an internal
    /// invariant violation rather than bad caller input.
    #[snafu(display("Canonical blob is not valid hex"))]
    MalformedBlob,

    /// Canonical encoding of an item failed.
    #[snafu(context(false), display("Encoding failed: {source}"))]
    Codec {
        /// The underlying codec error.
        source: CodecError,
    },
}

/// Convenience alias used throughout the crate.
pub type Result<T, E = HashError> = std::result::Result<T, E>;
