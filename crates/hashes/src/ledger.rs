//! Ledger-level hashing: transaction IDs, tree roots, and the header
//! hash that commits to both.

use serde_json::Value;
use snafu::ensure;

use arbor_ledger_codec::serdes::BinarySerializer;
use arbor_ledger_codec::{decode, encode, Definitions, HashPrefix};

use crate::error::{MalformedBlobSnafu, MalformedKeySnafu, MissingSignatureSnafu, Result};
use crate::sha512half::{Hash256, Sha512Half};
use crate::shamap::{NodeKind, ShaMap};

/// The fixed-layout fields a ledger header hash commits to.
///
/// Times are seconds since the network epoch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerHeader {
    /// Ledger sequence number.
    pub sequence: u32,
    /// Total native currency in existence, in drops.
    pub total_coins: u64,
    /// Hash of the previous ledger's header.
    pub parent_hash: Hash256,
    /// Root of this ledger's transaction tree.
    pub transaction_hash: Hash256,
    /// Root of this ledger's state tree.
    pub account_hash: Hash256,
    /// When the previous ledger closed.
    pub parent_close_time: u32,
    /// When this ledger closed.
    pub close_time: u32,
    /// Resolution of the close time, in seconds.
    pub close_time_resolution: u8,
    /// Close-related flag bits.
    pub close_flags: u8,
}

/// Hashes a ledger header.
#[must_use]
pub fn hash_ledger_header(header: &LedgerHeader) -> Hash256 {
    let mut hasher = Sha512Half::with_prefix(HashPrefix::LedgerHeader);
    hasher.update(&header.sequence.to_be_bytes());
    hasher.update(&header.total_coins.to_be_bytes());
    hasher.update(&header.parent_hash);
    hasher.update(&header.transaction_hash);
    hasher.update(&header.account_hash);
    hasher.update(&header.parent_close_time.to_be_bytes());
    hasher.update(&header.close_time.to_be_bytes());
    hasher.update(&[header.close_time_resolution]);
    hasher.update(&[header.close_flags]);
    hasher.finalize()
}

/// Computes a signed transaction's network ID.
///
/// Accepts either the transaction object or its canonical hex blob.
///
/// # Errors
///
/// `MissingSignature` when the transaction carries neither
/// `TxnSignature` nor `Signers`; codec errors for anything that does
/// not encode.
pub fn hash_signed_tx(tx_or_blob: &Value, defs: &Definitions) -> Result<Hash256> {
    let tx = match tx_or_blob {
        Value::String(blob) => decode(blob, defs)?,
        other => other.clone(),
    };

    let signed = tx
        .as_object()
        .is_some_and(|fields| fields.contains_key("TxnSignature") || fields.contains_key("Signers"));
    ensure!(signed, MissingSignatureSnafu);

    let blob = encode(&tx, defs)?;
    let mut hasher = Sha512Half::with_prefix(HashPrefix::TransactionId);
    hasher.update(&hex_bytes(&blob)?);
    Ok(hasher.finalize())
}

/// Computes the transaction tree root for one ledger.
///
/// Each element pairs a signed transaction with its processing
/// metadata. The leaf content is the length-prefixed transaction blob
/// followed by the length-prefixed metadata blob, keyed by the
/// transaction's ID.
///
/// # Errors
///
/// As [`hash_signed_tx`], for each transaction.
pub fn hash_tx_tree(txs_with_metadata: &[(Value, Value)], defs: &Definitions) -> Result<Hash256> {
    let mut tree = ShaMap::new();
    for (tx, metadata) in txs_with_metadata {
        let key = hash_signed_tx(tx, defs)?;

        let mut item = BinarySerializer::new();
        item.put_vl(&hex_bytes(&encode(tx, defs)?)?)?;
        item.put_vl(&hex_bytes(&encode(metadata, defs)?)?)?;
        tree.add_item(key, item.into_bytes(), NodeKind::TransactionWithMetadata);
    }
    Ok(tree.root_hash())
}

/// Computes the state tree root over a set of ledger entries.
///
/// Each entry carries its 64-hex-digit tree key under `index`; the
/// key is not a registry field, so the default lenient encode keeps
/// it out of the hashed content.
///
/// # Errors
///
/// `MalformedKey` when an entry's `index` is absent or not 64 hex
/// digits; codec errors for entries that do not encode.
pub fn hash_state_tree(entries: &[Value], defs: &Definitions) -> Result<Hash256> {
    let mut tree = ShaMap::new();
    for entry in entries {
        let index = entry.get("index").and_then(Value::as_str).unwrap_or_default();
        let key = parse_key(index)?;

        let blob = encode(entry, defs)?;
        tree.add_item(key, hex_bytes(&blob)?, NodeKind::AccountState);
    }
    Ok(tree.root_hash())
}

fn parse_key(input: &str) -> Result<Hash256> {
    let bytes = hex::decode(input)
        .map_err(|_| MalformedKeySnafu { input: input.to_string() }.build())?;
    let key: Hash256 = bytes
        .try_into()
        .map_err(|_| MalformedKeySnafu { input: input.to_string() }.build())?;
    Ok(key)
}

fn hex_bytes(blob: &str) -> Result<Vec<u8>> {
    hex::decode(blob).map_err(|_| MalformedBlobSnafu.build())
}
