//! Protocol hash prefixes.
//!
//! Every hash computed over canonical bytes is tagged with a fixed
//! 4-byte prefix identifying the semantic category of the hashed
//! content. Two byte-identical payloads hashed under different
//! prefixes can never collide across categories.

/// Semantic category tag prepended before hashing canonical bytes.
///
/// The numeric values spell a short ASCII mnemonic followed by a zero
/// byte, and are serialized big-endian.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HashPrefix {
    /// Identifier of a signed transaction (`TXN\0`).
    TransactionId,
    /// Transaction plus its metadata, as stored in the transaction tree (`SND\0`).
    TransactionNode,
    /// Account-state leaf node (`MLN\0`).
    LeafNode,
    /// Inner node of the hash tree (`MIN\0`).
    InnerNode,
    /// Ledger header (`LWR\0`).
    LedgerHeader,
    /// Payload of a single-signer signature (`STX\0`).
    Signing,
    /// Payload of a multi-signer signature (`SMT\0`).
    MultiSigning,
}

impl HashPrefix {
    /// Returns the prefix as a `u32`.
    #[must_use]
    pub const fn value(self) -> u32 {
        match self {
            Self::TransactionId => 0x5458_4E00,
            Self::TransactionNode => 0x534E_4400,
            Self::LeafNode => 0x4D4C_4E00,
            Self::InnerNode => 0x4D49_4E00,
            Self::LedgerHeader => 0x4C57_5200,
            Self::Signing => 0x5354_5800,
            Self::MultiSigning => 0x534D_5400,
        }
    }

    /// Returns the prefix as the 4 bytes that go on the wire.
    #[must_use]
    pub const fn bytes(self) -> [u8; 4] {
        self.value().to_be_bytes()
    }
}
