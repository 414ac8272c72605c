//! The protocol digest: SHA-512 truncated to its first 256 bits.

use sha2::{Digest, Sha512};

use arbor_ledger_codec::HashPrefix;

/// A 256-bit digest or tree key.
pub type Hash256 = [u8; 32];

/// The all-zero digest, used for empty tree slots and the empty tree
/// root.
pub const ZERO_256: Hash256 = [0u8; 32];

/// Hashes `data` with SHA-512 and keeps the first 32 bytes.
#[must_use]
pub fn sha512_half(data: &[u8]) -> Hash256 {
    let digest = Sha512::digest(data);
    let mut out = ZERO_256;
    out.copy_from_slice(&digest[..32]);
    out
}

/// Incremental form of [`sha512_half`] for multi-part inputs.
#[derive(Default)]
pub struct Sha512Half {
    inner: Sha512,
}

impl Sha512Half {
    /// Starts an empty digest.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a digest with a 4-byte purpose tag already absorbed.
    #[must_use]
    pub fn with_prefix(prefix: HashPrefix) -> Self {
        let mut hasher = Self::new();
        hasher.update(&prefix.bytes());
        hasher
    }

    /// Absorbs more input.
    pub fn update(&mut self, data: &[u8]) {
        self.inner.update(data);
    }

    /// Finishes and returns the truncated digest.
    #[must_use]
    pub fn finalize(self) -> Hash256 {
        let digest = self.inner.finalize();
        let mut out = ZERO_256;
        out.copy_from_slice(&digest[..32]);
        out
    }
}
