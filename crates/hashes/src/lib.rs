//! Ledger hashing: the truncated-SHA-512 digest, the deterministic
//! radix hash tree, and the ledger-level hashes built from both.
//!
//! The tree ([`ShaMap`]) commits to a set of keyed items so that any
//! two parties holding the same set compute the same 256-bit root,
//! regardless of the order they inserted in. [`ledger`] applies it to
//! whole ledgers: transaction IDs, the transaction and state tree
//! roots, and the header hash that seals them.
//!
//! ```
//! use arbor_ledger_hashes::{sha512_half, NodeKind, ShaMap};
//!
//! let mut tree = ShaMap::new();
//! let key = sha512_half(b"some item key material");
//! tree.add_item(key, b"item bytes".to_vec(), NodeKind::AccountState);
//! assert_ne!(tree.root_hash(), [0u8; 32]);
//! ```

pub mod error;
pub mod ledger;
pub mod sha512half;
pub mod shamap;

pub use error::{HashError, Result};
pub use ledger::{
    hash_ledger_header, hash_signed_tx, hash_state_tree, hash_tx_tree, LedgerHeader,
};
pub use sha512half::{sha512_half, Hash256, Sha512Half, ZERO_256};
pub use shamap::{NodeKind, ShaMap};
