//! Deterministic 16-ary radix hash tree.
//!
//! Keys are 256-bit digests; at depth `d` the `d`-th nibble of the
//! key (high nibble first) selects one of sixteen branches. Leaves
//! hash their content under a per-category purpose tag, inner nodes
//! hash the concatenation of their sixteen child hashes, and the root
//! hash commits to the whole key/content set. Because a key's path is
//! a function of the key alone, the root hash is independent of
//! insertion order.
//!
//! The tree is a single-owner builder: insert everything, then read
//! [`ShaMap::root_hash`]. Keys are assumed distinct; inserting two
//! items under one key is a `TreeKeyCollision` precondition
//! violation. The protocol guarantees key uniqueness upstream;
//! insertion does not check for duplicates and the resulting tree
//! is unspecified.

use arbor_ledger_codec::HashPrefix;

use crate::sha512half::{sha512_half, Hash256, Sha512Half, ZERO_256};

/// What category of content a leaf holds.
///
/// The category picks the purpose tag mixed into the leaf hash, so
/// identical bytes in different categories can never collide.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// A transaction without metadata.
    Transaction,
    /// A transaction bundled with its processing metadata.
    TransactionWithMetadata,
    /// A ledger state entry.
    AccountState,
}

impl NodeKind {
    fn prefix(self) -> HashPrefix {
        match self {
            Self::Transaction => HashPrefix::TransactionId,
            Self::TransactionWithMetadata => HashPrefix::TransactionNode,
            Self::AccountState => HashPrefix::LeafNode,
        }
    }
}

/// Keys never exceed 64 nibbles, so neither does the tree.
const MAX_DEPTH: u8 = 64;

enum Node {
    Leaf { key: Hash256, hash: Hash256 },
    Inner(Inner),
}

struct Inner {
    depth: u8,
    branches: [Option<Box<Node>>; 16],
}

impl Inner {
    fn new(depth: u8) -> Self {
        debug_assert!(depth <= MAX_DEPTH);
        Self { depth, branches: Default::default() }
    }

    fn insert(&mut self, key: Hash256, leaf_hash: Hash256) {
        let slot = nibble(&key, self.depth) as usize;
        match &mut self.branches[slot] {
            empty @ None => {
                *empty = Some(Box::new(Node::Leaf { key, hash: leaf_hash }));
            },
            Some(node) => match node.as_mut() {
                Node::Inner(inner) => inner.insert(key, leaf_hash),
                Node::Leaf { key: existing_key, hash: existing_hash } => {
                    // Push the resident leaf one level down, then
                    // insert the newcomer into the same child. The
                    // cascade repeats for as long as the two keys
                    // share nibbles.
                    let mut child = Inner::new(self.depth + 1);
                    child.insert(*existing_key, *existing_hash);
                    child.insert(key, leaf_hash);
                    **node = Node::Inner(child);
                },
            },
        }
    }

    fn hash(&self) -> Hash256 {
        let mut hasher = Sha512Half::with_prefix(HashPrefix::InnerNode);
        for branch in &self.branches {
            match branch {
                None => hasher.update(&ZERO_256),
                Some(node) => match node.as_ref() {
                    Node::Leaf { hash, .. } => hasher.update(hash),
                    Node::Inner(inner) => hasher.update(&inner.hash()),
                },
            }
        }
        hasher.finalize()
    }
}

fn nibble(key: &Hash256, depth: u8) -> u8 {
    let byte = key[usize::from(depth / 2)];
    if depth % 2 == 0 { byte >> 4 } else { byte & 0x0F }
}

/// The tree builder.
///
/// ```
/// use arbor_ledger_hashes::{NodeKind, ShaMap};
///
/// let mut tree = ShaMap::new();
/// tree.add_item([0x11; 32], b"entry".to_vec(), NodeKind::AccountState);
/// let root = tree.root_hash();
/// assert_ne!(root, [0u8; 32]);
/// ```
#[derive(Default)]
pub struct ShaMap {
    root: Option<Inner>,
}

impl ShaMap {
    /// An empty tree. Its root hash is all zeros until the first
    /// insertion.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts content under `key`, hashing it as `kind`.
    ///
    /// The leaf hash commits to the purpose tag, the content bytes,
    /// and the key itself. `key` must be distinct from every key
    /// already inserted; a duplicate is a `TreeKeyCollision`
    /// precondition violation and is not guaranteed to be detected.
    pub fn add_item(&mut self, key: Hash256, bytes: Vec<u8>, kind: NodeKind) {
        let mut hasher = Sha512Half::with_prefix(kind.prefix());
        hasher.update(&bytes);
        hasher.update(&key);
        self.add_prehashed(key, hasher.finalize());
    }

    /// Inserts a leaf whose digest is already known, when the content
    /// itself is not at hand.
    pub fn add_prehashed(&mut self, key: Hash256, digest: Hash256) {
        self.root.get_or_insert_with(|| Inner::new(0)).insert(key, digest);
    }

    /// The root hash over everything inserted so far.
    #[must_use]
    pub fn root_hash(&self) -> Hash256 {
        self.root.as_ref().map_or(ZERO_256, Inner::hash)
    }
}
