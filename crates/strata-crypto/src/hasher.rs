use strata_types::Address;

/// Domain-separated BLAKE3 content hasher.
///
/// Each hasher carries a domain tag (e.g. `"strata-tree-v1"`) that is
/// prepended to every hash computation.
pub struct ContentHasher {
    domain: &'static str,
}

impl ContentHasher {
    /// Hasher for object contents and object leaf addresses.
    pub const OBJECT: Self = Self {
        domain: "strata-object-v1",
    };
    /// Hasher for encoded tree nodes.
    pub const TREE: Self = Self {
        domain: "strata-tree-v1",
    };

    /// Hash raw bytes with domain separation.
    pub fn hash(&self, data: &[u8]) -> Address {
        let mut hasher = blake3::Hasher::new();
        hasher.update(self.domain.as_bytes());
        hasher.update(b":");
        hasher.update(data);
        Address::from_hash(*hasher.finalize().as_bytes())
    }
}
