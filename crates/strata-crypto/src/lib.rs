//! Content hashing for Strata.
//!
//! Tree node addresses and object checksums are domain-separated BLAKE3
//! hashes, so an object and a tree node with identical encoded bytes never
//! share an address.

pub mod hasher;

pub use hasher::ContentHasher;
