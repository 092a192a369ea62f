//! Key Index
//!
//! Maps keys to the offsets of their live records. Persisted as an ordinary
//! record through the binary codec.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::codec;
use crate::error::Result;

/// Key → record offset mapping
///
/// A key without a live record is simply absent. BTreeMap keeps the
/// serialized form deterministic for a given key set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyIndex {
    links: BTreeMap<String, u64>,
}

impl KeyIndex {
    /// Create an empty index
    pub fn new() -> Self {
        Self::default()
    }

    /// Offset of the record for `key`
    pub fn get(&self, key: &str) -> Option<u64> {
        self.links.get(key).copied()
    }

    /// Point `key` at `offset`, returning the previous offset
    pub fn put(&mut self, key: impl Into<String>, offset: u64) -> Option<u64> {
        self.links.insert(key.into(), offset)
    }

    /// Drop `key`, returning its offset if it was present
    pub fn remove(&mut self, key: &str) -> Option<u64> {
        self.links.remove(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.links.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    /// Keys in sorted order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.links.keys().map(String::as_str)
    }

    /// `(key, offset)` pairs in sorted key order
    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.links.iter().map(|(k, &offset)| (k.as_str(), offset))
    }

    /// Serialize for storage as a record
    pub fn encode(&self) -> Result<Vec<u8>> {
        codec::encode(self)
    }

    /// Deserialize a persisted index record
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        codec::decode(bytes)
    }
}
