//! The lookup cache: normalized key to last-known record.
//!
//! Serves searches without a network round-trip and doubles as the offline
//! read path. Entries are created or overwritten on every successful search
//! or local edit and never explicitly deleted, so the mapping grows
//! monotonically, bounded only by storage capacity.

use crate::error::{Error, Result};
use crate::record::{normalize_key, InventoryRecord};
use std::collections::HashMap;

/// In-memory mapping from normalized lookup key to the most recently known
/// record. Persisted as an ordered list of (key, record) pairs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LookupCache {
    entries: HashMap<String, InventoryRecord>,
}

impl LookupCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a cache from persisted (key, record) pairs.
    ///
    /// Keys are re-normalized on the way in; later pairs win on collision.
    pub fn from_entries(entries: Vec<(String, InventoryRecord)>) -> Self {
        let entries = entries
            .into_iter()
            .map(|(key, record)| (normalize_key(&key), record))
            .collect();
        Self { entries }
    }

    /// Look up a record by scanned or typed code. The code is normalized
    /// before the lookup.
    pub fn get(&self, code: &str) -> Option<&InventoryRecord> {
        self.entries.get(&normalize_key(code))
    }

    /// Index a record under both of its keys (SKU and package id).
    ///
    /// Fails only when the record carries neither key and so cannot be
    /// found again.
    pub fn insert(&mut self, record: InventoryRecord) -> Result<()> {
        let keys = record.cache_keys();
        if keys.is_empty() {
            return Err(Error::MissingKey);
        }
        for key in keys {
            self.entries.insert(key, record.clone());
        }
        Ok(())
    }

    /// Number of distinct keys in the cache.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check whether the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Export the mapping as (key, record) pairs sorted by key, the shape
    /// the durable store persists.
    pub fn entries(&self) -> Vec<(String, InventoryRecord)> {
        let mut pairs: Vec<_> = self
            .entries
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        pairs.sort_by(|a, b| a.0.cmp(&b.0));
        pairs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(sku: &str, package_id: &str, location: &str) -> InventoryRecord {
        InventoryRecord {
            sku: sku.into(),
            package_id: package_id.into(),
            location: location.into(),
            ..Default::default()
        }
    }

    #[test]
    fn insert_indexes_both_keys() {
        let mut cache = LookupCache::new();
        cache.insert(record("SKU-001", "PK-9", "A-1")).unwrap();

        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get("sku-001").unwrap().location, "A-1");
        assert_eq!(cache.get("PK-9").unwrap().location, "A-1");
    }

    #[test]
    fn lookup_normalizes_input() {
        let mut cache = LookupCache::new();
        cache.insert(record("SKU-001", "", "A-1")).unwrap();

        assert!(cache.get("  sku-001 ").is_some());
        assert!(cache.get("SKU-001\n").is_some());
        assert!(cache.get("sku-002").is_none());
    }

    #[test]
    fn insert_overwrites_with_latest() {
        let mut cache = LookupCache::new();
        cache.insert(record("SKU-001", "PK-9", "A-1")).unwrap();
        cache.insert(record("SKU-001", "PK-9", "B-7")).unwrap();

        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get("pk-9").unwrap().location, "B-7");
    }

    #[test]
    fn keyless_record_is_rejected() {
        let mut cache = LookupCache::new();
        let err = cache.insert(record("", "", "A-1")).unwrap_err();
        assert_eq!(err, Error::MissingKey);
        assert!(cache.is_empty());
    }

    #[test]
    fn entries_roundtrip() {
        let mut cache = LookupCache::new();
        cache.insert(record("SKU-002", "", "B-2")).unwrap();
        cache.insert(record("SKU-001", "PK-9", "A-1")).unwrap();

        let pairs = cache.entries();
        let keys: Vec<_> = pairs.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["pk-9", "sku-001", "sku-002"]);

        let restored = LookupCache::from_entries(pairs);
        assert_eq!(restored, cache);
    }

    #[test]
    fn from_entries_renormalizes_keys() {
        let cache =
            LookupCache::from_entries(vec![(" SKU-001 ".into(), record("SKU-001", "", "A-1"))]);
        assert!(cache.get("sku-001").is_some());
    }
}
