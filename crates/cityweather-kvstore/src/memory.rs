//! Map-backed cache store.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use cityweather_core::CityRecord;
use parking_lot::Mutex;

use crate::error::{CacheStoreError, CacheStoreResult, DuplicateRecordError};
use crate::store::CacheStore;

/// In-memory stand-in for the KV store.
///
/// Behaves like the real store where the orchestrator can tell: collections
/// must exist before use, documents are keyed by `{city}-{country_code}` and
/// upserts overwrite whole documents.
#[derive(Debug, Default)]
pub struct MemoryCacheStore {
    collections: Mutex<HashMap<String, BTreeMap<String, CityRecord>>>,
}

impl MemoryCacheStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store with one empty collection.
    pub fn with_collection(name: &str) -> Self {
        let store = Self::new();
        store.create_collection(name);
        store
    }

    /// Create `name` if it does not exist yet.
    pub fn create_collection(&self, name: &str) {
        self.collections.lock().entry(name.to_string()).or_default();
    }

    /// Delete every document in `collection`.
    pub fn clear(&self, collection: &str) {
        if let Some(docs) = self.collections.lock().get_mut(collection) {
            docs.clear();
        }
    }

    /// Snapshot of `collection` as (key, record) pairs, ordered by key.
    pub fn documents(&self, collection: &str) -> Vec<(String, CityRecord)> {
        self.collections
            .lock()
            .get(collection)
            .map(|docs| docs.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
            .unwrap_or_default()
    }

    /// Store `record` under an arbitrary key, bypassing the key discipline.
    ///
    /// Lets tests seed collections the way a foreign writer would.
    pub fn insert_raw(&self, collection: &str, key: &str, record: CityRecord) {
        self.collections
            .lock()
            .entry(collection.to_string())
            .or_default()
            .insert(key.to_string(), record);
    }
}

#[async_trait]
impl CacheStore for MemoryCacheStore {
    async fn check_cached_city(
        &self,
        collection: &str,
        city: &str,
        country_code: &str,
    ) -> CacheStoreResult<Option<CityRecord>> {
        let collections = self.collections.lock();
        let docs = collections
            .get(collection)
            .ok_or_else(|| CacheStoreError::CollectionNotFound(collection.to_string()))?;

        let mut matches: Vec<&CityRecord> = docs
            .values()
            .filter(|record| record.matches(city, country_code))
            .collect();

        match matches.len() {
            0 => Ok(None),
            1 => Ok(matches.pop().cloned()),
            n => Err(DuplicateRecordError {
                city: city.to_string(),
                country_code: country_code.to_string(),
                matches: n,
            }
            .into()),
        }
    }

    async fn upsert_city(&self, collection: &str, record: &CityRecord) -> CacheStoreResult<CityRecord> {
        let mut collections = self.collections.lock();
        let docs = collections
            .get_mut(collection)
            .ok_or_else(|| CacheStoreError::CollectionNotFound(collection.to_string()))?;

        docs.insert(record.key(), record.clone());
        Ok(record.clone())
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const COLL: &str = "city_geo";

    #[tokio::test]
    async fn test_miss_insert_hit_update() {
        let store = MemoryCacheStore::with_collection(COLL);

        let found = store.check_cached_city(COLL, "guanacaste", "CR").await.unwrap();
        assert!(found.is_none());

        let created = store
            .upsert_city(COLL, &CityRecord::new("guanacaste", "CR", 10.5, -85.4))
            .await
            .unwrap();
        assert_eq!((created.lat, created.lon), (10.5, -85.4));

        let found = store.check_cached_city(COLL, "guanacaste", "CR").await.unwrap();
        assert_eq!(found.map(|r| r.lon), Some(-85.4));

        store
            .upsert_city(COLL, &CityRecord::new("guanacaste", "CR", 10.6, -85.5))
            .await
            .unwrap();
        let found = store
            .check_cached_city(COLL, "guanacaste", "CR")
            .await
            .unwrap()
            .unwrap();
        assert_eq!((found.lat, found.lon), (10.6, -85.5));
        assert_eq!(store.documents(COLL).len(), 1);
    }

    #[tokio::test]
    async fn test_upsert_is_idempotent() {
        let store = MemoryCacheStore::with_collection(COLL);
        let record = CityRecord::new("guanacaste", "CR", 10.5, -85.4);

        store.upsert_city(COLL, &record).await.unwrap();
        let once = store.documents(COLL);
        store.upsert_city(COLL, &record).await.unwrap();
        let twice = store.documents(COLL);

        assert_eq!(once, twice);
        assert_eq!(twice, vec![("guanacaste-CR".to_string(), record)]);
    }

    #[tokio::test]
    async fn test_lookup_is_case_sensitive() {
        let store = MemoryCacheStore::with_collection(COLL);
        store
            .upsert_city(COLL, &CityRecord::new("guanacaste", "CR", 10.5, -85.4))
            .await
            .unwrap();

        assert!(store
            .check_cached_city(COLL, "Guanacaste", "CR")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_missing_collection() {
        let store = MemoryCacheStore::new();

        let err = store.check_cached_city(COLL, "guanacaste", "CR").await.unwrap_err();
        assert!(matches!(err, CacheStoreError::CollectionNotFound(ref c) if c == COLL));

        let err = store
            .upsert_city(COLL, &CityRecord::new("guanacaste", "CR", 10.5, -85.4))
            .await
            .unwrap_err();
        assert!(matches!(err, CacheStoreError::CollectionNotFound(_)));
    }

    #[tokio::test]
    async fn test_duplicate_records_fail() {
        let store = MemoryCacheStore::with_collection(COLL);
        store.insert_raw(COLL, "a", CityRecord::new("guanacaste", "CR", 10.5, -85.4));
        store.insert_raw(COLL, "b", CityRecord::new("guanacaste", "CR", 10.6, -85.5));

        let err = store.check_cached_city(COLL, "guanacaste", "CR").await.unwrap_err();
        assert!(matches!(err, CacheStoreError::Duplicate(ref d) if d.matches == 2));
    }

    #[tokio::test]
    async fn test_clear() {
        let store = MemoryCacheStore::with_collection(COLL);
        store
            .upsert_city(COLL, &CityRecord::new("guanacaste", "CR", 10.5, -85.4))
            .await
            .unwrap();
        store.clear(COLL);
        assert!(store.documents(COLL).is_empty());
        assert!(store
            .check_cached_city(COLL, "guanacaste", "CR")
            .await
            .unwrap()
            .is_none());
    }
}
