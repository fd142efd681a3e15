use async_trait::async_trait;
use cityweather_core::CityRecord;

use crate::error::CacheStoreResult;

/// Geocode cache keyed by (city, country code).
///
/// Connection context (credentials, app namespace, owner) is bound when the
/// implementation is constructed; calls only name the collection.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Look up the record whose `city` and `country_code` match exactly.
    ///
    /// Matching is case-sensitive and no normalization is applied.
    /// Returns `None` when nothing matches.
    ///
    /// # Errors
    /// `CacheStoreError::Duplicate` when more than one document matches.
    async fn check_cached_city(
        &self,
        collection: &str,
        city: &str,
        country_code: &str,
    ) -> CacheStoreResult<Option<CityRecord>>;

    /// Insert or fully overwrite the record stored under `record.key()`.
    ///
    /// Idempotent: repeating the call leaves the same stored state.
    async fn upsert_city(&self, collection: &str, record: &CityRecord) -> CacheStoreResult<CityRecord>;

    /// Short backend name for log lines.
    fn backend(&self) -> &'static str;
}
