//! Geocode cache for the city weather input.
//!
//! `CacheStore` is the capability the orchestrator depends on. Two
//! implementations: `KvStoreClient` talks to the Splunk KV store over the
//! management REST API, `MemoryCacheStore` keeps documents in a map for tests
//! and local runs.

pub mod error;
pub mod kvstore;
pub mod memory;
pub mod store;

pub use error::{CacheStoreError, CacheStoreResult, DuplicateRecordError};
pub use kvstore::{KvStoreClient, KvStoreConnection};
pub use memory::MemoryCacheStore;
pub use store::CacheStore;
