//! # Ephemeral Cache
//!
//! Short-lived memoization in front of the spreadsheet: resolved worksheet
//! handles and full listing payloads. Writes evict the affected collection
//! so a read after a write never sees the pre-write state.
//!
//! Each collection carries a generation that every eviction bumps. A listing
//! is only stored if the generation it was read under is still current, so a
//! read that raced a write cannot repopulate the cache with the old rows.

pub mod ttl;

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::sheets::Worksheet;

pub use ttl::TtlCache;

/// Cache lifetimes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Worksheet handle lifetime in seconds (default: 10)
    #[serde(default = "default_worksheet_ttl")]
    pub worksheet_ttl_secs: u64,

    /// Listing payload lifetime in seconds (default: 5)
    #[serde(default = "default_listing_ttl")]
    pub listing_ttl_secs: u64,
}

fn default_worksheet_ttl() -> u64 {
    10
}

fn default_listing_ttl() -> u64 {
    5
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            worksheet_ttl_secs: default_worksheet_ttl(),
            listing_ttl_secs: default_listing_ttl(),
        }
    }
}

impl CacheConfig {
    /// Caching switched off; every lookup goes to the store
    pub fn disabled() -> Self {
        Self {
            worksheet_ttl_secs: 0,
            listing_ttl_secs: 0,
        }
    }
}

/// Key of a cached listing
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ListingKey {
    pub collection: String,
    /// Lowercased search text, `None` for an unfiltered listing
    pub query: Option<String>,
}

impl ListingKey {
    pub fn new(collection: impl Into<String>, query: Option<&str>) -> Self {
        Self {
            collection: collection.into(),
            query: query.map(str::to_lowercase),
        }
    }
}

/// Per-service cache of worksheet handles and listing payloads
#[derive(Debug)]
pub struct SheetCache {
    worksheet_ttl: Duration,
    listing_ttl: Duration,
    worksheets: TtlCache<String, Worksheet>,
    listings: TtlCache<ListingKey, Value>,
    generations: Mutex<HashMap<String, u64>>,
}

impl SheetCache {
    pub fn new(config: &CacheConfig) -> Self {
        Self {
            worksheet_ttl: Duration::from_secs(config.worksheet_ttl_secs),
            listing_ttl: Duration::from_secs(config.listing_ttl_secs),
            worksheets: TtlCache::new(),
            listings: TtlCache::new(),
            generations: Mutex::new(HashMap::new()),
        }
    }

    pub fn worksheet(&self, collection: &str) -> Option<Worksheet> {
        self.worksheets.get(&collection.to_string())
    }

    pub fn put_worksheet(&self, collection: &str, worksheet: Worksheet) {
        self.worksheets
            .put(collection.to_string(), worksheet, self.worksheet_ttl);
    }

    pub fn listing(&self, key: &ListingKey) -> Option<Value> {
        self.listings.get(key)
    }

    /// Current generation of `collection`; read it before going to the store
    pub fn generation(&self, collection: &str) -> u64 {
        let generations = self.generations.lock().unwrap_or_else(|e| e.into_inner());
        generations.get(collection).copied().unwrap_or(0)
    }

    /// Store a listing read under `generation`.
    /// Returns false, storing nothing, if the collection was evicted since.
    pub fn put_listing(&self, key: ListingKey, payload: Value, generation: u64) -> bool {
        let generations = self.generations.lock().unwrap_or_else(|e| e.into_inner());
        if generations.get(&key.collection).copied().unwrap_or(0) != generation {
            return false;
        }
        self.listings.put(key, payload, self.listing_ttl);
        true
    }

    /// Evict the handle and every listing of `collection`
    pub fn invalidate_collection(&self, collection: &str) {
        let mut generations = self.generations.lock().unwrap_or_else(|e| e.into_inner());
        *generations.entry(collection.to_string()).or_insert(0) += 1;

        let handle = self.worksheets.invalidate(&collection.to_string());
        let listings = self
            .listings
            .invalidate_where(|key| key.collection == collection);
        tracing::debug!(collection, handle, listings, "cache invalidated");
    }
}
