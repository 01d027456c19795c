//! # Inventory Service
//!
//! List, create, update and delete parts in a category worksheet.
//!
//! ## Invariants
//! - Input is validated before any store call
//! - Every write evicts the collection from the cache, also when it fails half-way
//! - Writes to one collection are serialized within this process
//! - A write is followed by a bounded read-back, never a blind sleep

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

use super::allocator::next_id;
use super::errors::{InventoryError, InventoryResult};
use super::part::{record_id, PartField, PartPayload};
use super::search::{filter_records, normalize_query};
use crate::cache::{CacheConfig, ListingKey, SheetCache};
use crate::sheets::{Record, TabularStore, Worksheet};

/// Page listed when the request names none
pub const DEFAULT_PAGE: &str = "freios";

/// Read-back after writes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsistencyConfig {
    /// Reads attempted before giving up (default: 3, 0 disables the check)
    #[serde(default = "default_attempts")]
    pub attempts: u32,

    /// Pause between reads in milliseconds (default: 250)
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,
}

fn default_attempts() -> u32 {
    3
}

fn default_interval_ms() -> u64 {
    250
}

impl Default for ConsistencyConfig {
    fn default() -> Self {
        Self {
            attempts: default_attempts(),
            interval_ms: default_interval_ms(),
        }
    }
}

/// Service settings
#[derive(Debug, Clone)]
pub struct ServiceOptions {
    pub default_page: String,
    pub cache: CacheConfig,
    pub consistency: ConsistencyConfig,
}

impl Default for ServiceOptions {
    fn default() -> Self {
        Self {
            default_page: DEFAULT_PAGE.to_string(),
            cache: CacheConfig::default(),
            consistency: ConsistencyConfig::default(),
        }
    }
}

/// Listing response body
#[derive(Debug, Clone, Serialize)]
pub struct Listing {
    pub pagina: String,
    pub total: usize,
    pub dados: Vec<Record>,
}

type WriteLocks = Mutex<HashMap<String, Arc<AsyncMutex<()>>>>;

/// Inventory operations over a tabular store
#[derive(Debug)]
pub struct InventoryService {
    store: Arc<dyn TabularStore>,
    cache: SheetCache,
    default_page: String,
    consistency: ConsistencyConfig,
    write_locks: WriteLocks,
}

impl InventoryService {
    pub fn new(store: Arc<dyn TabularStore>, options: ServiceOptions) -> Self {
        Self {
            store,
            cache: SheetCache::new(&options.cache),
            default_page: options.default_page,
            consistency: options.consistency,
            write_locks: Mutex::new(HashMap::new()),
        }
    }

    pub fn default_page(&self) -> &str {
        &self.default_page
    }

    /// List a category, optionally filtered by free text.
    /// Returns the serialized `{pagina, total, dados}` body.
    pub async fn list(&self, page: Option<&str>, query: Option<&str>) -> InventoryResult<Value> {
        let page = page
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .unwrap_or(self.default_page.as_str())
            .to_string();
        let query = normalize_query(query);

        let key = ListingKey::new(page.clone(), query.as_deref());
        if let Some(cached) = self.cache.listing(&key) {
            tracing::debug!(page = %page, "listing served from cache");
            return Ok(cached);
        }

        let generation = self.cache.generation(&page);
        let worksheet = self.worksheet(&page).await?;
        let records = self.store.get_all_records(&worksheet).await?;
        let dados = filter_records(records, query.as_deref());

        let listing = Listing {
            pagina: page,
            total: dados.len(),
            dados,
        };
        let payload = serde_json::to_value(&listing)
            .map_err(|e| InventoryError::Internal(format!("Failed to serialize listing: {}", e)))?;

        if !self.cache.put_listing(key, payload.clone(), generation) {
            tracing::debug!(page = %listing.pagina, "listing raced a write, not cached");
        }
        Ok(payload)
    }

    /// Append a new part and return its allocated identifier
    pub async fn create(&self, payload: &PartPayload) -> InventoryResult<String> {
        let worksheet = self.worksheet(payload.category()).await?;
        let _guard = self.lock_collection(&worksheet.title).await;

        let ids = self.existing_ids(&worksheet).await?;
        let id = next_id(&ids);

        let result = self
            .store
            .append_row(&worksheet, payload.new_row(&id))
            .await;
        self.cache.invalidate_collection(&worksheet.title);
        result?;

        self.settle(&worksheet, &id, true).await;
        tracing::info!(collection = %worksheet.title, id = %id, "part created");
        Ok(id)
    }

    /// Overwrite the fields present in `payload` on the part with identifier `id`
    pub async fn update(&self, id: &str, payload: &PartPayload) -> InventoryResult<()> {
        let worksheet = self.worksheet(payload.category()).await?;
        let _guard = self.lock_collection(&worksheet.title).await;

        let row = self.find_row(&worksheet, id).await?;

        let updates = payload.updates();
        let result = self.write_cells(&worksheet, row, &updates).await;
        self.cache.invalidate_collection(&worksheet.title);
        result?;

        tracing::info!(
            collection = %worksheet.title,
            id = %id,
            row,
            fields = updates.len(),
            "part updated"
        );
        Ok(())
    }

    /// Remove the part with identifier `id` from `category`
    pub async fn delete(&self, id: &str, category: &str) -> InventoryResult<()> {
        let worksheet = self.worksheet(category).await?;
        let _guard = self.lock_collection(&worksheet.title).await;

        let row = self.find_row(&worksheet, id).await?;

        let result = self.store.delete_row(&worksheet, row).await;
        self.cache.invalidate_collection(&worksheet.title);
        result?;

        self.settle(&worksheet, id, false).await;
        tracing::info!(collection = %worksheet.title, id = %id, row, "part deleted");
        Ok(())
    }

    /// Title of the underlying spreadsheet; doubles as a connectivity check
    pub async fn spreadsheet_title(&self) -> InventoryResult<String> {
        Ok(self.store.spreadsheet_title().await?)
    }

    // ==================
    // Helpers
    // ==================

    async fn worksheet(&self, name: &str) -> InventoryResult<Worksheet> {
        if let Some(worksheet) = self.cache.worksheet(name) {
            return Ok(worksheet);
        }

        let worksheet = self.store.worksheet(name).await?;
        self.cache.put_worksheet(name, worksheet.clone());
        Ok(worksheet)
    }

    /// Identifier column without its header
    async fn existing_ids(&self, worksheet: &Worksheet) -> InventoryResult<Vec<String>> {
        let column = self
            .store
            .col_values(worksheet, PartField::Id.column())
            .await?;
        Ok(column.into_iter().skip(1).collect())
    }

    /// Sheet row of the first part whose identifier equals `id`
    async fn find_row(&self, worksheet: &Worksheet, id: &str) -> InventoryResult<usize> {
        let records = self.store.get_all_records(worksheet).await?;
        records
            .iter()
            .position(|record| record_id(record) == id)
            // +1 for the header row, +1 for 1-based rows
            .map(|index| index + 2)
            .ok_or_else(|| InventoryError::part_not_found(id))
    }

    async fn write_cells(
        &self,
        worksheet: &Worksheet,
        row: usize,
        updates: &[(PartField, String)],
    ) -> InventoryResult<()> {
        for (field, text) in updates {
            self.store
                .update_cell(worksheet, row, field.column(), text.clone())
                .await?;
        }
        Ok(())
    }

    /// Serialize writers of one existing worksheet
    async fn lock_collection(&self, title: &str) -> CollectionGuard<'_> {
        let lock = {
            let mut locks = self.write_locks.lock().unwrap_or_else(|e| e.into_inner());
            locks.entry(title.to_string()).or_default().clone()
        };

        CollectionGuard {
            locks: &self.write_locks,
            title: title.to_string(),
            guard: Some(lock.lock_owned().await),
        }
    }

    /// Re-read the identifier column until `id` is (or is no longer) visible
    async fn settle(&self, worksheet: &Worksheet, id: &str, present: bool) {
        let interval = Duration::from_millis(self.consistency.interval_ms);

        for attempt in 0..self.consistency.attempts {
            if attempt > 0 {
                tokio::time::sleep(interval).await;
            }

            match self.existing_ids(worksheet).await {
                Ok(ids) if ids.iter().any(|v| v.trim() == id) == present => return,
                Ok(_) => {}
                Err(e) => {
                    tracing::warn!(collection = %worksheet.title, id, error = %e, "read-back failed");
                    return;
                }
            }
        }

        if self.consistency.attempts > 0 {
            tracing::warn!(
                collection = %worksheet.title,
                id,
                attempts = self.consistency.attempts,
                "write not yet visible after read-back"
            );
        }
    }
}

/// Write lock on one collection; the map entry goes away with its last holder
struct CollectionGuard<'a> {
    locks: &'a WriteLocks,
    title: String,
    guard: Option<OwnedMutexGuard<()>>,
}

impl Drop for CollectionGuard<'_> {
    fn drop(&mut self) {
        // Release first so the count below only sees the map and any waiters
        drop(self.guard.take());

        let mut locks = self.locks.lock().unwrap_or_else(|e| e.into_inner());
        if locks
            .get(&self.title)
            .is_some_and(|lock| Arc::strong_count(lock) == 1)
        {
            locks.remove(&self.title);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inventory::part::HEADER;
    use crate::sheets::{InMemoryStore, SheetsError, SheetsResult};
    use serde_json::json;

    fn setup() -> (Arc<InMemoryStore>, InventoryService) {
        let store = Arc::new(InMemoryStore::new("Estoque"));
        store.add_worksheet("freios", &HEADER);
        let service = InventoryService::new(store.clone(), ServiceOptions::default());
        (store, service)
    }

    fn payload(body: Value) -> PartPayload {
        PartPayload::from_json(body).unwrap()
    }

    #[tokio::test]
    async fn test_create_in_empty_collection() {
        let (store, service) = setup();
        let id = service
            .create(&payload(json!({"categoria": "freios", "peca": "Disco"})))
            .await
            .unwrap();

        assert_eq!(id, "1");
        let rows = store.rows("freios").unwrap();
        assert_eq!(rows[1], vec!["1", "Disco", "", "", "", "", "", ""]);
    }

    #[tokio::test]
    async fn test_create_continues_prefixed_scheme() {
        let (store, service) = setup();
        store.seed_rows("freios", vec![vec!["FRS-001"], vec!["FRS-004"]]);

        let id = service
            .create(&payload(json!({"categoria": "freios"})))
            .await
            .unwrap();
        assert_eq!(id, "FRS-005");
    }

    #[tokio::test]
    async fn test_list_is_cached_until_write() {
        let (store, service) = setup();
        store.seed_rows("freios", vec![vec!["1", "Disco"]]);

        let first = service.list(None, None).await.unwrap();
        assert_eq!(first["total"], json!(1));

        // Direct store change is invisible while cached
        store.seed_rows("freios", vec![vec!["2", "Cabo"]]);
        let cached = service.list(Some("freios"), None).await.unwrap();
        assert_eq!(cached["total"], json!(1));

        // A write through the service evicts the listing
        service
            .create(&payload(json!({"categoria": "freios", "peca": "Pastilha"})))
            .await
            .unwrap();
        let fresh = service.list(Some("freios"), None).await.unwrap();
        assert_eq!(fresh["total"], json!(3));
    }

    #[tokio::test]
    async fn test_list_unknown_page() {
        let (_store, service) = setup();
        let err = service.list(Some("motor"), None).await.unwrap_err();
        assert!(matches!(err, InventoryError::NotFound(m) if m.contains("motor")));
    }

    #[tokio::test]
    async fn test_update_writes_only_given_fields() {
        let (store, service) = setup();
        store.seed_rows(
            "freios",
            vec![
                vec!["1", "Disco", "4", "Ferro", "", "", "", "Bosch"],
                vec!["2", "Cabo", "1", "Aço", "", "", "", "Fras-le"],
            ],
        );

        service
            .update(
                "2",
                &payload(json!({"categoria": "freios", "quantidade": 10, "fornecedor": "Cofap"})),
            )
            .await
            .unwrap();

        let rows = store.rows("freios").unwrap();
        assert_eq!(rows[2], vec!["2", "Cabo", "10", "Aço", "", "", "", "Cofap"]);
        assert_eq!(rows[1][2], "4");
    }

    #[tokio::test]
    async fn test_update_unknown_id_leaves_rows_alone() {
        let (store, service) = setup();
        store.seed_rows("freios", vec![vec!["1", "Disco"]]);
        let before = store.rows("freios").unwrap();

        let err = service
            .update("9", &payload(json!({"categoria": "freios", "peca": "X"})))
            .await
            .unwrap_err();

        assert!(matches!(err, InventoryError::NotFound(_)));
        assert_eq!(store.rows("freios").unwrap(), before);
    }

    #[tokio::test]
    async fn test_delete_first_match_only() {
        let (store, service) = setup();
        store.seed_rows("freios", vec![vec!["1", "A"], vec!["2", "B"], vec!["1", "C"]]);

        service.delete("1", "freios").await.unwrap();

        let rows = store.rows("freios").unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[1][1], "B");
        assert_eq!(rows[2][1], "C");
    }

    #[tokio::test]
    async fn test_upstream_failure_surfaces() {
        let (store, service) = setup();
        store.seed_rows("freios", vec![vec!["1", "Disco"]]);
        service.list(None, None).await.unwrap();

        store.fail_next(SheetsError::Api {
            status: 503,
            message: "unavailable".to_string(),
        });
        let err = service
            .create(&payload(json!({"categoria": "freios"})))
            .await
            .unwrap_err();
        assert!(matches!(err, InventoryError::Upstream { status: 503, .. }));
    }

    /// Store whose full-sheet reads snapshot first and return late
    #[derive(Debug)]
    struct SlowReads {
        inner: Arc<InMemoryStore>,
        delay: Duration,
    }

    #[async_trait::async_trait]
    impl TabularStore for SlowReads {
        async fn spreadsheet_title(&self) -> SheetsResult<String> {
            self.inner.spreadsheet_title().await
        }

        async fn worksheet(&self, title: &str) -> SheetsResult<Worksheet> {
            self.inner.worksheet(title).await
        }

        async fn get_all_records(&self, worksheet: &Worksheet) -> SheetsResult<Vec<Record>> {
            let records = self.inner.get_all_records(worksheet).await;
            tokio::time::sleep(self.delay).await;
            records
        }

        async fn col_values(&self, worksheet: &Worksheet, col: usize) -> SheetsResult<Vec<String>> {
            self.inner.col_values(worksheet, col).await
        }

        async fn append_row(&self, worksheet: &Worksheet, values: Vec<String>) -> SheetsResult<()> {
            self.inner.append_row(worksheet, values).await
        }

        async fn update_cell(
            &self,
            worksheet: &Worksheet,
            row: usize,
            col: usize,
            value: String,
        ) -> SheetsResult<()> {
            self.inner.update_cell(worksheet, row, col, value).await
        }

        async fn delete_row(&self, worksheet: &Worksheet, row: usize) -> SheetsResult<()> {
            self.inner.delete_row(worksheet, row).await
        }
    }

    #[tokio::test]
    async fn test_listing_read_during_create_is_not_cached() {
        let inner = Arc::new(InMemoryStore::new("Estoque"));
        inner.add_worksheet("freios", &HEADER);
        inner.seed_rows("freios", vec![vec!["1", "Disco"]]);
        let store = Arc::new(SlowReads {
            inner,
            delay: Duration::from_millis(200),
        });
        let service = Arc::new(InventoryService::new(store, ServiceOptions::default()));

        let slow_list = {
            let service = service.clone();
            tokio::spawn(async move { service.list(None, None).await.unwrap() })
        };
        tokio::time::sleep(Duration::from_millis(50)).await;

        let id = service
            .create(&payload(json!({"categoria": "freios", "peca": "Cabo"})))
            .await
            .unwrap();
        assert_eq!(id, "2");

        // Snapshot taken before the create
        assert_eq!(slow_list.await.unwrap()["total"], json!(1));

        let after = service.list(None, None).await.unwrap();
        assert_eq!(after["total"], json!(2));
    }

    #[tokio::test]
    async fn test_write_locks_do_not_accumulate() {
        let (store, service) = setup();
        store.seed_rows("freios", vec![vec!["1", "Disco"]]);

        for i in 0..50 {
            let body = json!({"categoria": format!("nope-{}", i)});
            let err = service.create(&payload(body)).await.unwrap_err();
            assert!(matches!(err, InventoryError::NotFound(_)));
        }
        assert!(service.update("1", &payload(json!({"categoria": "outra"}))).await.is_err());
        assert!(service.delete("1", "outra").await.is_err());

        service
            .create(&payload(json!({"categoria": "freios"})))
            .await
            .unwrap();
        service.delete("1", "freios").await.unwrap();

        assert!(service.write_locks.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_concurrent_creates_get_distinct_ids() {
        let (_store, service) = setup();
        let service = Arc::new(service);

        let mut handles = Vec::new();
        for _ in 0..8 {
            let service = service.clone();
            handles.push(tokio::spawn(async move {
                service
                    .create(&PartPayload::from_json(json!({"categoria": "freios"})).unwrap())
                    .await
                    .unwrap()
            }));
        }

        let mut ids = Vec::new();
        for handle in handles {
            ids.push(handle.await.unwrap());
        }
        ids.sort_by_key(|id| id.parse::<u32>().unwrap());
        assert_eq!(ids, vec!["1", "2", "3", "4", "5", "6", "7", "8"]);
    }
}
