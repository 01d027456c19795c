//! # In-Memory Store
//!
//! A `TabularStore` held entirely in process. Used by the test suite and by
//! `pecas serve --in-memory`.

use std::collections::BTreeMap;
use std::sync::{Mutex, RwLock};

use async_trait::async_trait;

use super::errors::{SheetsError, SheetsResult};
use super::store::{records_from_grid, Record, TabularStore, Worksheet};

#[derive(Debug)]
struct Sheet {
    sheet_id: i64,
    /// Row 0 is the header
    grid: Vec<Vec<String>>,
}

/// In-memory spreadsheet
#[derive(Debug)]
pub struct InMemoryStore {
    title: String,
    sheets: RwLock<BTreeMap<String, Sheet>>,
    injected_failure: Mutex<Option<SheetsError>>,
}

impl InMemoryStore {
    /// Create an empty spreadsheet with no worksheets
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            sheets: RwLock::new(BTreeMap::new()),
            injected_failure: Mutex::new(None),
        }
    }

    /// Add (or replace) a worksheet with the given header row and no data
    pub fn add_worksheet(&self, title: &str, header: &[&str]) {
        let mut sheets = self.sheets.write().unwrap_or_else(|e| e.into_inner());
        let sheet_id = sheets.len() as i64;
        sheets.insert(
            title.to_string(),
            Sheet {
                sheet_id,
                grid: vec![header.iter().map(|h| h.to_string()).collect()],
            },
        );
    }

    /// Append raw data rows to an existing worksheet
    pub fn seed_rows(&self, title: &str, rows: Vec<Vec<&str>>) {
        let mut sheets = self.sheets.write().unwrap_or_else(|e| e.into_inner());
        if let Some(sheet) = sheets.get_mut(title) {
            sheet
                .grid
                .extend(rows.into_iter().map(|r| r.into_iter().map(str::to_string).collect()));
        }
    }

    /// Raw grid (header included) of a worksheet
    pub fn rows(&self, title: &str) -> Option<Vec<Vec<String>>> {
        let sheets = self.sheets.read().unwrap_or_else(|e| e.into_inner());
        sheets.get(title).map(|s| s.grid.clone())
    }

    /// Make the next store call fail with `err`
    pub fn fail_next(&self, err: SheetsError) {
        *self.injected_failure.lock().unwrap_or_else(|e| e.into_inner()) = Some(err);
    }

    fn check_failure(&self) -> SheetsResult<()> {
        match self
            .injected_failure
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take()
        {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn with_sheet<T>(
        &self,
        worksheet: &Worksheet,
        f: impl FnOnce(&mut Sheet) -> SheetsResult<T>,
    ) -> SheetsResult<T> {
        self.check_failure()?;
        let mut sheets = self.sheets.write().unwrap_or_else(|e| e.into_inner());
        let sheet = sheets
            .get_mut(&worksheet.title)
            .ok_or_else(|| SheetsError::WorksheetNotFound(worksheet.title.clone()))?;
        f(sheet)
    }
}

#[async_trait]
impl TabularStore for InMemoryStore {
    async fn spreadsheet_title(&self) -> SheetsResult<String> {
        self.check_failure()?;
        Ok(self.title.clone())
    }

    async fn worksheet(&self, title: &str) -> SheetsResult<Worksheet> {
        self.check_failure()?;
        let sheets = self.sheets.read().unwrap_or_else(|e| e.into_inner());
        sheets
            .get(title)
            .map(|s| Worksheet::new(s.sheet_id, title))
            .ok_or_else(|| SheetsError::WorksheetNotFound(title.to_string()))
    }

    async fn get_all_records(&self, worksheet: &Worksheet) -> SheetsResult<Vec<Record>> {
        self.with_sheet(worksheet, |sheet| Ok(records_from_grid(&sheet.grid)))
    }

    async fn col_values(&self, worksheet: &Worksheet, col: usize) -> SheetsResult<Vec<String>> {
        self.with_sheet(worksheet, |sheet| {
            let mut values: Vec<String> = sheet
                .grid
                .iter()
                .map(|row| row.get(col - 1).cloned().unwrap_or_default())
                .collect();
            // The API omits trailing empty cells of a column
            while values.last().is_some_and(|v| v.is_empty()) {
                values.pop();
            }
            Ok(values)
        })
    }

    async fn append_row(&self, worksheet: &Worksheet, values: Vec<String>) -> SheetsResult<()> {
        self.with_sheet(worksheet, |sheet| {
            sheet.grid.push(values);
            Ok(())
        })
    }

    async fn update_cell(
        &self,
        worksheet: &Worksheet,
        row: usize,
        col: usize,
        value: String,
    ) -> SheetsResult<()> {
        self.with_sheet(worksheet, |sheet| {
            if row == 0 || col == 0 {
                return Err(SheetsError::Api {
                    status: 400,
                    message: format!("Invalid cell R{}C{}", row, col),
                });
            }
            while sheet.grid.len() < row {
                sheet.grid.push(Vec::new());
            }
            let cells = &mut sheet.grid[row - 1];
            if cells.len() < col {
                cells.resize(col, String::new());
            }
            cells[col - 1] = value;
            Ok(())
        })
    }

    async fn delete_row(&self, worksheet: &Worksheet, row: usize) -> SheetsResult<()> {
        self.with_sheet(worksheet, |sheet| {
            if row == 0 || row > sheet.grid.len() {
                return Err(SheetsError::Api {
                    status: 400,
                    message: format!("Row {} out of range", row),
                });
            }
            sheet.grid.remove(row - 1);
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn store() -> InMemoryStore {
        let store = InMemoryStore::new("Estoque");
        store.add_worksheet("freios", &["id", "peca"]);
        store
    }

    #[tokio::test]
    async fn test_unknown_worksheet() {
        let store = store();
        let err = store.worksheet("motor").await.unwrap_err();
        assert!(matches!(err, SheetsError::WorksheetNotFound(name) if name == "motor"));
    }

    #[tokio::test]
    async fn test_append_then_read() {
        let store = store();
        let ws = store.worksheet("freios").await.unwrap();
        store
            .append_row(&ws, vec!["1".to_string(), "Pastilha".to_string()])
            .await
            .unwrap();

        let records = store.get_all_records(&ws).await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0]["id"], json!(1));
        assert_eq!(store.col_values(&ws, 1).await.unwrap(), vec!["id", "1"]);
    }

    #[tokio::test]
    async fn test_update_and_delete() {
        let store = store();
        store.seed_rows("freios", vec![vec!["1", "Disco"], vec!["2", "Cabo"]]);
        let ws = store.worksheet("freios").await.unwrap();

        store.update_cell(&ws, 3, 2, "Cabo de aço".to_string()).await.unwrap();
        store.delete_row(&ws, 2).await.unwrap();

        let rows = store.rows("freios").unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1], vec!["2", "Cabo de aço"]);
    }

    #[tokio::test]
    async fn test_injected_failure_is_consumed_once() {
        let store = store();
        store.fail_next(SheetsError::Api {
            status: 429,
            message: "Quota exceeded".to_string(),
        });

        assert!(store.spreadsheet_title().await.is_err());
        assert_eq!(store.spreadsheet_title().await.unwrap(), "Estoque");
    }
}
