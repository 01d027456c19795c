//! # Tabular Store Trait
//!
//! The contract the inventory service needs from a spreadsheet backend.
//! Row and column numbers are 1-based and row 1 is the header row.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

use super::errors::SheetsResult;

/// One data row, keyed by header, in column order
pub type Record = Map<String, Value>;

/// Resolved handle to a worksheet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Worksheet {
    /// Numeric sheet id, needed for structural edits
    pub sheet_id: i64,
    /// Worksheet title (the category name)
    pub title: String,
}

impl Worksheet {
    pub fn new(sheet_id: i64, title: impl Into<String>) -> Self {
        Self {
            sheet_id,
            title: title.into(),
        }
    }
}

/// Backend trait for spreadsheet access
#[async_trait]
pub trait TabularStore: Send + Sync + std::fmt::Debug {
    /// Title of the spreadsheet itself
    async fn spreadsheet_title(&self) -> SheetsResult<String>;

    /// Look up a worksheet by title; `WorksheetNotFound` when absent
    async fn worksheet(&self, title: &str) -> SheetsResult<Worksheet>;

    /// Every data row below the header, as ordered header -> value maps
    async fn get_all_records(&self, worksheet: &Worksheet) -> SheetsResult<Vec<Record>>;

    /// All values of one column, header cell included
    async fn col_values(&self, worksheet: &Worksheet, col: usize) -> SheetsResult<Vec<String>>;

    /// Append a row after the last non-empty row
    async fn append_row(&self, worksheet: &Worksheet, values: Vec<String>) -> SheetsResult<()>;

    /// Overwrite a single cell
    async fn update_cell(
        &self,
        worksheet: &Worksheet,
        row: usize,
        col: usize,
        value: String,
    ) -> SheetsResult<()>;

    /// Remove a row entirely, shifting the rows below it up
    async fn delete_row(&self, worksheet: &Worksheet, row: usize) -> SheetsResult<()>;
}

/// Convert a raw cell into a JSON value the way the upstream client library
/// presents records: integers and floats become numbers, the rest stays text.
/// Integers too wide for 64 bits stay text so they round-trip exactly.
pub fn numericise(cell: &str) -> Value {
    if let Ok(int) = cell.parse::<i64>() {
        return Value::Number(int.into());
    }
    if let Ok(int) = cell.parse::<u64>() {
        return Value::Number(int.into());
    }
    if is_integer_text(cell) {
        return Value::String(cell.to_string());
    }
    if let Ok(float) = cell.parse::<f64>() {
        // "nan"/"inf" parse as floats but have no JSON representation
        if let Some(number) = Number::from_f64(float) {
            return Value::Number(number);
        }
    }
    Value::String(cell.to_string())
}

fn is_integer_text(cell: &str) -> bool {
    let digits = cell.strip_prefix(&['-', '+'][..]).unwrap_or(cell);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

/// Build records from a raw grid whose first row is the header.
/// Short rows are padded with empty strings.
pub fn records_from_grid(grid: &[Vec<String>]) -> Vec<Record> {
    let Some((header, rows)) = grid.split_first() else {
        return Vec::new();
    };

    rows.iter()
        .map(|row| {
            header
                .iter()
                .enumerate()
                .map(|(i, key)| {
                    let cell = row.get(i).map(String::as_str).unwrap_or("");
                    (key.clone(), numericise(cell))
                })
                .collect()
        })
        .collect()
}

/// Render a JSON value as the text written into a cell
pub fn cell_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
