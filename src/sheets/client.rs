//! # Google Sheets Client
//!
//! `TabularStore` over the Sheets v4 REST API.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{RequestBuilder, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};

use super::auth::{ServiceAccountKey, TokenProvider};
use super::errors::{SheetsError, SheetsResult};
use super::store::{cell_text, records_from_grid, Record, TabularStore, Worksheet};

/// Connection settings for one spreadsheet
#[derive(Debug, Clone)]
pub struct SheetsClientConfig {
    /// API root, e.g. `https://sheets.googleapis.com/v4`
    pub api_base: String,
    pub spreadsheet_id: String,
    /// Per-request timeout
    pub timeout: Duration,
}

// ==================
// Wire Types
// ==================

#[derive(Debug, Deserialize)]
struct SpreadsheetMeta {
    properties: SpreadsheetProperties,
    #[serde(default)]
    sheets: Vec<SheetEntry>,
}

#[derive(Debug, Deserialize)]
struct SpreadsheetProperties {
    title: String,
}

#[derive(Debug, Deserialize)]
struct SheetEntry {
    properties: SheetProperties,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SheetProperties {
    sheet_id: i64,
    title: String,
}

#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<Value>>,
}

impl ValueRange {
    fn into_grid(self) -> Vec<Vec<String>> {
        self.values
            .into_iter()
            .map(|row| row.iter().map(cell_text).collect())
            .collect()
    }
}

// ==================
// Client
// ==================

/// Sheets API client bound to one spreadsheet
#[derive(Debug)]
pub struct SheetsClient {
    http: reqwest::Client,
    tokens: TokenProvider,
    api_base: Url,
    spreadsheet_id: String,
}

impl SheetsClient {
    /// Create a client authenticated as the given service account
    pub fn new(key: ServiceAccountKey, config: SheetsClientConfig) -> SheetsResult<Self> {
        let api_base = Url::parse(&config.api_base)
            .map_err(|e| SheetsError::Transport(format!("Invalid API base URL: {}", e)))?;
        if api_base.cannot_be_a_base() {
            return Err(SheetsError::Transport(format!(
                "Invalid API base URL: {}",
                config.api_base
            )));
        }

        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| SheetsError::Transport(e.to_string()))?;
        let tokens = TokenProvider::new(key, http.clone())?;

        Ok(Self {
            http,
            tokens,
            api_base,
            spreadsheet_id: config.spreadsheet_id,
        })
    }

    /// Service account the client acts as
    pub fn client_email(&self) -> &str {
        self.tokens.client_email()
    }

    fn values_url(&self, range: &str) -> SheetsResult<Url> {
        spreadsheet_url(&self.api_base, &self.spreadsheet_id, &["values", range])
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> SheetsResult<T> {
        let token = self.tokens.access_token().await?;
        let response = request.bearer_auth(token).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(api_error(status.as_u16(), &body));
        }

        Ok(response.json::<T>().await?)
    }

    async fn metadata(&self) -> SheetsResult<SpreadsheetMeta> {
        let mut url = spreadsheet_url(&self.api_base, &self.spreadsheet_id, &[])?;
        url.query_pairs_mut().append_pair(
            "fields",
            "properties.title,sheets.properties(sheetId,title)",
        );
        self.send(self.http.get(url)).await
    }
}

#[async_trait]
impl TabularStore for SheetsClient {
    async fn spreadsheet_title(&self) -> SheetsResult<String> {
        Ok(self.metadata().await?.properties.title)
    }

    async fn worksheet(&self, title: &str) -> SheetsResult<Worksheet> {
        self.metadata()
            .await?
            .sheets
            .into_iter()
            .map(|s| s.properties)
            .find(|p| p.title == title)
            .map(|p| Worksheet::new(p.sheet_id, p.title))
            .ok_or_else(|| SheetsError::WorksheetNotFound(title.to_string()))
    }

    async fn get_all_records(&self, worksheet: &Worksheet) -> SheetsResult<Vec<Record>> {
        let url = self.values_url(&quote_sheet(&worksheet.title))?;
        let range: ValueRange = self.send(self.http.get(url)).await?;
        Ok(records_from_grid(&range.into_grid()))
    }

    async fn col_values(&self, worksheet: &Worksheet, col: usize) -> SheetsResult<Vec<String>> {
        let letter = column_letter(col);
        let range = format!("{}!{}:{}", quote_sheet(&worksheet.title), letter, letter);
        let mut url = self.values_url(&range)?;
        url.query_pairs_mut().append_pair("majorDimension", "COLUMNS");

        let range: ValueRange = self.send(self.http.get(url)).await?;
        Ok(range.into_grid().into_iter().next().unwrap_or_default())
    }

    async fn append_row(&self, worksheet: &Worksheet, values: Vec<String>) -> SheetsResult<()> {
        let mut url = spreadsheet_url(
            &self.api_base,
            &self.spreadsheet_id,
            &["values", &format!("{}:append", quote_sheet(&worksheet.title))],
        )?;
        url.query_pairs_mut()
            .append_pair("valueInputOption", "RAW")
            .append_pair("insertDataOption", "INSERT_ROWS");

        let _: Value = self
            .send(self.http.post(url).json(&json!({ "values": [values] })))
            .await?;
        Ok(())
    }

    async fn update_cell(
        &self,
        worksheet: &Worksheet,
        row: usize,
        col: usize,
        value: String,
    ) -> SheetsResult<()> {
        let range = format!("{}!{}", quote_sheet(&worksheet.title), a1(row, col));
        let mut url = self.values_url(&range)?;
        url.query_pairs_mut()
            .append_pair("valueInputOption", "USER_ENTERED");

        let _: Value = self
            .send(self.http.put(url).json(&json!({ "values": [[value]] })))
            .await?;
        Ok(())
    }

    async fn delete_row(&self, worksheet: &Worksheet, row: usize) -> SheetsResult<()> {
        let url = spreadsheet_url(
            &self.api_base,
            &format!("{}:batchUpdate", self.spreadsheet_id),
            &[],
        )?;
        let body = json!({
            "requests": [{
                "deleteDimension": {
                    "range": {
                        "sheetId": worksheet.sheet_id,
                        "dimension": "ROWS",
                        "startIndex": row.saturating_sub(1),
                        "endIndex": row,
                    }
                }
            }]
        });

        let _: Value = self.send(self.http.post(url).json(&body)).await?;
        Ok(())
    }
}

// ==================
// Helpers
// ==================

/// `{base}/spreadsheets/{id}/{segments...}` with every segment percent-encoded
pub fn spreadsheet_url(base: &Url, spreadsheet_id: &str, segments: &[&str]) -> SheetsResult<Url> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|_| SheetsError::Transport(format!("Invalid API base URL: {}", base)))?
        .pop_if_empty()
        .push("spreadsheets")
        .push(spreadsheet_id)
        .extend(segments);
    Ok(url)
}

/// Quote a worksheet title for use in A1 ranges
pub fn quote_sheet(title: &str) -> String {
    format!("'{}'", title.replace('\'', "''"))
}

/// 1 -> A, 26 -> Z, 27 -> AA
pub fn column_letter(col: usize) -> String {
    let mut n = col;
    let mut letters = Vec::new();
    while n > 0 {
        let rem = (n - 1) % 26;
        letters.push((b'A' + rem as u8) as char);
        n = (n - 1) / 26;
    }
    letters.iter().rev().collect()
}

/// A1 notation for a 1-based cell
pub fn a1(row: usize, col: usize) -> String {
    format!("{}{}", column_letter(col), row)
}

/// Turn an error body from the API into a `SheetsError::Api`
pub fn api_error(status: u16, body: &str) -> SheetsError {
    let message = serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v["error"]["message"].as_str().map(str::to_string))
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| {
            if body.trim().is_empty() {
                format!("HTTP {}", status)
            } else {
                body.trim().to_string()
            }
        });

    SheetsError::Api { status, message }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_letters() {
        assert_eq!(column_letter(1), "A");
        assert_eq!(column_letter(8), "H");
        assert_eq!(column_letter(26), "Z");
        assert_eq!(column_letter(27), "AA");
        assert_eq!(column_letter(703), "AAA");
        assert_eq!(a1(3, 2), "B3");
    }

    #[test]
    fn test_quote_sheet_escapes_apostrophes() {
        assert_eq!(quote_sheet("freios"), "'freios'");
        assert_eq!(quote_sheet("d'agua"), "'d''agua'");
    }

    #[test]
    fn test_spreadsheet_url_encodes_ranges() {
        let base = Url::parse("https://sheets.googleapis.com/v4").unwrap();
        let url = spreadsheet_url(&base, "abc", &["values", "'suspensão dianteira'!A:A"]).unwrap();
        assert_eq!(
            url.as_str(),
            "https://sheets.googleapis.com/v4/spreadsheets/abc/values/'suspens%C3%A3o%20dianteira'!A:A"
        );

        let base = Url::parse("https://sheets.googleapis.com/v4/").unwrap();
        let url = spreadsheet_url(&base, "abc:batchUpdate", &[]).unwrap();
        assert_eq!(
            url.as_str(),
            "https://sheets.googleapis.com/v4/spreadsheets/abc:batchUpdate"
        );
    }

    #[test]
    fn test_api_error_from_google_body() {
        let body = r#"{"error": {"code": 429, "message": "Quota exceeded", "status": "RESOURCE_EXHAUSTED"}}"#;
        match api_error(429, body) {
            SheetsError::Api { status, message } => {
                assert_eq!(status, 429);
                assert_eq!(message, "Quota exceeded");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_api_error_from_plain_body() {
        match api_error(502, "  Bad Gateway ") {
            SheetsError::Api { message, .. } => assert_eq!(message, "Bad Gateway"),
            other => panic!("unexpected error: {:?}", other),
        }
        match api_error(500, "") {
            SheetsError::Api { message, .. } => assert_eq!(message, "HTTP 500"),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_value_range_to_grid() {
        let range: ValueRange = serde_json::from_str(
            r#"{"range": "freios!A1:B2", "values": [["id", "peca"], [1, "Disco"]]}"#,
        )
        .unwrap();
        assert_eq!(
            range.into_grid(),
            vec![vec!["id", "peca"], vec!["1", "Disco"]]
        );

        let empty: ValueRange = serde_json::from_str(r#"{"range": "freios!A1"}"#).unwrap();
        assert!(empty.into_grid().is_empty());
    }
}
