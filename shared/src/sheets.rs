//! Grid storage backends.
//!
//! The store only needs four range operations from its backend. `SheetsClient`
//! speaks the Google Sheets v4 `values` API; `MemoryGrid` (see `memory.rs`)
//! keeps the grid in process.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::auth::ServiceAccountTokenProvider;
use crate::mapper::Grid;
use crate::range::RangeSpec;
use crate::{Error, Result};

/// Range-addressed row store.
#[async_trait]
pub trait GridBackend: Send + Sync {
    /// Read the cells inside `range`.
    async fn read_range(&self, range: &RangeSpec) -> Result<Grid>;

    /// Append rows after the last non-blank row of the table at `range`.
    async fn append_rows(&self, range: &RangeSpec, rows: Grid) -> Result<()>;

    /// Overwrite the cells inside `range`.
    async fn update_range(&self, range: &RangeSpec, rows: Grid) -> Result<()>;

    /// Blank the cells inside `range` without removing rows.
    async fn clear_range(&self, range: &RangeSpec) -> Result<()>;
}

/// How written values are interpreted by Sheets.
const VALUE_INPUT_OPTION: &str = "USER_ENTERED";

/// `ValueRange` resource of the Sheets API.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ValueRange {
    #[serde(skip_serializing_if = "Option::is_none")]
    range: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    major_dimension: Option<String>,
    #[serde(default)]
    values: Option<Vec<Vec<Value>>>,
}

impl ValueRange {
    fn rows(rows: Grid) -> Self {
        Self {
            range: None,
            major_dimension: Some("ROWS".to_string()),
            values: Some(
                rows.into_iter()
                    .map(|row| row.into_iter().map(Value::String).collect())
                    .collect(),
            ),
        }
    }

    fn into_grid(self) -> Grid {
        self.values
            .unwrap_or_default()
            .into_iter()
            .map(|row| row.into_iter().map(cell_text).collect())
            .collect()
    }
}

/// Formatted values arrive as strings; anything else is kept in textual form.
fn cell_text(value: Value) -> String {
    match value {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Google Sheets v4 client bound to one spreadsheet.
pub struct SheetsClient {
    http_client: reqwest::Client,
    token_provider: ServiceAccountTokenProvider,
    api_base: String,
    spreadsheet_id: String,
}

impl SheetsClient {
    pub fn new(
        http_client: reqwest::Client,
        token_provider: ServiceAccountTokenProvider,
        api_base: impl Into<String>,
        spreadsheet_id: impl Into<String>,
    ) -> Self {
        Self {
            http_client,
            token_provider,
            api_base: api_base.into(),
            spreadsheet_id: spreadsheet_id.into(),
        }
    }

    /// `{base}/spreadsheets/{id}/values/{range}{suffix}` with the range escaped.
    fn values_url(&self, range: &RangeSpec, suffix: &str) -> String {
        values_url(&self.api_base, &self.spreadsheet_id, range, suffix)
    }

    async fn send(&self, request: reqwest::RequestBuilder, what: &str) -> Result<reqwest::Response> {
        let token = self.token_provider.access_token().await?;
        let response = request.bearer_auth(token).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(Error::Backend(format!(
                "Sheets {} failed ({}): {}",
                what, status, error_text
            )));
        }

        Ok(response)
    }
}

fn values_url(api_base: &str, spreadsheet_id: &str, range: &RangeSpec, suffix: &str) -> String {
    format!(
        "{}/spreadsheets/{}/values/{}{}",
        api_base,
        urlencoding::encode(spreadsheet_id),
        urlencoding::encode(&range.to_string()),
        suffix
    )
}

#[async_trait]
impl GridBackend for SheetsClient {
    async fn read_range(&self, range: &RangeSpec) -> Result<Grid> {
        debug!(%range, "Sheets values.get");
        let request = self.http_client.get(self.values_url(range, ""));
        let response = self.send(request, "values.get").await?;

        let value_range: ValueRange = response
            .json()
            .await
            .map_err(|e| Error::Backend(format!("Failed to parse values response: {}", e)))?;

        Ok(value_range.into_grid())
    }

    async fn append_rows(&self, range: &RangeSpec, rows: Grid) -> Result<()> {
        debug!(%range, rows = rows.len(), "Sheets values.append");
        let url = self.values_url(
            range,
            &format!(
                ":append?valueInputOption={}&insertDataOption=INSERT_ROWS",
                VALUE_INPUT_OPTION
            ),
        );
        let request = self.http_client.post(url).json(&ValueRange::rows(rows));
        self.send(request, "values.append").await?;
        Ok(())
    }

    async fn update_range(&self, range: &RangeSpec, rows: Grid) -> Result<()> {
        debug!(%range, rows = rows.len(), "Sheets values.update");
        let url = self.values_url(range, &format!("?valueInputOption={}", VALUE_INPUT_OPTION));
        let mut body = ValueRange::rows(rows);
        body.range = Some(range.to_string());
        let request = self.http_client.put(url).json(&body);
        self.send(request, "values.update").await?;
        Ok(())
    }

    async fn clear_range(&self, range: &RangeSpec) -> Result<()> {
        debug!(%range, "Sheets values.clear");
        let url = self.values_url(range, ":clear");
        let request = self.http_client.post(url).json(&serde_json::json!({}));
        self.send(request, "values.clear").await?;
        Ok(())
    }
}
