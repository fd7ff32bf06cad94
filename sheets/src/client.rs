//! Sheets v4 `values` API client

use crate::auth::TokenSource;
use crate::error::SheetsError;
use reqwest::{Client, Method, Url};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

const DEFAULT_API_URL: &str = "https://sheets.googleapis.com/v4/spreadsheets";

#[derive(Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<Value>>,
}

#[derive(Serialize)]
struct ValueBody<'a> {
    #[serde(rename = "majorDimension")]
    major_dimension: &'static str,
    values: &'a [Vec<String>],
}

/// Client for one spreadsheet
#[derive(Clone, Debug)]
pub struct SheetsClient {
    http: Client,
    api_url: String,
    spreadsheet_id: String,
    auth: TokenSource,
    timeout: Option<Duration>,
}

impl SheetsClient {
    /// Create a client for `spreadsheet_id`
    #[must_use]
    pub fn new(spreadsheet_id: impl Into<String>, auth: TokenSource) -> Self {
        Self {
            http: Client::new(),
            api_url: DEFAULT_API_URL.to_string(),
            spreadsheet_id: spreadsheet_id.into(),
            auth,
            timeout: None,
        }
    }

    /// Point the client at a different API root (test servers)
    #[must_use]
    pub fn with_base_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Bound every request by `timeout`
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Read a range as rows of display strings
    ///
    /// Empty ranges and trailing empty cells are omitted by the API, so rows
    /// may be shorter than the header.
    ///
    /// # Errors
    ///
    /// Returns `SheetsError` for auth, network, status or parse failures.
    pub async fn get_values(&self, range: &str) -> Result<Vec<Vec<String>>, SheetsError> {
        let url = self.values_url(range, "")?;
        let response = self.send(Method::GET, url, None).await?;
        let body: ValueRange = response
            .json()
            .await
            .map_err(|e| SheetsError::ResponseParseFailed(e.to_string()))?;

        Ok(body
            .values
            .into_iter()
            .map(|row| row.into_iter().map(cell_text).collect())
            .collect())
    }

    /// Append rows after the last row of the table in `range`
    ///
    /// # Errors
    ///
    /// Returns `SheetsError` for auth, network or status failures.
    pub async fn append_values(&self, range: &str, rows: &[Vec<String>]) -> Result<(), SheetsError> {
        let mut url = self.values_url(range, ":append")?;
        url.query_pairs_mut()
            .append_pair("valueInputOption", "RAW")
            .append_pair("insertDataOption", "INSERT_ROWS");
        self.send(Method::POST, url, Some(rows)).await?;
        Ok(())
    }

    /// Overwrite the cells starting at `range`
    ///
    /// # Errors
    ///
    /// Returns `SheetsError` for auth, network or status failures.
    pub async fn update_values(&self, range: &str, rows: &[Vec<String>]) -> Result<(), SheetsError> {
        let mut url = self.values_url(range, "")?;
        url.query_pairs_mut().append_pair("valueInputOption", "RAW");
        self.send(Method::PUT, url, Some(rows)).await?;
        Ok(())
    }

    fn values_url(&self, range: &str, suffix: &str) -> Result<Url, SheetsError> {
        let mut url = Url::parse(&self.api_url)
            .map_err(|e| SheetsError::RequestFailed(format!("invalid API URL: {e}")))?;
        url.path_segments_mut()
            .map_err(|()| SheetsError::RequestFailed("API URL cannot be a base".to_string()))?
            .pop_if_empty()
            .push(&self.spreadsheet_id)
            .push("values")
            .push(&format!("{range}{suffix}"));
        Ok(url)
    }

    async fn send(
        &self,
        method: Method,
        url: Url,
        rows: Option<&[Vec<String>]>,
    ) -> Result<reqwest::Response, SheetsError> {
        let token = self.auth.token().await?;
        tracing::debug!(method = %method, path = url.path(), "Calling Sheets API");

        let mut builder = self.http.request(method, url).bearer_auth(token);
        if let Some(values) = rows {
            builder = builder.json(&ValueBody {
                major_dimension: "ROWS",
                values,
            });
        }
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }

        let response = builder.send().await?;
        match response.status() {
            status if status.is_success() => Ok(response),
            status => {
                let body = response.text().await.unwrap_or_default();
                tracing::warn!(status = status.as_u16(), "Sheets API returned an error");
                Err(SheetsError::from_status(status, body))
            }
        }
    }
}

/// Display text of a cell value
fn cell_text(value: Value) -> String {
    match value {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
