//! Thin Google Sheets v4 values client (read-only, API-key auth).

use anyhow::{Context, Result};
use chrono::NaiveDate;
use duewatch_core::gantt::Cell;
use duewatch_core::parse_loose_date;
use serde::Deserialize;
use tracing::warn;

const BASE_URL: &str = "https://sheets.googleapis.com/v4/spreadsheets";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderOption {
    /// Evaluated values: date cells come back as day-serial numbers.
    Unformatted,
    /// Values as displayed in the sheet.
    Formatted,
}

impl RenderOption {
    fn as_str(self) -> &'static str {
        match self {
            RenderOption::Unformatted => "UNFORMATTED_VALUE",
            RenderOption::Formatted => "FORMATTED_VALUE",
        }
    }
}

#[derive(Debug, Deserialize)]
struct ValuesResponse {
    #[serde(default)]
    values: Vec<Vec<Cell>>,
}

#[derive(Debug, Clone)]
pub struct SheetsClient {
    http: reqwest::Client,
    api_key: String,
}

impl SheetsClient {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key: api_key.into(),
        }
    }

    /// Read a rectangular range; absent trailing cells are simply missing
    /// from each row, exactly as the API returns them.
    pub async fn fetch_range(
        &self,
        spreadsheet: &str,
        range: &str,
        render: RenderOption,
    ) -> Result<Vec<Vec<Cell>>> {
        let url = format!("{BASE_URL}/{spreadsheet}/values/{range}");
        let resp = self
            .http
            .get(&url)
            .query(&[
                ("valueRenderOption", render.as_str()),
                ("key", self.api_key.as_str()),
            ])
            .send()
            .await
            .with_context(|| format!("GET {range} of {spreadsheet}"))?
            .error_for_status()
            .with_context(|| format!("reading {range} of {spreadsheet}"))?;

        let body: ValuesResponse = resp.json().await.context("decoding values response")?;
        Ok(body.values)
    }

    /// Read one cell in A1 notation; None when blank or absent.
    pub async fn fetch_cell(
        &self,
        spreadsheet: &str,
        a1: &str,
        render: RenderOption,
    ) -> Result<Option<Cell>> {
        let rows = self.fetch_range(spreadsheet, a1, render).await?;
        Ok(rows
            .first()
            .and_then(|row| row.first().cloned())
            .filter(|cell| !cell.is_blank()))
    }

    /// Project start date, used as reference for year-less deadlines.
    ///
    /// Serial read first, formatted-string fallback second; any failure
    /// falls back to `today` rather than failing the project.
    pub async fn read_start_date(
        &self,
        spreadsheet: &str,
        worksheet: &str,
        cell: &str,
        today: NaiveDate,
    ) -> NaiveDate {
        let a1 = format!("{worksheet}!{cell}");

        for render in [RenderOption::Unformatted, RenderOption::Formatted] {
            match self.fetch_cell(spreadsheet, &a1, render).await {
                Ok(Some(value)) => match parse_loose_date(&value.to_text(), today) {
                    Ok(date) => return date,
                    Err(err) => {
                        warn!(%a1, ?render, %err, "start date cell did not parse");
                    }
                },
                Ok(None) => {}
                Err(err) => {
                    warn!(%a1, ?render, %err, "start date cell read failed");
                }
            }
        }

        today
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn values_response_tolerates_ragged_rows() {
        let raw = r#"{"range":"GANTT!B9:E10","values":[["IT"],["Backup","",5,45000]]}"#;
        let body: ValuesResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(body.values.len(), 2);
        assert_eq!(body.values[0].len(), 1);
        assert_eq!(body.values[1][2], Cell::Number(5.0));
    }

    #[test]
    fn empty_range_has_no_values_key() {
        let body: ValuesResponse = serde_json::from_str(r#"{"range":"GANTT!B9:E10"}"#).unwrap();
        assert!(body.values.is_empty());
    }
}
