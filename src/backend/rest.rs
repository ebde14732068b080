use super::util::with_retry;
use crate::core::record::RawInvestmentRow;
use crate::core::store::{RecordDraft, RecordStore};
use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use reqwest::StatusCode;
use tracing::{debug, error};

/// Client for the Express backend: `GET/POST /api/investments/:table` and
/// `PUT/DELETE /api/investments/:table/:id`.
pub struct RestStore {
    base_url: String,
    table: String,
    client: reqwest::Client,
}

impl RestStore {
    pub fn new(base_url: &str, table: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            table: table.to_string(),
            client: reqwest::Client::new(),
        }
    }

    fn table_url(&self) -> String {
        format!("{}/api/investments/{}", self.base_url, self.table)
    }

    fn record_url(&self, id: i64) -> String {
        format!("{}/{}", self.table_url(), id)
    }

    async fn parse_row(response: reqwest::Response, id: Option<i64>) -> Result<RawInvestmentRow> {
        if response.status() == StatusCode::NOT_FOUND {
            match id {
                Some(id) => bail!("Investment {id} not found"),
                None => bail!("Investment not found"),
            }
        }
        let response = response.error_for_status().context("Backend request failed")?;
        let response_text = response
            .text()
            .await
            .context("Failed to get response text")?;

        match serde_json::from_str(&response_text) {
            Ok(row) => Ok(row),
            Err(e) => {
                error!(
                    error = ?e,
                    response = %response_text,
                    "Failed to parse record response"
                );
                Err(e).context("Failed to parse record response")
            }
        }
    }
}

#[async_trait]
impl RecordStore for RestStore {
    async fn list(&self) -> Result<Vec<RawInvestmentRow>> {
        let url = self.table_url();
        debug!("Fetching records from {url}");

        let response = with_retry(|| async { self.client.get(&url).send().await }, 3, 500)
            .await
            .context("Record list request failed")?
            .error_for_status()
            .context("Backend rejected the record list request")?;

        let response_text = response
            .text()
            .await
            .context("Failed to get response text")?;

        match serde_json::from_str::<Vec<RawInvestmentRow>>(&response_text) {
            Ok(rows) => {
                debug!("Fetched {} records", rows.len());
                Ok(rows)
            }
            Err(e) => {
                error!(
                    error = ?e,
                    response = %response_text,
                    "Failed to parse record list response"
                );
                Err(e).context("Failed to parse record list response")
            }
        }
    }

    async fn create(&self, draft: &RecordDraft) -> Result<RawInvestmentRow> {
        let response = self
            .client
            .post(self.table_url())
            .json(draft)
            .send()
            .await
            .context("Create request failed")?;
        Self::parse_row(response, None).await
    }

    async fn update(&self, id: i64, draft: &RecordDraft) -> Result<RawInvestmentRow> {
        let response = self
            .client
            .put(self.record_url(id))
            .json(draft)
            .send()
            .await
            .context("Update request failed")?;
        Self::parse_row(response, Some(id)).await
    }

    async fn delete(&self, id: i64) -> Result<RawInvestmentRow> {
        let response = self
            .client
            .delete(self.record_url(id))
            .send()
            .await
            .context("Delete request failed")?;
        Self::parse_row(response, Some(id)).await
    }
}
