use anyhow::{anyhow, Context, Result};
use serde_json::Value;
use tracing::debug;

use crate::config::AppConfig;
use crate::dates;
use crate::history::types::QuestionEntry;

/// Thin client for the Stack Exchange search endpoint.
pub struct StackExchangeClient {
    client: reqwest::Client,
    api_url: String,
    site: String,
}

impl StackExchangeClient {
    pub fn new(cfg: &AppConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(cfg.http_timeout_secs))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            api_url: cfg.api_url.clone(),
            site: cfg.site.clone(),
        })
    }

    /// The newest-first search for `tag`. One page, API default size.
    pub fn search_request(&self, tag: &str) -> Result<reqwest::Request> {
        self.client
            .get(&self.api_url)
            .query(&[
                ("sort", "creation"),
                ("order", "desc"),
                ("site", self.site.as_str()),
                ("tagged", tag),
            ])
            .build()
            .context("Failed to build search request")
    }

    /// Fetch the latest questions for `tag` and return the JSON body as-is.
    pub async fn latest_questions(&self, tag: &str) -> Result<Value> {
        let req = self.search_request(tag)?;
        let resp = self
            .client
            .execute(req)
            .await
            .with_context(|| format!("search request for tag {} failed", tag))?
            .error_for_status()
            .with_context(|| format!("search API rejected tag {}", tag))?;

        let body: Value = resp
            .json()
            .await
            .with_context(|| format!("Failed to parse search response for tag {}", tag))?;

        if let Some(quota) = body["quota_remaining"].as_i64() {
            debug!(tag, quota, "API quota remaining");
        }
        Ok(body)
    }
}

/// Pull `(question_id, creation_date)` out of every item of a search response.
pub fn question_entries(body: &Value) -> Result<Vec<QuestionEntry>> {
    let items = body["items"]
        .as_array()
        .ok_or_else(|| anyhow!("search response has no items array"))?;

    items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            let post_id = item["question_id"]
                .as_u64()
                .ok_or_else(|| anyhow!("item {} has no question_id", i))?;
            let created = item["creation_date"]
                .as_i64()
                .ok_or_else(|| anyhow!("item {} has no creation_date", i))?;
            Ok(QuestionEntry {
                post_id,
                created: dates::from_epoch_seconds(created)?,
            })
        })
        .collect()
}
