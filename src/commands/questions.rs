use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde_json::Value;
use tracing::{info, warn};

use crate::charts::growth::{self, TagSeries};
use crate::charts::ChartStyle;
use crate::config::AppConfig;
use crate::history::{self, QuestionHistory};
use crate::stackexchange::{self, StackExchangeClient};

/// Fetch, merge and persist every tag, then draw the shared growth chart.
///
/// Tables are written one tag at a time, so a failure leaves earlier tags
/// updated and the chart untouched.
pub async fn run(
    cfg: &AppConfig,
    client: &StackExchangeClient,
    style: &ChartStyle,
    now: DateTime<Utc>,
) -> Result<Vec<TagSeries>> {
    let tags = cfg.resolve_tags()?;
    if tags.is_empty() {
        warn!(dir = %cfg.data_dir.display(), pattern = %cfg.tag_glob, "no tags to update");
    }
    info!(count = tags.len(), "updating tags");

    let mut series = Vec::with_capacity(tags.len());
    for tag in &tags {
        let body = client.latest_questions(tag).await?;
        let history = ingest_tag(&cfg.tag_table(tag), &body)
            .with_context(|| format!("Failed to update tag {}", tag))?;
        if history.is_empty() {
            warn!(tag = %tag, "no questions recorded for tag yet");
        }
        info!(tag = %tag, rows = history.len(), total = history.total(), "tag updated");
        series.push(TagSeries::from_history(tag, &history));
    }

    growth::render(&cfg.questions_chart, &cfg.questions_title, &series, style, now)?;
    Ok(series)
}

/// Fold one search response into the table at `path`.
pub fn ingest_tag(path: &Path, body: &Value) -> Result<QuestionHistory> {
    let latest = stackexchange::question_entries(body)?;
    info!(path = %path.display(), items = latest.len(), "search items fetched");
    history::update_tag_history(path, &latest)
}
