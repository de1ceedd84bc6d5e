use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Stack Exchange question id. Unique key of every tag table.
pub type PostId = u64;

/// A question as returned by the search API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuestionEntry {
    pub post_id: PostId,
    pub created: DateTime<Utc>,
}

/// One row of a persisted tag table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistoryRow {
    pub post_id: PostId,
    pub created: DateTime<Utc>,
    /// Distinct questions seen up to and including this row, in date order.
    pub cumulative: u64,
}

/// On-disk CSV shape. Column names match the tables already in circulation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct CsvRow {
    #[serde(rename = "Post Link")]
    pub post_id: PostId,
    #[serde(rename = "Creation Date")]
    pub created: String,
    #[serde(rename = "Cumulative questions", default)]
    pub cumulative: Option<u64>,
}
