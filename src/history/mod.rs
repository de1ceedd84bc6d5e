pub mod discover;
pub mod types;

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use crate::dates;
use types::{CsvRow, HistoryRow, PostId, QuestionEntry};

/// A tag's question history, ordered by creation date with a running distinct count.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuestionHistory {
    rows: Vec<HistoryRow>,
}

impl QuestionHistory {
    /// Build a history from raw entries. The first entry for a post id wins.
    pub fn from_entries<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = QuestionEntry>,
    {
        let mut by_id: BTreeMap<PostId, DateTime<Utc>> = BTreeMap::new();
        for entry in entries {
            by_id.entry(entry.post_id).or_insert(entry.created);
        }
        Self::recompute(by_id)
    }

    /// Merge freshly fetched questions into a prior history.
    /// Prior dates win on conflict; unseen ids are added.
    pub fn merge(prior: &QuestionHistory, latest: &[QuestionEntry]) -> Self {
        Self::from_entries(prior.entries().chain(latest.iter().copied()))
    }

    fn recompute(by_id: BTreeMap<PostId, DateTime<Utc>>) -> Self {
        let mut ordered: Vec<(PostId, DateTime<Utc>)> = by_id.into_iter().collect();
        ordered.sort_by(|a, b| a.1.cmp(&b.1).then(a.0.cmp(&b.0)));

        // Ids are already unique here, so every row is a first occurrence.
        let rows = ordered
            .into_iter()
            .zip(1u64..)
            .map(|((post_id, created), cumulative)| HistoryRow {
                post_id,
                created,
                cumulative,
            })
            .collect();

        Self { rows }
    }

    pub fn rows(&self) -> &[HistoryRow] {
        &self.rows
    }

    pub fn entries(&self) -> impl Iterator<Item = QuestionEntry> + '_ {
        self.rows.iter().map(|r| QuestionEntry {
            post_id: r.post_id,
            created: r.created,
        })
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// The latest row: newest question and the final cumulative count.
    pub fn last(&self) -> Option<&HistoryRow> {
        self.rows.last()
    }

    pub fn total(&self) -> u64 {
        self.last().map(|r| r.cumulative).unwrap_or(0)
    }

    /// Read a table. The stored cumulative column is ignored and recomputed.
    pub fn read_from<R: Read>(reader: R) -> Result<Self> {
        let mut rdr = csv::Reader::from_reader(reader);
        let mut entries = Vec::new();
        for (i, record) in rdr.deserialize::<CsvRow>().enumerate() {
            let row = record.with_context(|| format!("malformed table row {}", i + 1))?;
            let created = dates::parse_timestamp(&row.created)
                .with_context(|| format!("bad creation date in row {}", i + 1))?;
            entries.push(QuestionEntry {
                post_id: row.post_id,
                created,
            });
        }
        Ok(Self::from_entries(entries))
    }

    pub fn write_to<W: Write>(&self, writer: W) -> Result<()> {
        let mut wtr = csv::Writer::from_writer(writer);
        for row in &self.rows {
            wtr.serialize(CsvRow {
                post_id: row.post_id,
                created: dates::format_timestamp(&row.created),
                cumulative: Some(row.cumulative),
            })?;
        }
        wtr.flush()?;
        Ok(())
    }

    /// Load a tag table. A missing file is a tag seen for the first time.
    pub fn load(path: &Path) -> Result<Self> {
        match File::open(path) {
            Ok(file) => Self::read_from(file)
                .with_context(|| format!("Failed to read table {}", path.display())),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!(path = %path.display(), "no table yet, starting empty");
                Ok(Self::default())
            }
            Err(e) => Err(e).with_context(|| format!("Failed to open {}", path.display())),
        }
    }

    /// Overwrite the table at `path`.
    pub fn save(&self, path: &Path) -> Result<()> {
        let file =
            File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
        self.write_to(file)
            .with_context(|| format!("Failed to write table {}", path.display()))?;
        debug!(path = %path.display(), rows = self.len(), "table written");
        Ok(())
    }
}

/// Load the tag table, fold in the latest questions, and write it back.
pub fn update_tag_history(path: &Path, latest: &[QuestionEntry]) -> Result<QuestionHistory> {
    let prior = QuestionHistory::load(path)?;
    let merged = QuestionHistory::merge(&prior, latest);
    merged.save(path)?;
    debug!(
        path = %path.display(),
        prior = prior.len(),
        added = merged.len() - prior.len(),
        "tag history updated"
    );
    Ok(merged)
}
