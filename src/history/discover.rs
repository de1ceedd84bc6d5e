use std::collections::BTreeSet;
use std::path::Path;

use anyhow::{bail, Context, Result};
use tracing::{debug, warn};

/// Tags implied by the table files matching `pattern` inside `dir`.
///
/// Files are expected to be named `<tag>.csv`. The tag is the last
/// dot-separated segment before the extension, so `foo.bar.csv` yields
/// `bar`, not `foo.bar`. Configure `QT_TAGS` for tags that contain dots.
pub fn discover_tags(dir: &Path, pattern: &str) -> Result<Vec<String>> {
    let dir = dir
        .to_str()
        .with_context(|| format!("data directory is not valid UTF-8: {}", dir.display()))?;
    // Only the pattern part is a glob; the directory is matched literally.
    let full = Path::new(&glob::Pattern::escape(dir)).join(pattern);
    let full = full.to_string_lossy();

    let mut tags = BTreeSet::new();
    for path in glob::glob(&full).with_context(|| format!("bad tag pattern: {}", full))? {
        let path = path.context("Failed to read tag table entry")?;
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        match tag_from_file_name(name) {
            Some(tag) => {
                debug!(file = name, tag, "tag discovered");
                tags.insert(tag.to_string());
            }
            None => warn!(file = name, "skipping file without a tag segment"),
        }
    }

    Ok(tags.into_iter().collect())
}

/// `plc.csv` -> `plc`; `a.b.csv` -> `b`; `README` -> `None`.
pub fn tag_from_file_name(name: &str) -> Option<&str> {
    name.rsplit('.').nth(1).filter(|tag| !tag.is_empty())
}

/// Accepts the characters Stack Exchange allows in tag names.
pub fn validate_tag(tag: &str) -> Result<()> {
    if tag.is_empty() {
        bail!("empty tag");
    }
    let ok = tag
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || matches!(c, '+' | '#' | '-' | '.'));
    if !ok {
        bail!("invalid tag {:?}: use lowercase letters, digits, '+', '#', '-' or '.'", tag);
    }
    Ok(())
}
