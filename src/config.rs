use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use tracing::Level;

use crate::history::discover;

const DEFAULT_API_URL: &str = "https://api.stackexchange.com/2.3/search";
const DEFAULT_QUESTIONS_TITLE: &str = "Number of StackOverflow questions for PLC related tags";
const DEFAULT_SUPPORT_TITLE: &str = "Beckhoff support Switzerland ticket numbers";

/// Everything the two batch workflows need, read once at start-up.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Directory holding one `<tag>.csv` table per tag.
    pub data_dir: PathBuf,
    /// Explicit tag list. When `None`, tags are discovered from `tag_glob`.
    pub tags: Option<Vec<String>>,
    pub tag_glob: String,
    pub api_url: String,
    pub site: String,
    pub http_timeout_secs: u64,
    pub ticket_log: PathBuf,
    pub questions_chart: PathBuf,
    pub support_chart: PathBuf,
    pub questions_title: String,
    pub support_title: String,
    pub log_level: Level,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("."),
            tags: None,
            tag_glob: "*.csv".to_string(),
            api_url: DEFAULT_API_URL.to_string(),
            site: "stackoverflow".to_string(),
            http_timeout_secs: 30,
            ticket_log: PathBuf::from("support-ch.txt"),
            questions_chart: PathBuf::from("questions.png"),
            support_chart: PathBuf::from("support.png"),
            questions_title: DEFAULT_QUESTIONS_TITLE.to_string(),
            support_title: DEFAULT_SUPPORT_TITLE.to_string(),
            log_level: Level::INFO,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        let _ = dotenv::dotenv();
        Self::from_lookup(|key| dotenv::var(key).ok().filter(|v| !v.trim().is_empty()))
    }

    /// Build a config from an arbitrary key lookup. Unset keys keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = Self::default();

        if let Some(dir) = lookup("QT_DATA_DIR") {
            cfg.data_dir = PathBuf::from(dir);
        }
        if let Some(raw) = lookup("QT_TAGS") {
            cfg.tags = Some(parse_tag_list(&raw)?);
        }
        if let Some(glob) = lookup("QT_TAG_GLOB") {
            cfg.tag_glob = glob;
        }
        if let Some(url) = lookup("QT_API_URL") {
            cfg.api_url = url;
        }
        if let Some(site) = lookup("QT_SITE") {
            cfg.site = site;
        }
        if let Some(secs) = lookup("QT_HTTP_TIMEOUT_SECS") {
            cfg.http_timeout_secs = secs
                .trim()
                .parse()
                .with_context(|| format!("QT_HTTP_TIMEOUT_SECS is not a number: {}", secs))?;
        }
        if let Some(path) = lookup("QT_TICKET_LOG") {
            cfg.ticket_log = PathBuf::from(path);
        }
        if let Some(path) = lookup("QT_QUESTIONS_CHART") {
            cfg.questions_chart = PathBuf::from(path);
        }
        if let Some(path) = lookup("QT_SUPPORT_CHART") {
            cfg.support_chart = PathBuf::from(path);
        }
        if let Some(title) = lookup("QT_QUESTIONS_TITLE") {
            cfg.questions_title = title;
        }
        if let Some(title) = lookup("QT_SUPPORT_TITLE") {
            cfg.support_title = title;
        }
        if let Some(level) = lookup("QT_LOG") {
            cfg.log_level = level
                .trim()
                .parse()
                .map_err(|_| anyhow::anyhow!("QT_LOG is not a log level: {}", level))?;
        }

        Ok(cfg)
    }

    /// The tags to process this run: the explicit list if configured, else discovery.
    pub fn resolve_tags(&self) -> Result<Vec<String>> {
        match &self.tags {
            Some(tags) => Ok(tags.clone()),
            None => discover::discover_tags(&self.data_dir, &self.tag_glob),
        }
    }

    pub fn tag_table(&self, tag: &str) -> PathBuf {
        self.data_dir.join(format!("{}.csv", tag))
    }
}

fn parse_tag_list(raw: &str) -> Result<Vec<String>> {
    let mut tags = Vec::new();
    for tag in raw.split(',').map(str::trim).filter(|t| !t.is_empty()) {
        discover::validate_tag(tag)?;
        if !tags.iter().any(|t| t == tag) {
            tags.push(tag.to_string());
        }
    }
    if tags.is_empty() {
        bail!("QT_TAGS is set but lists no tags");
    }
    Ok(tags)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let cfg = AppConfig::from_lookup(|_| None).unwrap();
        assert_eq!(cfg.api_url, DEFAULT_API_URL);
        assert_eq!(cfg.site, "stackoverflow");
        assert_eq!(cfg.questions_chart, PathBuf::from("questions.png"));
        assert_eq!(cfg.support_chart, PathBuf::from("support.png"));
        assert!(cfg.tags.is_none());
    }

    #[test]
    fn test_explicit_tags() {
        let cfg =
            AppConfig::from_lookup(lookup_from(&[("QT_TAGS", "plc, twincat ,plc,codesys")]))
                .unwrap();
        assert_eq!(
            cfg.tags.as_deref(),
            Some(&["plc".to_string(), "twincat".to_string(), "codesys".to_string()][..])
        );
        assert_eq!(cfg.resolve_tags().unwrap().len(), 3);
    }

    #[test]
    fn test_invalid_tag_rejected() {
        let err = AppConfig::from_lookup(lookup_from(&[("QT_TAGS", "plc,Bad Tag")]));
        assert!(err.is_err());
    }

    #[test]
    fn test_empty_tag_list_rejected() {
        assert!(AppConfig::from_lookup(lookup_from(&[("QT_TAGS", " , ")])).is_err());
    }

    #[test]
    fn test_bad_log_level() {
        assert!(AppConfig::from_lookup(lookup_from(&[("QT_LOG", "chatty")])).is_err());
        let cfg = AppConfig::from_lookup(lookup_from(&[("QT_LOG", "debug")])).unwrap();
        assert_eq!(cfg.log_level, Level::DEBUG);
    }

    #[test]
    fn test_tag_table_path() {
        let cfg = AppConfig::from_lookup(lookup_from(&[("QT_DATA_DIR", "/tmp/so")])).unwrap();
        assert_eq!(cfg.tag_table("plc"), PathBuf::from("/tmp/so/plc.csv"));
    }
}
