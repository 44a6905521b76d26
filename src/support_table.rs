//! Sources of the officially supported driver version table
//!
//! The table is scraped from the vendor documentation by an external
//! process; this module reads its output and normalizes documentation
//! driver names and version labels to the dashboard's keys.

use std::path::PathBuf;
use std::sync::LazyLock;

#[cfg(test)]
use mockall::automock;

use indexmap::IndexMap;
use regex::Regex;
use thiserror::Error;
use tracing::{debug, info};

use crate::version::support::SupportedVersionTable;

/// Documentation driver names mapped to driver keys
const DOCS_NAME_MAPPING: &[(&str, &str)] = &[
    ("python driver", "python-driver"),
    ("go driver", "gocql"),
    ("rust driver", "scylla-rust-driver"),
    ("c# driver", "csharp-driver"),
    ("cpp rs driver", "cpp-rs-driver"),
    ("c++ driver", "cpp-driver"),
    ("node.js rs driver", "nodejs-rs-driver"),
    ("java driver 3.x", "java-driver-3x"),
    ("java driver 4.x", "java-driver-4x"),
];

/// Trailing annotations such as "(Beta)"
static ANNOTATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*\(.*\)").expect("valid annotation regex"));

#[derive(Debug, Error)]
pub enum SupportTableError {
    #[error("Failed to read supported versions from {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid supported versions document: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Trait for fetching the supported version table
#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait SupportedVersionsSource: Send + Sync {
    async fn fetch(&self) -> Result<SupportedVersionTable, SupportTableError>;
}

/// Normalize raw documentation entries into a supported version table.
///
/// Keys are matched case-insensitively against documentation names and
/// fall back to the key itself; empty version lists are dropped.
pub fn from_documentation_entries(entries: IndexMap<String, Vec<String>>) -> SupportedVersionTable {
    let mut table = SupportedVersionTable::new();

    for (name, versions) in entries {
        let lowered = name.trim().to_lowercase();
        let key = DOCS_NAME_MAPPING
            .iter()
            .find(|(docs_name, _)| *docs_name == lowered)
            .map(|(_, key)| key.to_string())
            .unwrap_or(lowered);

        let versions: Vec<String> = versions
            .iter()
            .map(|v| ANNOTATION.replace(v.trim(), "").into_owned())
            .filter(|v| !v.is_empty())
            .collect();

        if versions.is_empty() {
            debug!("Skipping {}: no supported versions listed", key);
            continue;
        }
        table.insert(&key, versions);
    }

    table
}

/// Reads the table from a JSON object of `name -> [versions]`
pub struct JsonFileSource {
    path: PathBuf,
}

impl JsonFileSource {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

#[async_trait::async_trait]
impl SupportedVersionsSource for JsonFileSource {
    async fn fetch(&self) -> Result<SupportedVersionTable, SupportTableError> {
        let content = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|source| SupportTableError::Io {
                path: self.path.clone(),
                source,
            })?;

        let entries: IndexMap<String, Vec<String>> = serde_json::from_str(&content)?;
        let table = from_documentation_entries(entries);
        info!("Loaded supported versions from {:?}", self.path);

        Ok(table)
    }
}

/// Serves a fixed table; used when no documentation output is configured
#[derive(Default)]
pub struct StaticSource {
    table: SupportedVersionTable,
}

impl StaticSource {
    pub fn new(table: SupportedVersionTable) -> Self {
        Self { table }
    }
}

#[async_trait::async_trait]
impl SupportedVersionsSource for StaticSource {
    async fn fetch(&self) -> Result<SupportedVersionTable, SupportTableError> {
        Ok(self.table.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn entries(pairs: Vec<(&str, Vec<&str>)>) -> IndexMap<String, Vec<String>> {
        pairs
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.iter().map(|s| s.to_string()).collect()))
            .collect()
    }

    #[test]
    fn documentation_names_map_to_driver_keys() {
        let table = from_documentation_entries(entries(vec![
            ("Go Driver", vec!["1.14", "1.15 (Beta)"]),
            ("Java Driver 4.x", vec!["4.18"]),
            ("scylla-rust-driver", vec!["1.0"]),
        ]));

        assert_eq!(table.get("gocql"), &["1.14".to_string(), "1.15".to_string()]);
        assert_eq!(table.get("java-driver-4x"), &["4.18".to_string()]);
        assert_eq!(table.get("scylla-rust-driver"), &["1.0".to_string()]);
    }

    #[test]
    fn empty_version_lists_are_dropped() {
        let table = from_documentation_entries(entries(vec![("python driver", vec![])]));
        assert!(table.is_empty());
    }

    #[tokio::test]
    async fn json_file_source_reads_table() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("supported.json");
        std::fs::write(&path, r#"{"gocql": ["1.7"], "Python Driver": ["3.28"]}"#).unwrap();

        let table = JsonFileSource::new(path).fetch().await.unwrap();

        assert_eq!(table.get("gocql"), &["1.7".to_string()]);
        assert_eq!(table.get("python-driver"), &["3.28".to_string()]);
    }

    #[tokio::test]
    async fn json_file_source_reports_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let result = JsonFileSource::new(temp_dir.path().join("missing.json"))
            .fetch()
            .await;

        assert!(matches!(result, Err(SupportTableError::Io { .. })));
    }

    #[tokio::test]
    async fn json_file_source_reports_invalid_json() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("supported.json");
        std::fs::write(&path, "not json").unwrap();

        let result = JsonFileSource::new(path).fetch().await;

        assert!(matches!(result, Err(SupportTableError::Parse(_))));
    }
}
