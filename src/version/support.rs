//! Supported-version matching and upstream compatibility

use std::cmp::Ordering;
use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::version::semver::try_parse;

/// Officially supported versions per driver key, as published in the
/// vendor documentation.
///
/// One upstream project may appear under several keys (e.g. the Java
/// driver is split into `java-driver-3x` and `java-driver-4x`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SupportedVersionTable {
    entries: IndexMap<String, Vec<String>>,
}

impl SupportedVersionTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_versions(mut self, driver: &str, versions: &[&str]) -> Self {
        self.insert(driver, versions.iter().map(|v| v.to_string()).collect());
        self
    }

    pub fn insert(&mut self, driver: &str, versions: Vec<String>) {
        self.entries.insert(driver.to_string(), versions);
    }

    pub fn get(&self, driver: &str) -> &[String] {
        self.entries.get(driver).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Overlay another table; keys present in `other` replace ours.
    pub fn merge(&mut self, other: SupportedVersionTable) {
        self.entries.extend(other.entries);
    }
}

/// Check whether `version` is covered by a supported entry for `driver`.
///
/// An entry covers a version when they are equal or the version extends the
/// entry at a dot boundary: `4.18` covers `4.18.1` but not `4.180`.
pub fn is_supported(driver: &str, version: &str, table: &SupportedVersionTable) -> bool {
    if version.is_empty() {
        return false;
    }

    table.get(driver).iter().any(|supported| {
        version == supported
            || version
                .strip_prefix(supported.as_str())
                .is_some_and(|rest| rest.starts_with('.'))
    })
}

/// Relationship between a Scylla fork release and its upstream release
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SupportMatrix {
    /// Same major.minor.patch
    Compatible,
    /// Scylla fork is newer than upstream
    Ahead,
    /// Scylla fork is older than upstream
    Behind,
    /// One side is missing or unparseable
    Unknown,
    /// Driver has no upstream project
    NotApplicable,
}

impl SupportMatrix {
    pub fn as_str(&self) -> &'static str {
        match self {
            SupportMatrix::Compatible => "Compatible",
            SupportMatrix::Ahead => "Ahead",
            SupportMatrix::Behind => "Behind",
            SupportMatrix::Unknown => "Unknown",
            SupportMatrix::NotApplicable => "N/A",
        }
    }
}

impl fmt::Display for SupportMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Compute the support matrix for a driver.
///
/// `has_upstream` comes from configuration, not from fetch results: a
/// driver with an upstream repository whose release could not be resolved
/// is `Unknown`, never `NotApplicable`. Versions that are not a
/// `major.minor.patch` triple are also `Unknown` rather than compared as
/// `0.0.0`.
pub fn support_matrix(
    has_upstream: bool,
    scylla_version: Option<&str>,
    cassandra_version: Option<&str>,
) -> SupportMatrix {
    if !has_upstream {
        return SupportMatrix::NotApplicable;
    }

    let (Some(scylla), Some(cassandra)) = (
        scylla_version.and_then(try_parse),
        cassandra_version.and_then(try_parse),
    ) else {
        return SupportMatrix::Unknown;
    };

    match scylla.cmp(&cassandra) {
        Ordering::Equal => SupportMatrix::Compatible,
        Ordering::Greater => SupportMatrix::Ahead,
        Ordering::Less => SupportMatrix::Behind,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn table() -> SupportedVersionTable {
        SupportedVersionTable::new()
            .with_versions("gocql", &["1.7"])
            .with_versions("java-driver-4x", &["4.18", "4.17.0"])
    }

    #[rstest]
    #[case("gocql", "1.7.2", true)]
    #[case("gocql", "1.7", true)]
    #[case("gocql", "1.70.0", false)]
    #[case("gocql", "1.6.9", false)]
    #[case("gocql", "", false)]
    #[case("java-driver-4x", "4.18.1.0", true)]
    #[case("java-driver-4x", "4.180.0", false)]
    #[case("java-driver-4x", "4.17.0", true)]
    #[case("java-driver-4x", "4.17.01", false)]
    #[case("python-driver", "3.29.0", false)]
    fn is_supported_matches_at_dot_boundary(
        #[case] driver: &str,
        #[case] version: &str,
        #[case] expected: bool,
    ) {
        assert_eq!(is_supported(driver, version, &table()), expected);
    }

    #[rstest]
    #[case(false, Some("1.0.0"), None, SupportMatrix::NotApplicable)]
    #[case(false, None, None, SupportMatrix::NotApplicable)]
    #[case(true, Some("1.0.0"), None, SupportMatrix::Unknown)]
    #[case(true, None, Some("1.0.0"), SupportMatrix::Unknown)]
    #[case(true, Some("badtag"), Some("other"), SupportMatrix::Unknown)]
    #[case(true, Some("3.22.0"), Some("3.22.0"), SupportMatrix::Compatible)]
    #[case(true, Some("3.29.1"), Some("3.29.0"), SupportMatrix::Ahead)]
    #[case(true, Some("1.7.0"), Some("2.0.0"), SupportMatrix::Behind)]
    fn support_matrix_returns_expected(
        #[case] has_upstream: bool,
        #[case] scylla: Option<&str>,
        #[case] cassandra: Option<&str>,
        #[case] expected: SupportMatrix,
    ) {
        assert_eq!(support_matrix(has_upstream, scylla, cassandra), expected);
    }

    #[test]
    fn merge_replaces_only_overlapping_keys() {
        let mut base = table();
        base.merge(SupportedVersionTable::new().with_versions("gocql", &["1.8"]));

        assert_eq!(base.get("gocql"), &["1.8".to_string()]);
        assert_eq!(base.get("java-driver-4x").len(), 2);
    }

    #[test]
    fn table_deserializes_from_plain_object() {
        let table: SupportedVersionTable =
            serde_json::from_str(r#"{"gocql": ["1.7", "1.8"]}"#).unwrap();

        assert_eq!(table.get("gocql"), &["1.7".to_string(), "1.8".to_string()]);
    }
}
