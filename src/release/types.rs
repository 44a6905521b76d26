//! Common types for release resolution

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Repositories listed through the tags endpoint instead of releases.
///
/// These projects publish git tags without GitHub releases.
const TAG_REPOSITORIES: &[(&str, &str)] = &[("apache", "cassandra-python-driver")];

/// Repository identity on the hosting service (`owner/name`)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RepoRef {
    pub owner: String,
    pub name: String,
}

impl RepoRef {
    pub fn new(owner: &str, name: &str) -> Self {
        Self {
            owner: owner.to_string(),
            name: name.to_string(),
        }
    }

    /// Listing endpoint for this repository
    pub fn endpoint_kind(&self) -> EndpointKind {
        let is_tags = TAG_REPOSITORIES
            .iter()
            .any(|(owner, name)| *owner == self.owner && *name == self.name);

        if is_tags {
            EndpointKind::Tags
        } else {
            EndpointKind::Releases
        }
    }
}

impl fmt::Display for RepoRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

impl FromStr for RepoRef {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once('/') {
            Some((owner, name))
                if !owner.is_empty() && !name.is_empty() && !name.contains('/') =>
            {
                Ok(Self::new(owner, name))
            }
            _ => Err(format!("Invalid repository '{}', expected owner/name", s)),
        }
    }
}

impl TryFrom<String> for RepoRef {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<RepoRef> for String {
    fn from(value: RepoRef) -> Self {
        value.to_string()
    }
}

/// Listing shape used to discover a repository's versions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndpointKind {
    /// `GET /repos/{owner}/{repo}/releases`, ordered newest first
    Releases,
    /// `GET /repos/{owner}/{repo}/tags`, ordered alphabetically
    Tags,
}

impl EndpointKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EndpointKind::Releases => "releases",
            EndpointKind::Tags => "tags",
        }
    }
}

/// Candidate filtering applied before selecting the latest release
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReleaseFilter {
    /// Literal prefix the raw tag name must start with (e.g. "3.")
    pub version_prefix: Option<String>,
    /// Keep releases flagged as prerelease (releases endpoint only)
    pub include_prereleases: bool,
}

impl ReleaseFilter {
    pub fn matches_prefix(&self, tag: &str) -> bool {
        self.version_prefix
            .as_deref()
            .is_none_or(|prefix| tag.starts_with(prefix))
    }
}

/// The single best release selected for a repository
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedRelease {
    /// Tag name without the leading `v`
    pub version: String,
    pub published_at: DateTime<Utc>,
    pub url: String,
}
