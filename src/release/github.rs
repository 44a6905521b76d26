//! GitHub REST API release provider
//!
//! Repositories are listed through either the releases endpoint (already
//! ordered newest first by the API) or the tags endpoint (ordered
//! alphabetically, re-sorted here by version). The endpoint is chosen from
//! a static per-repository table, see [`RepoRef::endpoint_kind`].

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};

use crate::config::{DEFAULT_API_BASE_URL, DEFAULT_WEB_BASE_URL, USER_AGENT};
use crate::release::error::FetchFailure;
use crate::release::provider::ReleaseProvider;
use crate::release::rate_limit::{RateLimitStatus, classify_status};
use crate::release::tag_date::resolve_tag_date;
use crate::release::types::{EndpointKind, ReleaseFilter, RepoRef, ResolvedRelease};
use crate::version::semver::{normalize_version, parse};

/// Prefix of fine-grained personal access tokens
const FINE_GRAINED_TOKEN_PREFIX: &str = "github_pat_";

/// Entry of `GET /repos/{owner}/{repo}/releases`
#[derive(Debug, Clone, Deserialize)]
struct Release {
    tag_name: String,
    #[serde(default)]
    prerelease: bool,
    #[serde(default)]
    draft: bool,
    published_at: Option<DateTime<Utc>>,
    created_at: Option<DateTime<Utc>>,
    html_url: Option<String>,
}

/// Entry of `GET /repos/{owner}/{repo}/tags`
#[derive(Debug, Clone, Deserialize)]
struct Tag {
    name: String,
}

/// Result of a single access check against a repository's releases
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeReport {
    pub status: u16,
    pub rate_limit: RateLimitStatus,
    /// Number of releases returned when the request succeeded
    pub release_count: Option<usize>,
}

/// Build the `Authorization` header value for a token.
///
/// Fine-grained tokens use the `Bearer` scheme, classic tokens `token`.
pub fn authorization_value(token: &str) -> String {
    let scheme = if token.starts_with(FINE_GRAINED_TOKEN_PREFIX) {
        "Bearer"
    } else {
        "token"
    };
    format!("{} {}", scheme, token)
}

/// Release provider backed by the GitHub REST API
pub struct GitHubClient {
    client: reqwest::Client,
    base_url: String,
    web_url: String,
    token: Option<String>,
}

impl GitHubClient {
    /// Creates a new GitHubClient with a custom API base URL
    pub fn new(base_url: &str) -> Self {
        Self {
            client: reqwest::Client::builder()
                .user_agent(USER_AGENT)
                .build()
                .expect("Failed to create HTTP client"),
            base_url: base_url.trim_end_matches('/').to_string(),
            web_url: DEFAULT_WEB_BASE_URL.to_string(),
            token: None,
        }
    }

    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.token = token.filter(|t| !t.is_empty());
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn repo_url(&self, repo: &RepoRef, path: &str) -> String {
        format!("{}/repos/{}/{}/{}", self.base_url, repo.owner, repo.name, path)
    }

    fn get(&self, url: &str) -> reqwest::RequestBuilder {
        let request = self
            .client
            .get(url)
            .header("Accept", "application/vnd.github.v3+json");

        match &self.token {
            Some(token) => request.header("Authorization", authorization_value(token)),
            None => request,
        }
    }

    /// GET a JSON document, mapping status and transport errors to failures
    pub(crate) async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, FetchFailure> {
        let response = self.get(url).send().await?;
        let status = response.status();
        let rate_limit = RateLimitStatus::from_headers(response.headers());

        if let Some(remaining) = rate_limit.remaining {
            debug!("Rate limit remaining: {} ({})", remaining, url);
        }

        if !status.is_success() {
            let failure = classify_status(status, &rate_limit);
            warn!("GitHub API returned status {}: {} ({})", status, url, failure);
            return Err(failure);
        }

        response.json().await.map_err(|e| {
            warn!("Failed to parse GitHub response from {}: {}", url, e);
            FetchFailure::Other {
                message: format!("Invalid response: {}", e),
            }
        })
    }

    async fn latest_from_releases(
        &self,
        repo: &RepoRef,
        filter: &ReleaseFilter,
    ) -> Result<ResolvedRelease, FetchFailure> {
        let releases: Vec<Release> = self
            .get_json(&self.repo_url(repo, EndpointKind::Releases.as_str()))
            .await?;
        debug!("Found {} releases for {}", releases.len(), repo);

        let release = select_release(releases, filter).ok_or(FetchFailure::NoMatch)?;
        let published_at = release
            .published_at
            .or(release.created_at)
            .unwrap_or_else(|| {
                debug!("Release {} of {} has no publish date", release.tag_name, repo);
                Utc::now()
            });
        let url = release
            .html_url
            .unwrap_or_else(|| self.tag_web_url(repo, &release.tag_name));

        Ok(ResolvedRelease {
            version: normalize_version(&release.tag_name).to_string(),
            published_at,
            url,
        })
    }

    async fn latest_from_tags(
        &self,
        repo: &RepoRef,
        filter: &ReleaseFilter,
    ) -> Result<ResolvedRelease, FetchFailure> {
        let tags: Vec<Tag> = self
            .get_json(&self.repo_url(repo, EndpointKind::Tags.as_str()))
            .await?;
        debug!("Found {} tags for {}", tags.len(), repo);

        let tag = select_tag(tags, filter).ok_or(FetchFailure::NoMatch)?;
        let published_at = match resolve_tag_date(self, repo, &tag.name).await {
            Some(date) => date,
            None => {
                info!(
                    "Could not resolve a date for tag {} of {}, using current time",
                    tag.name, repo
                );
                Utc::now()
            }
        };

        Ok(ResolvedRelease {
            version: normalize_version(&tag.name).to_string(),
            published_at,
            url: self.tag_web_url(repo, &tag.name),
        })
    }

    fn tag_web_url(&self, repo: &RepoRef, tag: &str) -> String {
        format!(
            "{}/{}/{}/releases/tag/{}",
            self.web_url, repo.owner, repo.name, tag
        )
    }

    /// Check access to a repository's releases and report the quota state
    pub async fn probe(&self, repo: &RepoRef) -> Result<ProbeReport, FetchFailure> {
        let response = self
            .get(&self.repo_url(repo, EndpointKind::Releases.as_str()))
            .send()
            .await?;
        let status = response.status();
        let rate_limit = RateLimitStatus::from_headers(response.headers());

        let release_count = if status.is_success() {
            let releases: Vec<serde_json::Value> = response.json().await?;
            Some(releases.len())
        } else {
            None
        };

        Ok(ProbeReport {
            status: status.as_u16(),
            rate_limit,
            release_count,
        })
    }
}

impl Default for GitHubClient {
    fn default() -> Self {
        Self::new(DEFAULT_API_BASE_URL)
    }
}

#[async_trait::async_trait]
impl ReleaseProvider for GitHubClient {
    async fn resolve_latest(
        &self,
        repo: &RepoRef,
        filter: &ReleaseFilter,
    ) -> Result<ResolvedRelease, FetchFailure> {
        let endpoint = repo.endpoint_kind();
        debug!(
            "Fetching {} for {} (prefix: {:?}, prereleases: {})",
            endpoint.as_str(),
            repo,
            filter.version_prefix,
            filter.include_prereleases
        );

        match endpoint {
            EndpointKind::Releases => self.latest_from_releases(repo, filter).await,
            EndpointKind::Tags => self.latest_from_tags(repo, filter).await,
        }
    }
}

/// Pick the first eligible release; the API already orders newest first
fn select_release(releases: Vec<Release>, filter: &ReleaseFilter) -> Option<Release> {
    releases.into_iter().find(|release| {
        (filter.include_prereleases || !release.prerelease)
            && !release.draft
            && filter.matches_prefix(&release.tag_name)
    })
}

/// Pick the highest-versioned tag passing the prefix filter
///
/// Ties keep the earliest tag in API order.
fn select_tag(tags: Vec<Tag>, filter: &ReleaseFilter) -> Option<Tag> {
    let mut candidates: Vec<(Tag, _)> = tags
        .into_iter()
        .filter(|tag| filter.matches_prefix(&tag.name))
        .map(|tag| {
            let version = parse(&tag.name);
            (tag, version)
        })
        .collect();

    candidates.sort_by(|(_, a), (_, b)| b.cmp(a));
    candidates.into_iter().next().map(|(tag, _)| tag)
}
