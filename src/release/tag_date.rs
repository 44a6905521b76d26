//! Publish timestamp recovery for tag-based repositories
//!
//! The tags listing carries no dates, so the date is recovered by following
//! the tag reference: an annotated tag yields its tagger date, a lightweight
//! tag yields the date of the commit it points at. Every hop is optional; a
//! failed hop ends the chain with no date rather than failing resolution.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::debug;

use crate::release::github::GitHubClient;
use crate::release::types::RepoRef;

/// `GET /repos/{owner}/{repo}/git/refs/tags/{tag}`
///
/// The endpoint prefix-matches and answers with a list when several refs
/// share the requested prefix.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum GitRefResponse {
    Single(GitRef),
    Multiple(Vec<GitRef>),
}

impl GitRefResponse {
    fn into_exact(self, tag: &str) -> Option<GitObject> {
        let wanted = format!("refs/tags/{}", tag);
        match self {
            GitRefResponse::Single(git_ref) => Some(git_ref.object),
            GitRefResponse::Multiple(refs) => refs
                .into_iter()
                .find(|r| r.git_ref == wanted)
                .map(|r| r.object),
        }
    }
}

#[derive(Debug, Deserialize)]
struct GitRef {
    #[serde(rename = "ref", default)]
    git_ref: String,
    object: GitObject,
}

#[derive(Debug, Deserialize)]
struct GitObject {
    #[serde(rename = "type")]
    kind: String,
    sha: String,
}

#[derive(Debug, Deserialize)]
struct Signature {
    date: Option<DateTime<Utc>>,
}

/// `GET /repos/{owner}/{repo}/git/tags/{sha}`
#[derive(Debug, Deserialize)]
struct AnnotatedTag {
    tagger: Option<Signature>,
}

/// `GET /repos/{owner}/{repo}/commits/{sha}`
#[derive(Debug, Deserialize)]
struct CommitResponse {
    commit: Option<CommitDetail>,
    committer: Option<Signature>,
}

#[derive(Debug, Deserialize)]
struct CommitDetail {
    committer: Option<Signature>,
}

/// Resolve the creation date of `tag`, or None if no hop yields one.
pub async fn resolve_tag_date(
    client: &GitHubClient,
    repo: &RepoRef,
    tag: &str,
) -> Option<DateTime<Utc>> {
    let object = tag_target(client, repo, tag).await?;

    match object.kind.as_str() {
        "tag" => tagger_date(client, repo, &object.sha).await,
        "commit" => commit_date(client, repo, &object.sha).await,
        other => {
            debug!("Tag {} of {} points at unsupported object {}", tag, repo, other);
            None
        }
    }
}

async fn tag_target(client: &GitHubClient, repo: &RepoRef, tag: &str) -> Option<GitObject> {
    let url = format!(
        "{}/repos/{}/{}/git/refs/tags/{}",
        client.base_url(),
        repo.owner,
        repo.name,
        tag
    );

    client
        .get_json::<GitRefResponse>(&url)
        .await
        .inspect_err(|e| debug!("Failed to fetch ref for tag {} of {}: {}", tag, repo, e))
        .ok()?
        .into_exact(tag)
}

async fn tagger_date(client: &GitHubClient, repo: &RepoRef, sha: &str) -> Option<DateTime<Utc>> {
    let url = format!(
        "{}/repos/{}/{}/git/tags/{}",
        client.base_url(),
        repo.owner,
        repo.name,
        sha
    );

    let date = client
        .get_json::<AnnotatedTag>(&url)
        .await
        .inspect_err(|e| debug!("Failed to fetch tag object {} of {}: {}", sha, repo, e))
        .ok()?
        .tagger?
        .date?;
    debug!("Found tagger date {} for {}", date, repo);
    Some(date)
}

async fn commit_date(client: &GitHubClient, repo: &RepoRef, sha: &str) -> Option<DateTime<Utc>> {
    let url = format!(
        "{}/repos/{}/{}/commits/{}",
        client.base_url(),
        repo.owner,
        repo.name,
        sha
    );

    let commit = client
        .get_json::<CommitResponse>(&url)
        .await
        .inspect_err(|e| debug!("Failed to fetch commit {} of {}: {}", sha, repo, e))
        .ok()?;

    let date = commit
        .commit
        .and_then(|detail| detail.committer)
        .and_then(|signature| signature.date)
        .or_else(|| commit.committer.and_then(|signature| signature.date))?;
    debug!("Using commit date {} for {}", date, repo);
    Some(date)
}
