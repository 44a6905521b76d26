//! Release provider test utilities

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;

use driver_dashboard::release::error::FetchFailure;
use driver_dashboard::release::provider::ReleaseProvider;
use driver_dashboard::release::types::{ReleaseFilter, RepoRef, ResolvedRelease};

/// Mock provider answering from a fixed table of repositories
#[derive(Default)]
pub struct MockProvider {
    outcomes: HashMap<String, Result<ResolvedRelease, FetchFailure>>,
    hanging: HashSet<String>,
    calls: Mutex<Vec<String>>,
}

impl MockProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_release(mut self, repo: &str, version: &str, published_at: &str) -> Self {
        self.outcomes.insert(
            repo.to_string(),
            Ok(ResolvedRelease {
                version: version.to_string(),
                published_at: published_at.parse().unwrap(),
                url: format!("https://github.com/{}/releases/tag/{}", repo, version),
            }),
        );
        self
    }

    pub fn with_failure(mut self, repo: &str, failure: FetchFailure) -> Self {
        self.outcomes.insert(repo.to_string(), Err(failure));
        self
    }

    /// Queries for `repo` never complete
    pub fn with_hang(mut self, repo: &str) -> Self {
        self.hanging.insert(repo.to_string());
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ReleaseProvider for MockProvider {
    async fn resolve_latest(
        &self,
        repo: &RepoRef,
        _filter: &ReleaseFilter,
    ) -> Result<ResolvedRelease, FetchFailure> {
        let key = repo.to_string();
        self.calls.lock().unwrap().push(key.clone());

        if self.hanging.contains(&key) {
            return std::future::pending().await;
        }

        self.outcomes
            .get(&key)
            .cloned()
            .unwrap_or(Err(FetchFailure::NotFound))
    }
}
