//! Release provider trait for resolving the latest release of a repository

#[cfg(test)]
use mockall::automock;

use crate::release::error::FetchFailure;
use crate::release::types::{ReleaseFilter, RepoRef, ResolvedRelease};

/// Trait for resolving the latest release of a repository
#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait ReleaseProvider: Send + Sync {
    /// Resolves the single latest release of `repo` that passes `filter`
    ///
    /// # Returns
    /// * `Ok(ResolvedRelease)` - The best candidate
    /// * `Err(FetchFailure)` - Typed failure; callers must not retry
    async fn resolve_latest(
        &self,
        repo: &RepoRef,
        filter: &ReleaseFilter,
    ) -> Result<ResolvedRelease, FetchFailure>;
}
