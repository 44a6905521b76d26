//! Resolution of a single driver

use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::time::{Instant, timeout_at};
use tracing::{debug, info, warn};

use crate::driver::overrides::upstream_override;
use crate::driver::result::DriverResult;
use crate::driver::spec::DriverSpec;
use crate::release::error::FetchFailure;
use crate::release::provider::ReleaseProvider;
use crate::release::types::{ReleaseFilter, RepoRef, ResolvedRelease};
use crate::version::quarter::{format_quarter, is_current_quarter};
use crate::version::support::{SupportedVersionTable, is_supported, support_matrix};

type FetchOutcome = Result<ResolvedRelease, FetchFailure>;

/// Resolve the Scylla and upstream releases of one driver.
///
/// Both repositories are queried concurrently against a shared deadline;
/// a query still outstanding at the deadline is dropped and recorded as a
/// timeout network error. Never fails: every failure is captured in the
/// returned record.
pub async fn resolve_driver(
    provider: &dyn ReleaseProvider,
    spec: &DriverSpec,
    supported: &SupportedVersionTable,
    timeout: Duration,
) -> DriverResult {
    debug!(
        "Resolving {} (prefix: {:?}, prereleases: {})",
        spec.name, spec.version_prefix, spec.include_prereleases
    );

    let deadline = Instant::now() + timeout;
    let filter = spec.filter();

    let scylla = fetch_before(provider, &spec.scylla_repo, &filter, deadline, &spec.name);
    let cassandra = async {
        match &spec.cassandra_repo {
            Some(repo) => Some(fetch_before(provider, repo, &filter, deadline, &spec.name).await),
            None => None,
        }
    };
    let (scylla, cassandra) = tokio::join!(scylla, cassandra);

    let cassandra = cassandra.map(|outcome| apply_upstream_override(&spec.name, outcome));

    build_result(spec, scylla, cassandra, supported, Utc::now())
}

async fn fetch_before(
    provider: &dyn ReleaseProvider,
    repo: &RepoRef,
    filter: &ReleaseFilter,
    deadline: Instant,
    driver: &str,
) -> FetchOutcome {
    let outcome = timeout_at(deadline, provider.resolve_latest(repo, filter))
        .await
        .unwrap_or_else(|_| Err(FetchFailure::timeout(driver)));

    if let Err(e) = &outcome {
        warn!("Failed to resolve {} for {}: {}", repo, driver, e);
    }
    outcome
}

fn apply_upstream_override(driver: &str, outcome: FetchOutcome) -> FetchOutcome {
    match outcome {
        Ok(release) => Ok(release),
        Err(failure) => match upstream_override(driver) {
            Some(known) => {
                info!(
                    "Upstream fetch for {} failed ({}), using known version {}",
                    driver, failure, known.version
                );
                Ok(known)
            }
            None => Err(failure),
        },
    }
}

/// Assemble the result record from both fetch outcomes.
///
/// `cassandra` is None when the driver has no upstream repository.
pub fn build_result(
    spec: &DriverSpec,
    scylla: FetchOutcome,
    cassandra: Option<FetchOutcome>,
    supported: &SupportedVersionTable,
    now: DateTime<Utc>,
) -> DriverResult {
    let (scylla_release, scylla_error) = split(Some(scylla));
    let (cassandra_release, cassandra_error) = split(cassandra);

    let scylla_version = scylla_release.as_ref().map(|r| r.version.as_str());
    let published_at = scylla_release.as_ref().map(|r| r.published_at);

    DriverResult {
        driver_name: spec.name.clone(),
        description: spec.description.clone(),
        success: scylla_release.is_some(),
        has_upstream: spec.has_upstream(),
        support_matrix: support_matrix(
            spec.has_upstream(),
            scylla_version,
            cassandra_release.as_ref().map(|r| r.version.as_str()),
        ),
        release_quarter: format_quarter(published_at),
        is_current_quarter: is_current_quarter(published_at, now),
        is_scylla_supported: scylla_version
            .is_some_and(|version| is_supported(&spec.name, version, supported)),
        resolved_at: now,
        scylla_release,
        scylla_error,
        cassandra_release,
        cassandra_error,
        error: None,
    }
}

fn split(outcome: Option<FetchOutcome>) -> (Option<ResolvedRelease>, Option<FetchFailure>) {
    match outcome {
        Some(Ok(release)) => (Some(release), None),
        Some(Err(failure)) => (None, Some(failure)),
        None => (None, None),
    }
}
