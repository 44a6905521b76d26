//! Concurrent resolution of the driver fleet

use std::cmp::Reverse;
use std::panic::AssertUnwindSafe;
use std::time::Duration;

use chrono::{DateTime, Utc};
use futures::FutureExt;
use futures::future::join_all;
use thiserror::Error;
use tokio::time::timeout;
use tracing::{error, info};

use crate::config::TimeoutConfig;
use crate::driver::resolve::resolve_driver;
use crate::driver::result::DriverResult;
use crate::driver::spec::DriverSpec;
use crate::release::provider::ReleaseProvider;
use crate::version::support::SupportedVersionTable;

#[derive(Debug, Error)]
pub enum BatchError {
    #[error("Fetch timeout after {} seconds", .0.as_secs_f64())]
    Timeout(Duration),
}

/// Resolve every driver concurrently and order the results.
///
/// Each driver is bounded by the per-driver timeout and a failure in one
/// driver never affects its siblings. The batch timeout covers the whole
/// run; exceeding it discards all partial results.
pub async fn resolve_all(
    provider: &dyn ReleaseProvider,
    specs: &[DriverSpec],
    supported: &SupportedVersionTable,
    timeouts: &TimeoutConfig,
) -> Result<Vec<DriverResult>, BatchError> {
    info!("Resolving {} drivers", specs.len());

    let futures = specs.iter().map(|spec| async move {
        AssertUnwindSafe(resolve_driver(provider, spec, supported, timeouts.driver()))
            .catch_unwind()
            .await
            .unwrap_or_else(|_| {
                error!("Resolution of {} panicked", spec.name);
                DriverResult::failed(spec, &format!("Unexpected error fetching {}", spec.name))
            })
    });

    let mut results = timeout(timeouts.batch(), join_all(futures))
        .await
        .map_err(|_| BatchError::Timeout(timeouts.batch()))?;

    sort_results(&mut results);

    let succeeded = results.iter().filter(|r| r.success).count();
    info!("Resolved {}/{} drivers", succeeded, results.len());

    Ok(results)
}

/// Order by Scylla publish date, newest first.
///
/// Results without a Scylla release sort as the epoch, i.e. last. The sort
/// is stable, so ties keep their input order.
pub fn sort_results(results: &mut [DriverResult]) {
    results.sort_by_key(|r| {
        Reverse(
            r.scylla_published_at()
                .unwrap_or(DateTime::<Utc>::UNIX_EPOCH),
        )
    });
}
