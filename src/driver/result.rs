//! Per-driver outcome of a resolution cycle

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::driver::spec::DriverSpec;
use crate::release::error::FetchFailure;
use crate::release::types::ResolvedRelease;
use crate::version::support::SupportMatrix;

/// Outcome of resolving one driver.
///
/// `success` is true iff the Scylla side resolved; an upstream failure is
/// recorded in `cassandra_error` without affecting it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriverResult {
    pub driver_name: String,
    pub description: String,
    pub success: bool,
    /// Whether the driver tracks an upstream project at all
    #[serde(default)]
    pub has_upstream: bool,
    pub scylla_release: Option<ResolvedRelease>,
    pub scylla_error: Option<FetchFailure>,
    pub cassandra_release: Option<ResolvedRelease>,
    pub cassandra_error: Option<FetchFailure>,
    /// Set when resolution itself failed unexpectedly
    pub error: Option<String>,
    pub support_matrix: SupportMatrix,
    pub release_quarter: String,
    pub is_current_quarter: bool,
    pub is_scylla_supported: bool,
    pub resolved_at: DateTime<Utc>,
}

impl DriverResult {
    /// Result for a driver whose resolution aborted before producing data
    pub fn failed(spec: &DriverSpec, message: &str) -> Self {
        Self {
            driver_name: spec.name.clone(),
            description: spec.description.clone(),
            success: false,
            has_upstream: spec.has_upstream(),
            scylla_release: None,
            scylla_error: None,
            cassandra_release: None,
            cassandra_error: None,
            error: Some(message.to_string()),
            support_matrix: if spec.has_upstream() {
                SupportMatrix::Unknown
            } else {
                SupportMatrix::NotApplicable
            },
            release_quarter: "N/A".to_string(),
            is_current_quarter: false,
            is_scylla_supported: false,
            resolved_at: Utc::now(),
        }
    }

    pub fn scylla_published_at(&self) -> Option<DateTime<Utc>> {
        self.scylla_release.as_ref().map(|r| r.published_at)
    }
}
