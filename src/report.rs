//! Plain-text rendering of a resolved batch for the terminal

use std::fmt::Write;

use chrono::{DateTime, Utc};

use crate::driver::result::DriverResult;
use crate::release::error::FetchFailure;
use crate::release::types::ResolvedRelease;
use crate::version::support::SupportedVersionTable;

/// Human-readable age of a date relative to `now`
pub fn relative_time(date: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let days = (now - date).num_days().abs();
    match days {
        0 => "today".to_string(),
        1 => "1 day ago".to_string(),
        n => format!("{} days ago", n),
    }
}

fn release_cell(
    release: Option<&ResolvedRelease>,
    failure: Option<&FetchFailure>,
    now: DateTime<Utc>,
) -> String {
    match (release, failure) {
        (Some(release), _) => format!(
            "{} (released {}, {})",
            release.version,
            release.published_at.format("%Y-%m-%d"),
            relative_time(release.published_at, now)
        ),
        (None, Some(failure)) => format!("error: {} ({})", failure.label(), failure),
        (None, None) => "not available".to_string(),
    }
}

/// Render one block per driver, in the order given
pub fn render(
    results: &[DriverResult],
    supported: &SupportedVersionTable,
    now: DateTime<Utc>,
) -> String {
    let mut out = String::new();

    for result in results {
        let _ = writeln!(out, "{} - {}", result.driver_name, result.description);
        let _ = writeln!(
            out,
            "  scylla:   {}",
            release_cell(
                result.scylla_release.as_ref(),
                result.scylla_error.as_ref(),
                now
            )
        );

        let upstream = if !result.has_upstream {
            "N/A".to_string()
        } else {
            release_cell(
                result.cassandra_release.as_ref(),
                result.cassandra_error.as_ref(),
                now,
            )
        };
        let _ = writeln!(out, "  upstream: {}", upstream);

        if result.scylla_release.is_none() {
            let reason = result.error.as_deref().unwrap_or("unable to determine");
            let _ = writeln!(out, "  status:   {}", reason);
            continue;
        }

        let marker = if result.is_current_quarter { " (current)" } else { "" };
        let _ = writeln!(out, "  state:    {}", result.support_matrix);
        let _ = writeln!(out, "  quarter:  {}{}", result.release_quarter, marker);

        let support = if result.is_scylla_supported {
            "Supported"
        } else {
            "Not supported"
        };
        let listed = supported.get(&result.driver_name);
        if listed.is_empty() {
            let _ = writeln!(out, "  support:  {}", support);
        } else {
            let _ = writeln!(out, "  support:  {} (supported: {})", support, listed.join(", "));
        }
    }

    out
}
