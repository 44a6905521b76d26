use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Why a repository query did not produce a release.
///
/// Failures are terminal for the sub-fetch that produced them; nothing in
/// the resolution pipeline retries.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FetchFailure {
    #[error("{}", rate_limit_message(.reset_time))]
    RateLimited {
        reset_time: Option<DateTime<Utc>>,
    },

    #[error("Repository not found")]
    NotFound,

    #[error("Network error: {message}")]
    NetworkError { message: String },

    #[error("No releases matched the filter")]
    NoMatch,

    #[error("{message}")]
    Other { message: String },
}

fn rate_limit_message(reset_time: &Option<DateTime<Utc>>) -> String {
    match reset_time {
        Some(reset) => format!(
            "Rate limit exceeded. Try again after {}",
            reset.format("%H:%M:%S UTC")
        ),
        None => "Rate limit exceeded. Try again later".to_string(),
    }
}

impl FetchFailure {
    pub fn timeout(what: &str) -> Self {
        FetchFailure::NetworkError {
            message: format!("Timeout fetching {}", what),
        }
    }

    /// Short label for table cells
    pub fn label(&self) -> &'static str {
        match self {
            FetchFailure::RateLimited { .. } => "Rate limited",
            FetchFailure::NotFound => "Repository not found",
            FetchFailure::NetworkError { .. } => "Network error",
            FetchFailure::NoMatch => "No releases found",
            FetchFailure::Other { .. } => "Request failed",
        }
    }
}

impl From<reqwest::Error> for FetchFailure {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            FetchFailure::Other {
                message: format!("Invalid response: {}", e),
            }
        } else {
            FetchFailure::NetworkError {
                message: e.to_string(),
            }
        }
    }
}
