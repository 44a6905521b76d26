//! Rate-limit header interpretation for the GitHub REST API

use chrono::{DateTime, TimeZone, Utc};
use reqwest::StatusCode;
use reqwest::header::HeaderMap;

use crate::release::error::FetchFailure;

const REMAINING_HEADER: &str = "x-ratelimit-remaining";
const RESET_HEADER: &str = "x-ratelimit-reset";

/// Rate-limit state reported by a response
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RateLimitStatus {
    pub remaining: Option<u64>,
    pub reset_time: Option<DateTime<Utc>>,
}

impl RateLimitStatus {
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let header = |name: &str| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::trim)
        };

        Self {
            remaining: header(REMAINING_HEADER).and_then(|v| v.parse().ok()),
            reset_time: header(RESET_HEADER)
                .and_then(|v| v.parse::<i64>().ok())
                .and_then(|secs| Utc.timestamp_opt(secs, 0).single()),
        }
    }

    pub fn is_exhausted(&self) -> bool {
        self.remaining == Some(0)
    }
}

/// Map a non-success response to a typed failure.
///
/// Only a 403 with an exhausted quota is a rate limit; other 403s are
/// reported as generic failures.
pub fn classify_status(status: StatusCode, rate_limit: &RateLimitStatus) -> FetchFailure {
    if status == StatusCode::FORBIDDEN && rate_limit.is_exhausted() {
        return FetchFailure::RateLimited {
            reset_time: rate_limit.reset_time,
        };
    }

    if status == StatusCode::NOT_FOUND {
        return FetchFailure::NotFound;
    }

    FetchFailure::Other {
        message: format!("Unexpected status: {}", status),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;
    use rstest::rstest;

    fn headers(remaining: Option<&str>, reset: Option<&str>) -> HeaderMap {
        let mut map = HeaderMap::new();
        if let Some(remaining) = remaining {
            map.insert(REMAINING_HEADER, HeaderValue::from_str(remaining).unwrap());
        }
        if let Some(reset) = reset {
            map.insert(RESET_HEADER, HeaderValue::from_str(reset).unwrap());
        }
        map
    }

    #[test]
    fn from_headers_parses_remaining_and_reset() {
        let status = RateLimitStatus::from_headers(&headers(Some("0"), Some("1700000000")));

        assert_eq!(status.remaining, Some(0));
        assert_eq!(status.reset_time, Utc.timestamp_opt(1_700_000_000, 0).single());
        assert!(status.is_exhausted());
    }

    #[test]
    fn from_headers_tolerates_missing_and_garbage_values() {
        let status = RateLimitStatus::from_headers(&headers(Some("lots"), Some("soon")));

        assert_eq!(status, RateLimitStatus::default());
        assert!(!status.is_exhausted());
    }

    #[rstest]
    #[case(StatusCode::FORBIDDEN, Some("0"), "Rate limited")]
    #[case(StatusCode::FORBIDDEN, Some("12"), "Request failed")]
    #[case(StatusCode::FORBIDDEN, None, "Request failed")]
    #[case(StatusCode::NOT_FOUND, Some("0"), "Repository not found")]
    #[case(StatusCode::INTERNAL_SERVER_ERROR, None, "Request failed")]
    fn classify_status_returns_expected_kind(
        #[case] status: StatusCode,
        #[case] remaining: Option<&str>,
        #[case] expected_label: &str,
    ) {
        let rate_limit = RateLimitStatus::from_headers(&headers(remaining, None));
        assert_eq!(classify_status(status, &rate_limit).label(), expected_label);
    }
}
