//! Calendar quarter classification of release dates

use std::fmt;

use chrono::{DateTime, Datelike, Utc};

/// A calendar quarter, computed in UTC
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quarter {
    /// 1-4
    pub quarter: u32,
    pub year: i32,
}

impl Quarter {
    pub fn of(date: DateTime<Utc>) -> Self {
        Self {
            quarter: (date.month() - 1) / 3 + 1,
            year: date.year(),
        }
    }
}

impl fmt::Display for Quarter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Q{} {}", self.quarter, self.year)
    }
}

/// Format the quarter of a publish date, or "N/A" when there is none.
pub fn format_quarter(date: Option<DateTime<Utc>>) -> String {
    date.map(|d| Quarter::of(d).to_string())
        .unwrap_or_else(|| "N/A".to_string())
}

/// Whether `date` falls in the same quarter and year as `now`.
pub fn is_current_quarter(date: Option<DateTime<Utc>>, now: DateTime<Utc>) -> bool {
    date.is_some_and(|d| Quarter::of(d) == Quarter::of(now))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn at(s: &str) -> DateTime<Utc> {
        s.parse().unwrap()
    }

    #[rstest]
    #[case("2024-01-01T00:00:00Z", "Q1 2024")]
    #[case("2024-03-31T23:59:59Z", "Q1 2024")]
    #[case("2024-04-01T00:00:00Z", "Q2 2024")]
    #[case("2023-09-15T12:00:00Z", "Q3 2023")]
    #[case("2023-12-31T00:00:00Z", "Q4 2023")]
    fn format_quarter_returns_expected(#[case] date: &str, #[case] expected: &str) {
        assert_eq!(format_quarter(Some(at(date))), expected);
    }

    #[test]
    fn format_quarter_without_date_is_na() {
        assert_eq!(format_quarter(None), "N/A");
    }

    #[rstest]
    #[case("2024-05-01T00:00:00Z", "2024-06-30T00:00:00Z", true)]
    #[case("2024-03-31T00:00:00Z", "2024-04-01T00:00:00Z", false)]
    #[case("2023-05-01T00:00:00Z", "2024-05-01T00:00:00Z", false)]
    fn is_current_quarter_requires_same_quarter_and_year(
        #[case] release: &str,
        #[case] now: &str,
        #[case] expected: bool,
    ) {
        assert_eq!(is_current_quarter(Some(at(release)), at(now)), expected);
    }

    #[test]
    fn is_current_quarter_without_date_is_false() {
        assert!(!is_current_quarter(None, Utc::now()));
    }
}
