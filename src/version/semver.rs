use std::cmp::Ordering;
use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

static VERSION_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+)\.(\d+)\.(\d+)").expect("valid version regex"));

/// A `major.minor.patch` triple parsed from a release tag.
///
/// Ordering only looks at the numeric triple; any pre-release or build
/// suffix present in `original` is ignored.
#[derive(Debug, Clone)]
pub struct SemVer {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
    /// The raw input, kept for display
    pub original: String,
}

impl SemVer {
    fn triple(&self) -> (u64, u64, u64) {
        (self.major, self.minor, self.patch)
    }
}

impl PartialEq for SemVer {
    fn eq(&self, other: &Self) -> bool {
        self.triple() == other.triple()
    }
}

impl Eq for SemVer {}

impl PartialOrd for SemVer {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SemVer {
    fn cmp(&self, other: &Self) -> Ordering {
        self.triple().cmp(&other.triple())
    }
}

impl fmt::Display for SemVer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// Strip a single leading `v` from a tag name.
///
/// Examples:
/// - "v1.2.3" -> "1.2.3"
/// - "1.2.3" -> "1.2.3"
/// - "vv1.0.0" -> "v1.0.0"
pub fn normalize_version(raw: &str) -> &str {
    raw.strip_prefix('v').unwrap_or(raw)
}

/// Strictly parse a version, returning None when the input does not start
/// with a `\d+.\d+.\d+` triple (after an optional leading `v`).
pub fn try_parse(raw: &str) -> Option<SemVer> {
    let captures = VERSION_PATTERN.captures(normalize_version(raw))?;
    let component = |i: usize| captures.get(i)?.as_str().parse::<u64>().ok();

    Some(SemVer {
        major: component(1)?,
        minor: component(2)?,
        patch: component(3)?,
        original: raw.to_string(),
    })
}

/// Parse a version leniently.
///
/// Unparseable input maps to `0.0.0` with `original` preserved, so a tag
/// that does not look like a version still sorts and displays.
pub fn parse(raw: &str) -> SemVer {
    try_parse(raw).unwrap_or_else(|| SemVer {
        major: 0,
        minor: 0,
        patch: 0,
        original: raw.to_string(),
    })
}

/// Compare two version strings on their parsed numeric triple.
pub fn compare(a: &str, b: &str) -> Ordering {
    parse(a).cmp(&parse(b))
}
