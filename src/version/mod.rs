//! Version model for driver releases
//!
//! Pure functions with no I/O: parsing and ordering of release versions,
//! matching against the officially supported version table, and calendar
//! quarter classification of publish dates.
//!
//! # Modules
//!
//! - [`semver`]: Lenient `major.minor.patch` parsing and comparison
//! - [`support`]: Supported-version matching and the upstream support matrix
//! - [`quarter`]: Calendar quarter derivation from publish timestamps

pub mod quarter;
pub mod semver;
pub mod support;
