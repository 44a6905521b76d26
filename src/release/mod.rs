//! Release resolution against the source hosting API
//!
//! # Modules
//!
//! - [`types`]: Repository identity, filters and the resolved release
//! - [`error`]: Typed fetch failures
//! - [`provider`]: `ReleaseProvider` trait used by the driver orchestrator
//! - [`github`]: GitHub REST implementation (releases and tags endpoints)
//! - [`rate_limit`]: Rate-limit header interpretation
//! - [`tag_date`]: Publish timestamp recovery for tag-based repositories

pub mod error;
pub mod github;
pub mod provider;
pub mod rate_limit;
pub mod tag_date;
pub mod types;
