//! Driver resolution: per-driver orchestration and batch execution
//!
//! # Modules
//!
//! - [`spec`]: Static driver configuration and the default fleet
//! - [`result`]: Per-driver outcome record
//! - [`overrides`]: Known-good upstream values for unreliable sources
//! - [`resolve`]: Resolution of a single driver under a timeout
//! - [`batch`]: Concurrent resolution of all drivers and result ordering

pub mod batch;
pub mod overrides;
pub mod resolve;
pub mod result;
pub mod spec;
