//! Shared test utilities

mod provider;

pub use provider::*;
