pub mod cache;
pub mod config;
pub mod dashboard;
pub mod driver;
pub mod logging;
pub mod release;
pub mod report;
pub mod support_table;
pub mod version;
