//! verstamp tools library

pub mod common;
pub mod config;
pub mod report;

pub use common::{init_logging, GlobalConfig, SourceArgs};
pub use config::ReportConfig;
