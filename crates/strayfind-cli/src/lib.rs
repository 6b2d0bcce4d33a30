#![warn(missing_docs)]

//! strayfind CLI: finds files in an Immich storage tree the server has no record of
//!
//! flags + config file → RunConfig → Runner (catalog → scan → reconcile → report → relocate)

pub mod cli;
pub mod config;
pub mod report;
pub mod runner;

pub use cli::Cli;
pub use config::{RunConfig, StrayConfig};
pub use report::{render_report, DRY_RUN_NOTICE};
pub use runner::{RunMode, RunReport, Runner};
