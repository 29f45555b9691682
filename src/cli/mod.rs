//! Command line interface module
//!
//! Argument parsing, layered configuration and the runner that ties setup,
//! the registry session and the batch together.

pub mod args;
pub mod config;
pub mod runner;

pub use args::{Args, OutputFormat};
pub use config::MigratorConfig;
pub use runner::{RunStatus, Runner};
