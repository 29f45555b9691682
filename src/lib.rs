//! Image Migrator Library
//!
//! Copies a catalog of container images from public registries into a
//! private registry by driving an external container runtime CLI.

pub mod catalog;
pub mod cli;
pub mod error;
pub mod image;
pub mod migration;
pub mod output;
pub mod registry;
pub mod runtime;

pub use catalog::{Catalog, CatalogEntry, MigrationEntry};
pub use error::{MigrationError, Result, RuntimeError, SetupError};
pub use image::ImageRef;
pub use migration::{BatchRunner, MigrationOutcome, RetryPolicy, RunSummary, migrate};
pub use output::OutputManager;
pub use runtime::{CliRuntime, ContainerRuntime};
