//! Error types for setup, per-image migration and container runtime calls
//!
//! Only [`SetupError`] is fatal. [`MigrationError`] values are recorded in the
//! run summary and [`RuntimeError`] is what the container runtime seam returns.

use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, SetupError>;

/// Failures that abort the process before any image is migrated
#[derive(Debug, Error)]
pub enum SetupError {
    /// A required credential variable is unset or empty
    #[error("Missing credential: environment variable {0} must be set")]
    MissingCredential(&'static str),

    /// The container runtime CLI cannot be executed
    #[error("Container runtime '{program}' is not available: {reason}")]
    RuntimeUnavailable { program: String, reason: String },

    /// Login against the destination registry was rejected
    #[error("Authentication error: {0}")]
    Authentication(String),

    /// A catalog line could not be turned into an entry
    #[error("Catalog error at line {line}: {message}")]
    Catalog { line: usize, message: String },

    /// An image reference is malformed
    #[error("Invalid image reference '{reference}': {reason}")]
    InvalidReference { reference: String, reason: String },

    /// Configuration file or value is invalid
    #[error("Configuration error: {0}")]
    Config(String),

    /// A catalog or config file could not be read
    #[error("Cannot read {}: {source}", .path.display())]
    File {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Per-image failure, recorded in the summary and never fatal
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MigrationError {
    #[error("pull failed after {attempts} attempts")]
    Pull { attempts: u32, detail: String },

    #[error("tag failed")]
    Tag { detail: String },

    #[error("push failed")]
    Push { detail: String },
}

impl MigrationError {
    /// Runtime output attached to the failure, for the progress log
    pub fn detail(&self) -> &str {
        match self {
            MigrationError::Pull { detail, .. }
            | MigrationError::Tag { detail }
            | MigrationError::Push { detail } => detail,
        }
    }
}

/// Error returned by a [`ContainerRuntime`](crate::runtime::ContainerRuntime) operation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuntimeError {
    /// The runtime program could not be started at all
    #[error("failed to run {program}: {reason}")]
    Spawn { program: String, reason: String },

    /// The runtime ran and reported failure
    #[error("{operation} exited with {status}: {stderr}")]
    Failed {
        operation: String,
        status: String,
        stderr: String,
    },
}

impl RuntimeError {
    pub fn failed(operation: impl Into<String>, stderr: impl Into<String>) -> Self {
        RuntimeError::Failed {
            operation: operation.into(),
            status: "status 1".to_string(),
            stderr: stderr.into(),
        }
    }
}
