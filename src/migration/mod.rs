//! Image migration: one entry at a time, then a whole catalog
//!
//! [`migrate`] runs the pull → tag → push → cleanup sequence for a single
//! entry. Each step gates the next; a failure stops the sequence and becomes
//! the entry's [`MigrationOutcome`]. [`BatchRunner`] drives a catalog through
//! it and accumulates a [`RunSummary`].

pub mod batch;
pub mod policy;

use crate::catalog::MigrationEntry;
use crate::error::MigrationError;
use crate::image::ImageRef;
use crate::output::OutputManager;
use crate::runtime::ContainerRuntime;
use tracing::debug;

pub use batch::{BatchRunner, FailedMigration, RunSummary};
pub use policy::RetryPolicy;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MigrationOutcome {
    Success,
    Failure(MigrationError),
}

impl MigrationOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, MigrationOutcome::Success)
    }
}

pub async fn migrate(
    runtime: &dyn ContainerRuntime,
    policy: &RetryPolicy,
    output: &OutputManager,
    entry: &MigrationEntry,
) -> MigrationOutcome {
    let MigrationEntry { source, target } = entry;

    if let Err(err) = pull_with_retry(runtime, policy, output, source).await {
        return MigrationOutcome::Failure(err);
    }

    output.step(&format!("Tagging {} as {}", source, target));
    if let Err(e) = runtime.tag(source, target).await {
        return MigrationOutcome::Failure(MigrationError::Tag {
            detail: e.to_string(),
        });
    }

    output.step(&format!("Pushing {}", target));
    if let Err(e) = runtime.push(target).await {
        return MigrationOutcome::Failure(MigrationError::Push {
            detail: e.to_string(),
        });
    }

    cleanup(runtime, output, entry).await;
    MigrationOutcome::Success
}

async fn pull_with_retry(
    runtime: &dyn ContainerRuntime,
    policy: &RetryPolicy,
    output: &OutputManager,
    source: &ImageRef,
) -> Result<(), MigrationError> {
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 1;
    loop {
        output.step(&format!(
            "Pulling {} (attempt {}/{})",
            source, attempt, max_attempts
        ));
        match runtime.pull(source).await {
            Ok(()) => return Ok(()),
            Err(e) if attempt < max_attempts => {
                output.warning(&format!(
                    "Pull of {} failed ({}), retrying in {}s",
                    source,
                    e,
                    policy.retry_delay.as_secs_f64()
                ));
                tokio::time::sleep(policy.retry_delay).await;
                attempt += 1;
            }
            Err(e) => {
                return Err(MigrationError::Pull {
                    attempts: attempt,
                    detail: e.to_string(),
                });
            }
        }
    }
}

/// Drops both local references; nothing here affects the outcome
async fn cleanup(runtime: &dyn ContainerRuntime, output: &OutputManager, entry: &MigrationEntry) {
    output.step("Removing local copies");
    for image in [&entry.source, &entry.target] {
        if let Err(e) = runtime.remove(image).await {
            debug!("cleanup of {} failed: {}", image, e);
            output.warning(&format!("Could not remove local image {}: {}", image, e));
        }
    }
}
