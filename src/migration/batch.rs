//! Catalog-wide run with partial-failure accounting

use crate::catalog::{Catalog, MigrationEntry};
use crate::error::MigrationError;
use crate::image::ImageRef;
use crate::migration::{MigrationOutcome, RetryPolicy, migrate};
use crate::output::{OutputManager, format_duration};
use crate::runtime::ContainerRuntime;
use serde::Serialize;
use std::time::Instant;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailedMigration {
    pub source: ImageRef,
    pub target: ImageRef,
    pub reason: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub detail: String,
}

/// Aggregate over every migration entry of a run
///
/// `success_count + failures.len() == total_count` holds after every
/// [`record`](RunSummary::record).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub total_count: usize,
    pub success_count: usize,
    /// Catalog order
    pub failures: Vec<FailedMigration>,
}

impl RunSummary {
    pub fn record(&mut self, entry: &MigrationEntry, outcome: MigrationOutcome) {
        self.total_count += 1;
        match outcome {
            MigrationOutcome::Success => self.success_count += 1,
            MigrationOutcome::Failure(err) => {
                self.failures.push(FailedMigration::new(entry, err))
            }
        }
    }

    pub fn failure_count(&self) -> usize {
        self.failures.len()
    }

    pub fn failed_sources(&self) -> impl Iterator<Item = &ImageRef> {
        self.failures.iter().map(|f| &f.source)
    }

    pub fn is_complete_success(&self) -> bool {
        self.failures.is_empty()
    }
}

impl FailedMigration {
    fn new(entry: &MigrationEntry, err: MigrationError) -> Self {
        Self {
            source: entry.source.clone(),
            target: entry.target.clone(),
            reason: err.to_string(),
            detail: err.detail().to_string(),
        }
    }
}

pub struct BatchRunner<'a> {
    runtime: &'a dyn ContainerRuntime,
    policy: RetryPolicy,
    output: OutputManager,
}

impl<'a> BatchRunner<'a> {
    pub fn new(
        runtime: &'a dyn ContainerRuntime,
        policy: RetryPolicy,
        output: OutputManager,
    ) -> Self {
        Self {
            runtime,
            policy,
            output,
        }
    }

    /// Migrates every entry in order; entry failures are recorded, never returned
    pub async fn run(&self, catalog: &Catalog) -> RunSummary {
        let mut summary = RunSummary::default();
        self.run_into(catalog, &mut summary).await;
        summary
    }

    /// Like [`run`](BatchRunner::run), but records into `summary` as it goes
    ///
    /// If the future is dropped mid-run, `summary` still holds every entry
    /// that finished. The entry in flight is not recorded.
    pub async fn run_into(&self, catalog: &Catalog, summary: &mut RunSummary) {
        let total = catalog.migration_count();

        for (index, entry) in catalog.migrations().enumerate() {
            if index > 0 {
                tokio::time::sleep(self.policy.pacing_delay).await;
            }

            self.output.section(&format!(
                "[{}/{}] {} -> {}",
                index + 1,
                total,
                entry.source,
                entry.target
            ));
            let started = Instant::now();
            let outcome = migrate(self.runtime, &self.policy, &self.output, entry).await;

            match &outcome {
                MigrationOutcome::Success => self.output.success(&format!(
                    "Migrated {} in {}",
                    entry.source,
                    format_duration(started.elapsed())
                )),
                MigrationOutcome::Failure(err) => {
                    self.output.error(&format!("{}: {}", entry.source, err));
                    if !err.detail().is_empty() {
                        self.output.detail(err.detail());
                    }
                }
            }
            summary.record(entry, outcome);
        }
    }
}
