//! Application runner: setup, catalog, session, batch, summary

use crate::catalog::{Catalog, read_interactive};
use crate::cli::args::{Args, OutputFormat};
use crate::cli::config::MigratorConfig;
use crate::error::{Result, SetupError};
use crate::image::DEFAULT_REGISTRY;
use crate::migration::{BatchRunner, RunSummary};
use crate::output::OutputManager;
use crate::registry::{Credentials, RegistrySession};
use crate::runtime::{CliRuntime, ContainerRuntime};
use tokio::io::{AsyncBufRead, BufReader};
use tracing::info;

/// How a run ended, when it did not fail during setup
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunStatus {
    /// Every catalog entry was attempted; individual entries may have failed
    Completed(RunSummary),
    /// `--list` printed the catalog
    Listed,
    /// Ctrl-C arrived while images were being migrated; holds the entries
    /// that finished before it
    Interrupted(RunSummary),
}

impl RunStatus {
    pub fn exit_code(&self) -> i32 {
        match self {
            RunStatus::Completed(_) | RunStatus::Listed => 0,
            RunStatus::Interrupted(_) => 130,
        }
    }
}

pub struct Runner {
    args: Args,
    output: OutputManager,
}

impl Runner {
    pub fn new(args: Args) -> Self {
        let output = Self::output_for(&args, false);
        Self { args, output }
    }

    fn output_for(args: &Args, verbose: bool) -> OutputManager {
        let output = if args.quiet {
            OutputManager::new_quiet()
        } else {
            OutputManager::new(args.verbose || verbose)
        };
        match args.output {
            OutputFormat::Json => output.with_stderr_only(),
            OutputFormat::Text => output,
        }
    }

    pub fn output(&self) -> &OutputManager {
        &self.output
    }

    pub async fn run(&self) -> Result<RunStatus> {
        let config = MigratorConfig::load(&self.args).await?;
        let output = Self::output_for(&self.args, config.verbose);

        let catalog = load_catalog(&config).await?;
        if self.args.list {
            print_catalog(&catalog, &output);
            return Ok(RunStatus::Listed);
        }

        let runtime = CliRuntime::new(config.runtime.clone());
        let interactive = self
            .args
            .interactive
            .then(|| BufReader::new(tokio::io::stdin()));

        let status = execute(
            &config,
            catalog,
            |key: &str| std::env::var(key).ok(),
            &runtime,
            interactive,
            &output,
        )
        .await?;
        match &status {
            RunStatus::Completed(summary) => self.report(summary, "Migration summary", &output)?,
            RunStatus::Interrupted(summary) => {
                self.report(summary, "Migration summary (interrupted)", &output)?
            }
            RunStatus::Listed => {}
        }
        Ok(status)
    }

    fn report(&self, summary: &RunSummary, title: &str, output: &OutputManager) -> Result<()> {
        match self.args.output {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(summary)?),
            OutputFormat::Text => print_summary(summary, title, output),
        }
        Ok(())
    }
}

async fn load_catalog(config: &MigratorConfig) -> Result<Catalog> {
    match &config.catalog {
        Some(path) => Catalog::from_file(path).await,
        None => Catalog::builtin(),
    }
}

/// Runs everything after the catalog is loaded
///
/// Resolves credentials through `lookup` before the runtime is touched, then
/// probes the runtime, appends interactive entries, logs in, migrates the
/// catalog and logs out again. Logout also happens when the batch is
/// interrupted.
pub async fn execute<R, F>(
    config: &MigratorConfig,
    mut catalog: Catalog,
    lookup: F,
    runtime: &dyn ContainerRuntime,
    interactive: Option<R>,
    output: &OutputManager,
) -> Result<RunStatus>
where
    R: AsyncBufRead + Unpin,
    F: Fn(&str) -> Option<String>,
{
    let credentials = Credentials::from_lookup(lookup)?;

    let version = runtime
        .version()
        .await
        .map_err(|e| SetupError::RuntimeUnavailable {
            program: runtime.name().to_string(),
            reason: e.to_string(),
        })?;
    output.debug(&format!("Using {}", version));
    info!("container runtime: {}", version);

    if let Some(reader) = interactive {
        let added = read_interactive(reader, output).await?;
        catalog.extend(added);
    }

    if catalog.is_empty() {
        output.warning("Catalog contains no images to migrate");
        return Ok(RunStatus::Completed(RunSummary::default()));
    }

    let registry = destination_registry(config, &catalog);
    let session = RegistrySession::login(runtime, &registry, &credentials, output).await?;

    output.info(&format!(
        "Migrating {} image(s) with {}",
        catalog.migration_count(),
        runtime.name()
    ));
    let batch = BatchRunner::new(runtime, config.retry_policy(), output.clone());
    let mut summary = RunSummary::default();
    let completed = tokio::select! {
        _ = batch.run_into(&catalog, &mut summary) => true,
        _ = interrupted() => {
            output.warning("Interrupted, stopping runtime and logging out");
            false
        }
    };
    let status = if completed {
        RunStatus::Completed(summary)
    } else {
        RunStatus::Interrupted(summary)
    };

    session.logout(runtime, output).await;
    Ok(status)
}

/// Configured registry, else the host of the first target
pub fn destination_registry(config: &MigratorConfig, catalog: &Catalog) -> String {
    config
        .registry
        .clone()
        .or_else(|| {
            catalog
                .migrations()
                .next()
                .map(|entry| entry.target.registry_or_default().to_string())
        })
        .unwrap_or_else(|| DEFAULT_REGISTRY.to_string())
}

async fn interrupted() {
    if tokio::signal::ctrl_c().await.is_err() {
        // No signal handler means no interruption
        std::future::pending::<()>().await;
    }
}

fn print_catalog(catalog: &Catalog, output: &OutputManager) {
    let items: Vec<String> = catalog
        .migrations()
        .map(|entry| format!("{} -> {}", entry.source, entry.target))
        .collect();
    output.list("Catalog", &items);
}

fn print_summary(summary: &RunSummary, title: &str, output: &OutputManager) {
    output.summary(
        title,
        &[
            (
                "Migrated",
                format!("{}/{}", summary.success_count, summary.total_count),
            ),
            ("Failed", summary.failure_count().to_string()),
            ("Elapsed", output.elapsed_time()),
        ],
    );
    if !summary.is_complete_success() {
        let failed: Vec<String> = summary
            .failures
            .iter()
            .map(|f| format!("{} ({})", f.source, f.reason))
            .collect();
        output.list("Failed images", &failed);
    }
}
