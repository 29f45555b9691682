//! Layered configuration: defaults, config file, environment, command line

use crate::cli::args::Args;
use crate::error::{Result, SetupError};
use crate::migration::RetryPolicy;
use crate::runtime::cli::DEFAULT_RUNTIME;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const RUNTIME_VAR: &str = "IMAGE_MIGRATOR_RUNTIME";
pub const REGISTRY_VAR: &str = "IMAGE_MIGRATOR_REGISTRY";
pub const MAX_ATTEMPTS_VAR: &str = "IMAGE_MIGRATOR_MAX_ATTEMPTS";
pub const RETRY_DELAY_VAR: &str = "IMAGE_MIGRATOR_RETRY_DELAY";
pub const PACING_DELAY_VAR: &str = "IMAGE_MIGRATOR_PACING_DELAY";
pub const VERBOSE_VAR: &str = "IMAGE_MIGRATOR_VERBOSE";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MigratorConfig {
    pub runtime: String,
    pub registry: Option<String>,
    pub catalog: Option<PathBuf>,
    pub max_attempts: u32,
    /// Seconds between pull attempts
    pub retry_delay: u64,
    /// Seconds between catalog entries
    pub pacing_delay: u64,
    pub verbose: bool,
}

impl Default for MigratorConfig {
    fn default() -> Self {
        let policy = RetryPolicy::default();
        Self {
            runtime: DEFAULT_RUNTIME.to_string(),
            registry: None,
            catalog: None,
            max_attempts: policy.max_attempts,
            retry_delay: policy.retry_delay.as_secs(),
            pacing_delay: policy.pacing_delay.as_secs(),
            verbose: false,
        }
    }
}

impl MigratorConfig {
    /// Resolves the full configuration for a run
    pub async fn load(args: &Args) -> Result<Self> {
        let base = match &args.config {
            Some(path) => Self::from_file(path).await?,
            None => Self::default(),
        };
        let config = base
            .apply_env(|key| std::env::var(key).ok())?
            .apply_args(args);
        config.validate()?;
        Ok(config)
    }

    pub async fn from_file(path: &Path) -> Result<Self> {
        let text = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| SetupError::File {
                path: path.to_path_buf(),
                source,
            })?;
        serde_json::from_str(&text)
            .map_err(|e| SetupError::Config(format!("{}: {}", path.display(), e)))
    }

    /// Overrides fields from `IMAGE_MIGRATOR_*` variables read through `lookup`
    pub fn apply_env<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(val) = lookup(RUNTIME_VAR).filter(|v| !v.is_empty()) {
            self.runtime = val;
        }
        if let Some(val) = lookup(REGISTRY_VAR).filter(|v| !v.is_empty()) {
            self.registry = Some(val);
        }
        if let Some(val) = lookup(MAX_ATTEMPTS_VAR) {
            self.max_attempts = parse_number(MAX_ATTEMPTS_VAR, &val)?;
        }
        if let Some(val) = lookup(RETRY_DELAY_VAR) {
            self.retry_delay = parse_number(RETRY_DELAY_VAR, &val)?;
        }
        if let Some(val) = lookup(PACING_DELAY_VAR) {
            self.pacing_delay = parse_number(PACING_DELAY_VAR, &val)?;
        }
        if let Some(val) = lookup(VERBOSE_VAR) {
            self.verbose = val.eq_ignore_ascii_case("true") || val == "1";
        }
        Ok(self)
    }

    /// Command-line values win over everything else
    pub fn apply_args(mut self, args: &Args) -> Self {
        if let Some(runtime) = &args.runtime {
            self.runtime = runtime.clone();
        }
        if let Some(registry) = &args.registry {
            self.registry = Some(registry.clone());
        }
        if let Some(catalog) = &args.catalog {
            self.catalog = Some(catalog.clone());
        }
        if let Some(n) = args.max_attempts {
            self.max_attempts = n;
        }
        if let Some(secs) = args.retry_delay {
            self.retry_delay = secs;
        }
        if let Some(secs) = args.pacing_delay {
            self.pacing_delay = secs;
        }
        if args.verbose {
            self.verbose = true;
        }
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.runtime.trim().is_empty() {
            return Err(SetupError::Config("runtime cannot be empty".to_string()));
        }
        if self.max_attempts == 0 {
            return Err(SetupError::Config(
                "max_attempts must be greater than 0".to_string(),
            ));
        }
        if let Some(registry) = &self.registry {
            if registry.trim().is_empty() || registry.contains(char::is_whitespace) {
                return Err(SetupError::Config(format!(
                    "invalid registry '{}'",
                    registry
                )));
            }
        }
        Ok(())
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_attempts,
            retry_delay: Duration::from_secs(self.retry_delay),
            pacing_delay: Duration::from_secs(self.pacing_delay),
        }
    }
}

fn parse_number<T: std::str::FromStr>(var: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| {
            SetupError::Config(format!(
                "{} must be a non-negative integer, got '{}'",
                var, value
            ))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::collections::HashMap;

    fn env(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn defaults_match_the_fixed_policy() {
        let config = MigratorConfig::default();
        assert_eq!(config.runtime, "docker");
        assert_eq!(config.retry_policy(), RetryPolicy::default());
        config.validate().unwrap();
    }

    #[test]
    fn cli_beats_env_beats_file() {
        let file: MigratorConfig = serde_json::from_str(
            r#"{"runtime": "nerdctl", "max_attempts": 5, "pacing_delay": 4}"#,
        )
        .unwrap();
        let config = file
            .apply_env(env(&[(RUNTIME_VAR, "podman"), (MAX_ATTEMPTS_VAR, "7")]))
            .unwrap()
            .apply_args(&Args::try_parse_from(["image-migrator", "--max-attempts", "9"]).unwrap());

        assert_eq!(config.runtime, "podman");
        assert_eq!(config.max_attempts, 9);
        assert_eq!(config.pacing_delay, 4);
        assert_eq!(config.retry_delay, 2);
    }

    #[test]
    fn bad_env_number_is_a_config_error() {
        let err = MigratorConfig::default()
            .apply_env(env(&[(RETRY_DELAY_VAR, "soon")]))
            .unwrap_err();
        assert!(matches!(err, SetupError::Config(_)));
    }

    #[test]
    fn zero_attempts_rejected() {
        let config = MigratorConfig {
            max_attempts: 0,
            ..MigratorConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn unknown_config_keys_rejected() {
        assert!(serde_json::from_str::<MigratorConfig>(r#"{"retries": 3}"#).is_err());
    }
}
