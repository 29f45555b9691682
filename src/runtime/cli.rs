//! [`ContainerRuntime`] backed by the `docker`/`podman` command line

use crate::error::RuntimeError;
use crate::image::ImageRef;
use crate::registry::Credentials;
use crate::runtime::{ContainerRuntime, RuntimeResult};
use async_trait::async_trait;
use std::process::{Output, Stdio};
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, info};

pub const DEFAULT_RUNTIME: &str = "docker";

#[derive(Debug, Clone)]
pub struct CliRuntime {
    program: String,
}

impl CliRuntime {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Base command; the child is killed if the awaiting future is dropped
    fn command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.kill_on_drop(true);
        cmd
    }

    /// Runs `<program> <args>` to completion, capturing output
    async fn run(&self, operation: &str, args: &[&str]) -> RuntimeResult<Output> {
        let mut cmd = self.command();
        cmd.args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        debug!("Executing command: {} {}", self.program, args.join(" "));

        let output = cmd.output().await.map_err(|e| self.spawn_error(e))?;
        self.check(operation, output)
    }

    fn check(&self, operation: &str, output: Output) -> RuntimeResult<Output> {
        if output.status.success() {
            return Ok(output);
        }
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        debug!("{} {} failed: {}", self.program, operation, stderr);
        Err(RuntimeError::Failed {
            operation: format!("{} {}", self.program, operation),
            status: output.status.to_string(),
            stderr,
        })
    }

    fn spawn_error(&self, err: std::io::Error) -> RuntimeError {
        RuntimeError::Spawn {
            program: self.program.clone(),
            reason: err.to_string(),
        }
    }
}

/// Arguments for `login`; the token is supplied on stdin
fn login_args<'a>(registry: &'a str, username: &'a str) -> [&'a str; 5] {
    ["login", registry, "--username", username, "--password-stdin"]
}

impl Default for CliRuntime {
    fn default() -> Self {
        Self::new(DEFAULT_RUNTIME)
    }
}

#[async_trait]
impl ContainerRuntime for CliRuntime {
    fn name(&self) -> &str {
        &self.program
    }

    async fn version(&self) -> RuntimeResult<String> {
        let output = self.run("--version", &["--version"]).await?;
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    async fn pull(&self, image: &ImageRef) -> RuntimeResult<()> {
        self.run("pull", &["pull", image.as_str()]).await.map(drop)
    }

    async fn tag(&self, source: &ImageRef, target: &ImageRef) -> RuntimeResult<()> {
        self.run("tag", &["tag", source.as_str(), target.as_str()])
            .await
            .map(drop)
    }

    async fn push(&self, image: &ImageRef) -> RuntimeResult<()> {
        self.run("push", &["push", image.as_str()]).await.map(drop)
    }

    async fn remove(&self, image: &ImageRef) -> RuntimeResult<()> {
        self.run("rmi", &["rmi", image.as_str()]).await.map(drop)
    }

    async fn login(&self, registry: &str, credentials: &Credentials) -> RuntimeResult<()> {
        // The token goes through stdin so it never shows up in the process list
        debug!(
            "Executing command: {} login {} --username {} --password-stdin",
            self.program, registry, credentials.username
        );

        let mut child = self
            .command()
            .args(login_args(registry, &credentials.username))
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| self.spawn_error(e))?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(credentials.token.expose().as_bytes())
                .await
                .map_err(|e| self.spawn_error(e))?;
        }

        let output = child
            .wait_with_output()
            .await
            .map_err(|e| self.spawn_error(e))?;
        self.check("login", output)?;
        info!("Logged in to {} as {}", registry, credentials.username);
        Ok(())
    }

    async fn logout(&self, registry: &str) -> RuntimeResult<()> {
        self.run("logout", &["logout", registry]).await.map(drop)
    }
}
