#![allow(dead_code)]

use async_trait::async_trait;
use image_migrator::registry::Credentials;
use image_migrator::runtime::RuntimeResult;
use image_migrator::{ContainerRuntime, ImageRef, MigrationEntry, RuntimeError};
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

/// In-memory runtime that records every call and fails on demand
#[derive(Default)]
pub struct ScriptedRuntime {
    calls: Mutex<Vec<String>>,
    pull_failures: Mutex<HashMap<String, u32>>,
    fail_tag: HashSet<String>,
    fail_push: HashSet<String>,
    fail_remove: HashSet<String>,
    fail_login: bool,
    fail_version: bool,
    seen_tokens: Mutex<Vec<String>>,
}

impl ScriptedRuntime {
    pub fn new() -> Self {
        Self::default()
    }

    /// The next `times` pulls of `image` fail
    pub fn failing_pulls(self, image: &str, times: u32) -> Self {
        self.pull_failures
            .lock()
            .unwrap()
            .insert(image.to_string(), times);
        self
    }

    pub fn failing_tag(mut self, source: &str) -> Self {
        self.fail_tag.insert(source.to_string());
        self
    }

    pub fn failing_push(mut self, target: &str) -> Self {
        self.fail_push.insert(target.to_string());
        self
    }

    pub fn failing_remove(mut self, image: &str) -> Self {
        self.fail_remove.insert(image.to_string());
        self
    }

    pub fn failing_login(mut self) -> Self {
        self.fail_login = true;
        self
    }

    pub fn unavailable(mut self) -> Self {
        self.fail_version = true;
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_starting_with(&self, prefix: &str) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter(|c| c.starts_with(prefix))
            .collect()
    }

    pub fn tokens_received(&self) -> Vec<String> {
        self.seen_tokens.lock().unwrap().clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl ContainerRuntime for ScriptedRuntime {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn version(&self) -> RuntimeResult<String> {
        self.record("version".to_string());
        if self.fail_version {
            return Err(RuntimeError::Spawn {
                program: "scripted".to_string(),
                reason: "No such file or directory".to_string(),
            });
        }
        Ok("scripted 1.0".to_string())
    }

    async fn pull(&self, image: &ImageRef) -> RuntimeResult<()> {
        self.record(format!("pull {}", image));
        let mut failures = self.pull_failures.lock().unwrap();
        if let Some(remaining) = failures.get_mut(image.as_str()) {
            if *remaining > 0 {
                *remaining -= 1;
                return Err(RuntimeError::failed("pull", "TLS handshake timeout"));
            }
        }
        Ok(())
    }

    async fn tag(&self, source: &ImageRef, target: &ImageRef) -> RuntimeResult<()> {
        self.record(format!("tag {} {}", source, target));
        if self.fail_tag.contains(source.as_str()) {
            return Err(RuntimeError::failed("tag", "No such image"));
        }
        Ok(())
    }

    async fn push(&self, image: &ImageRef) -> RuntimeResult<()> {
        self.record(format!("push {}", image));
        if self.fail_push.contains(image.as_str()) {
            return Err(RuntimeError::failed(
                "push",
                "denied: requested access to the resource is denied",
            ));
        }
        Ok(())
    }

    async fn remove(&self, image: &ImageRef) -> RuntimeResult<()> {
        self.record(format!("rmi {}", image));
        if self.fail_remove.contains(image.as_str()) {
            return Err(RuntimeError::failed("rmi", "image is being used by stopped container"));
        }
        Ok(())
    }

    async fn login(&self, registry: &str, credentials: &Credentials) -> RuntimeResult<()> {
        self.record(format!("login {} {}", registry, credentials.username));
        self.seen_tokens
            .lock()
            .unwrap()
            .push(credentials.token.expose().to_string());
        if self.fail_login {
            return Err(RuntimeError::failed(
                "login",
                "unauthorized: incorrect username or password",
            ));
        }
        Ok(())
    }

    async fn logout(&self, registry: &str) -> RuntimeResult<()> {
        self.record(format!("logout {}", registry));
        Ok(())
    }
}

pub fn entry(line: &str) -> MigrationEntry {
    MigrationEntry::parse_pair(line).unwrap()
}
