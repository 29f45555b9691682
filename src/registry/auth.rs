//! Destination registry credentials and session handling

use crate::error::{Result, SetupError};
use crate::output::OutputManager;
use crate::runtime::ContainerRuntime;
use std::fmt;
use tracing::warn;

pub const USERNAME_VAR: &str = "IMAGE_MIGRATOR_USERNAME";
pub const TOKEN_VAR: &str = "IMAGE_MIGRATOR_TOKEN";

/// A value that must never be printed
#[derive(Clone, PartialEq, Eq)]
pub struct Secret(String);

impl Secret {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(***)")
    }
}

impl fmt::Display for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("***")
    }
}

#[derive(Debug, Clone)]
pub struct Credentials {
    pub username: String,
    pub token: Secret,
}

impl Credentials {
    pub fn new(username: impl Into<String>, token: Secret) -> Self {
        Self {
            username: username.into(),
            token,
        }
    }

    /// Reads both credentials through `lookup`; empty values count as missing
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let username = lookup(USERNAME_VAR)
            .filter(|v| !v.is_empty())
            .ok_or(SetupError::MissingCredential(USERNAME_VAR))?;
        let token = lookup(TOKEN_VAR)
            .filter(|v| !v.is_empty())
            .ok_or(SetupError::MissingCredential(TOKEN_VAR))?;
        Ok(Self::new(username, Secret::new(token)))
    }
}

/// An authenticated session against the destination registry
///
/// Obtained from [`RegistrySession::login`]; call [`RegistrySession::logout`]
/// on every exit path once it exists.
#[derive(Debug)]
pub struct RegistrySession {
    registry: String,
}

impl RegistrySession {
    pub async fn login(
        runtime: &dyn ContainerRuntime,
        registry: &str,
        credentials: &Credentials,
        output: &OutputManager,
    ) -> Result<Self> {
        output.info(&format!(
            "Logging in to {} as {}",
            registry, credentials.username
        ));
        runtime
            .login(registry, credentials)
            .await
            .map_err(|e| {
                SetupError::Authentication(format!("login to {} failed: {}", registry, e))
            })?;
        output.success(&format!("Authenticated against {}", registry));
        Ok(Self {
            registry: registry.to_string(),
        })
    }

    /// Ends the session; failures are only reported
    pub async fn logout(self, runtime: &dyn ContainerRuntime, output: &OutputManager) {
        match runtime.logout(&self.registry).await {
            Ok(()) => output.info(&format!("Logged out of {}", self.registry)),
            Err(e) => {
                warn!("logout from {} failed: {}", self.registry, e);
                output.warning(&format!("Logout from {} failed: {}", self.registry, e));
            }
        }
    }
}
