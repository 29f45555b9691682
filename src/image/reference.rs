//! Validated image references
//!
//! An [`ImageRef`] keeps the text exactly as written so that it can be handed
//! to the container runtime unchanged, while still rejecting malformed input
//! up front.

use crate::error::SetupError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Registry assumed when a reference names no host
pub const DEFAULT_REGISTRY: &str = "docker.io";

const MAX_TAG_LEN: usize = 128;

/// `[registry/]repository[:tag][@digest]`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ImageRef {
    raw: String,
    registry: Option<String>,
    repository: String,
    tag: Option<String>,
    digest: Option<String>,
}

impl ImageRef {
    pub fn parse(input: &str) -> Result<Self, SetupError> {
        let invalid = |reason: &str| SetupError::InvalidReference {
            reference: input.to_string(),
            reason: reason.to_string(),
        };

        if input.is_empty() {
            return Err(invalid("reference is empty"));
        }
        if input.chars().any(char::is_whitespace) {
            return Err(invalid("reference contains whitespace"));
        }

        let (name, digest) = match input.split_once('@') {
            Some((name, digest)) => {
                validate_digest(digest).map_err(|reason| invalid(reason))?;
                (name, Some(digest.to_string()))
            }
            None => (input, None),
        };

        // A ':' after the last '/' separates the tag; earlier ones belong to a host port
        let last_slash = name.rfind('/').map_or(0, |i| i + 1);
        let (name, tag) = match name[last_slash..].rfind(':') {
            Some(i) => {
                let split = last_slash + i;
                let tag = &name[split + 1..];
                validate_tag(tag).map_err(|reason| invalid(reason))?;
                (&name[..split], Some(tag.to_string()))
            }
            None => (name, None),
        };

        let (registry, repository) = match name.split_once('/') {
            Some((first, rest)) if looks_like_host(first) => {
                validate_host(first).map_err(|reason| invalid(reason))?;
                (Some(first.to_string()), rest)
            }
            _ => (None, name),
        };

        validate_repository(repository).map_err(|reason| invalid(reason))?;

        Ok(Self {
            raw: input.to_string(),
            registry,
            repository: repository.to_string(),
            tag,
            digest,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Registry host as written, if any
    pub fn registry(&self) -> Option<&str> {
        self.registry.as_deref()
    }

    /// Registry host, falling back to Docker Hub
    pub fn registry_or_default(&self) -> &str {
        self.registry().unwrap_or(DEFAULT_REGISTRY)
    }

    pub fn repository(&self) -> &str {
        &self.repository
    }

    pub fn tag(&self) -> Option<&str> {
        self.tag.as_deref()
    }

    pub fn digest(&self) -> Option<&str> {
        self.digest.as_deref()
    }
}

fn looks_like_host(component: &str) -> bool {
    component == "localhost" || component.contains('.') || component.contains(':')
}

fn validate_host(host: &str) -> Result<(), &'static str> {
    let (name, port) = match host.rsplit_once(':') {
        Some((name, port)) => (name, Some(port)),
        None => (host, None),
    };
    if name.is_empty()
        || !name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-')
    {
        return Err("invalid registry host");
    }
    if let Some(port) = port {
        if port.is_empty() || !port.chars().all(|c| c.is_ascii_digit()) {
            return Err("invalid registry port");
        }
    }
    Ok(())
}

fn validate_repository(repository: &str) -> Result<(), &'static str> {
    if repository.is_empty() {
        return Err("repository name is empty");
    }
    for component in repository.split('/') {
        if component.is_empty() {
            return Err("repository has an empty path component");
        }
        if !component
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || matches!(c, '.' | '_' | '-'))
        {
            return Err("repository components must be lowercase alphanumerics and separators");
        }
        let edges_ok = component
            .chars()
            .next()
            .zip(component.chars().last())
            .is_some_and(|(first, last)| {
                first.is_ascii_alphanumeric() && last.is_ascii_alphanumeric()
            });
        if !edges_ok {
            return Err("repository components must start and end with an alphanumeric");
        }
    }
    Ok(())
}

fn validate_tag(tag: &str) -> Result<(), &'static str> {
    if tag.is_empty() {
        return Err("tag is empty");
    }
    if tag.len() > MAX_TAG_LEN {
        return Err("tag is longer than 128 characters");
    }
    if tag.starts_with('.') || tag.starts_with('-') {
        return Err("tag must not start with '.' or '-'");
    }
    if !tag
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
    {
        return Err("tag contains invalid characters");
    }
    Ok(())
}

fn validate_digest(digest: &str) -> Result<(), &'static str> {
    let Some((algorithm, encoded)) = digest.split_once(':') else {
        return Err("digest must be algorithm:hex");
    };
    if algorithm.is_empty()
        || !algorithm
            .chars()
            .all(|c| {
                c.is_ascii_lowercase() || c.is_ascii_digit() || matches!(c, '+' | '.' | '_' | '-')
            })
    {
        return Err("invalid digest algorithm");
    }
    if encoded.is_empty() || !encoded.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err("digest value must be hexadecimal");
    }
    Ok(())
}

impl FromStr for ImageRef {
    type Err = SetupError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for ImageRef {
    type Error = SetupError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<ImageRef> for String {
    fn from(value: ImageRef) -> Self {
        value.raw
    }
}

impl fmt::Display for ImageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}
