//! Migration catalog
//!
//! The catalog is the ordered list of `(source, target)` pairs to copy. It is
//! built once, before the first migration, from the built-in list or a catalog
//! file and optionally extended interactively. Comment and blank lines are kept
//! so that the batch runner can account for them explicitly.

pub mod interactive;

use crate::error::{Result, SetupError};
use crate::image::ImageRef;
use std::path::Path;

pub use interactive::{SENTINEL, read_interactive};

/// Marker that starts a comment line
pub const COMMENT_MARKER: char = '#';

/// Images mirrored when no catalog file is supplied
pub const BUILTIN_CATALOG: &str = "\
# Base images
docker.io/library/alpine:3.20              registry.example.com/mirror/alpine:3.20
docker.io/library/debian:bookworm-slim     registry.example.com/mirror/debian:bookworm-slim
docker.io/library/busybox:1.36             registry.example.com/mirror/busybox:1.36

# Runtimes
docker.io/library/python:3.12-slim         registry.example.com/mirror/python:3.12-slim
docker.io/library/node:20-alpine           registry.example.com/mirror/node:20-alpine
docker.io/library/eclipse-temurin:21-jre   registry.example.com/mirror/eclipse-temurin:21-jre

# Infrastructure
docker.io/library/nginx:1.27-alpine        registry.example.com/mirror/nginx:1.27-alpine
docker.io/library/redis:7.2-alpine         registry.example.com/mirror/redis:7.2-alpine
docker.io/library/postgres:16-alpine       registry.example.com/mirror/postgres:16-alpine
quay.io/prometheus/prometheus:v2.53.0      registry.example.com/mirror/prometheus:v2.53.0
";

/// One image to copy
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationEntry {
    pub source: ImageRef,
    pub target: ImageRef,
}

impl MigrationEntry {
    pub fn new(source: ImageRef, target: ImageRef) -> Self {
        Self { source, target }
    }

    /// Parses a `source target` pair separated by whitespace
    pub fn parse_pair(line: &str) -> std::result::Result<Self, String> {
        let fields: Vec<&str> = line.split_whitespace().collect();
        match fields.as_slice() {
            [source, target] => {
                let source = ImageRef::parse(source).map_err(|e| e.to_string())?;
                let target = ImageRef::parse(target).map_err(|e| e.to_string())?;
                Ok(Self::new(source, target))
            }
            [_] => Err("expected 'source target', found only one reference".to_string()),
            _ => Err(format!(
                "expected 'source target', found {} fields",
                fields.len()
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogEntry {
    Migration(MigrationEntry),
    Comment(String),
    Blank,
}

impl CatalogEntry {
    /// Classifies one catalog line; `line_no` is 1-based and only used for errors
    pub fn parse_line(line: &str, line_no: usize) -> Result<Self> {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return Ok(CatalogEntry::Blank);
        }
        if trimmed.starts_with(COMMENT_MARKER) {
            return Ok(CatalogEntry::Comment(trimmed.to_string()));
        }
        MigrationEntry::parse_pair(trimmed)
            .map(CatalogEntry::Migration)
            .map_err(|message| SetupError::Catalog {
                line: line_no,
                message,
            })
    }

    pub fn as_migration(&self) -> Option<&MigrationEntry> {
        match self {
            CatalogEntry::Migration(entry) => Some(entry),
            _ => None,
        }
    }
}

/// Ordered catalog, read-only once a run starts
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    entries: Vec<CatalogEntry>,
}

impl Catalog {
    pub fn parse(text: &str) -> Result<Self> {
        let entries = text
            .lines()
            .enumerate()
            .map(|(i, line)| CatalogEntry::parse_line(line, i + 1))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { entries })
    }

    pub fn builtin() -> Result<Self> {
        Self::parse(BUILTIN_CATALOG)
    }

    pub async fn from_file(path: &Path) -> Result<Self> {
        let text = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| SetupError::File {
                path: path.to_path_buf(),
                source,
            })?;
        Self::parse(&text)
    }

    pub fn extend(&mut self, entries: impl IntoIterator<Item = MigrationEntry>) {
        self.entries
            .extend(entries.into_iter().map(CatalogEntry::Migration));
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    /// Migration entries in catalog order, skipping filler lines
    pub fn migrations(&self) -> impl Iterator<Item = &MigrationEntry> {
        self.entries.iter().filter_map(CatalogEntry::as_migration)
    }

    pub fn migration_count(&self) -> usize {
        self.migrations().count()
    }

    pub fn is_empty(&self) -> bool {
        self.migration_count() == 0
    }
}
