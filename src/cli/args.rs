//! Command-line argument parsing

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Debug, Parser)]
#[command(name = "image-migrator")]
#[command(about = "Copy container images from public registries into a private registry")]
#[command(version, author)]
#[command(after_help = "Credentials come from IMAGE_MIGRATOR_USERNAME and IMAGE_MIGRATOR_TOKEN.")]
pub struct Args {
    /// Add image pairs interactively after the catalog is loaded
    #[arg(
        long = "interactive",
        short = 'i',
        help = "Prompt for additional 'source target' pairs until 'done'"
    )]
    pub interactive: bool,

    /// Catalog file replacing the built-in catalog
    #[arg(
        long = "catalog",
        short = 'c',
        value_name = "FILE",
        help = "Catalog file with one 'source target' pair per line"
    )]
    pub catalog: Option<PathBuf>,

    /// JSON configuration file
    #[arg(long = "config", value_name = "FILE", help = "Path to JSON configuration file")]
    pub config: Option<PathBuf>,

    #[arg(
        long = "runtime",
        value_name = "PROGRAM",
        help = "Container runtime CLI to drive (default: docker)"
    )]
    pub runtime: Option<String>,

    #[arg(
        long = "registry",
        value_name = "HOST",
        help = "Destination registry to log in to (default: registry of the first target)"
    )]
    pub registry: Option<String>,

    #[arg(
        long = "max-attempts",
        value_name = "N",
        help = "Pull attempts per image before giving up (default: 3)"
    )]
    pub max_attempts: Option<u32>,

    #[arg(
        long = "retry-delay",
        value_name = "SECS",
        help = "Seconds to wait between pull attempts (default: 2)"
    )]
    pub retry_delay: Option<u64>,

    #[arg(
        long = "pacing-delay",
        value_name = "SECS",
        help = "Seconds to wait between images (default: 1)"
    )]
    pub pacing_delay: Option<u64>,

    /// Print the resolved catalog and exit
    #[arg(long = "list", help = "Print the catalog and exit without migrating")]
    pub list: bool,

    #[arg(
        long = "output",
        short = 'o',
        value_enum,
        default_value = "text",
        help = "Summary format"
    )]
    pub output: OutputFormat,

    #[arg(long = "verbose", short = 'v', help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(
        long = "quiet",
        short = 'q',
        conflicts_with = "verbose",
        help = "Only print errors and the final summary"
    )]
    pub quiet: bool,
}

impl Args {
    pub fn parse_args() -> Self {
        Args::parse()
    }
}
