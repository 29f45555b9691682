//! Operator-facing progress output
//!
//! Every line carries a wall-clock timestamp and a coloured level tag. Internal
//! diagnostics go through `tracing` instead; this module is only for what the
//! operator is meant to read.

use chrono::Local;
use colored::{ColoredString, Colorize};
use std::io::{self, Write};
use std::time::{Duration, Instant};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Level {
    Debug,
    Info,
    Success,
    Warn,
    Error,
}

impl Level {
    fn label(self) -> &'static str {
        match self {
            Level::Debug => "DEBUG",
            Level::Info => "INFO",
            Level::Success => "OK",
            Level::Warn => "WARN",
            Level::Error => "ERROR",
        }
    }

    /// Right-aligned to five columns before any colour codes are added
    fn tag(self) -> ColoredString {
        let padded = format!("{:>5}", self.label());
        match self {
            Level::Debug => padded.dimmed(),
            Level::Info => padded.blue().bold(),
            Level::Success => padded.green().bold(),
            Level::Warn => padded.yellow().bold(),
            Level::Error => padded.red().bold(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct OutputManager {
    pub verbose: bool,
    quiet: bool,
    stderr_only: bool,
    start_time: Instant,
}

impl OutputManager {
    pub fn new(verbose: bool) -> Self {
        Self {
            verbose,
            quiet: false,
            stderr_only: false,
            start_time: Instant::now(),
        }
    }

    pub fn new_quiet() -> Self {
        Self {
            verbose: false,
            quiet: true,
            stderr_only: false,
            start_time: Instant::now(),
        }
    }

    /// Sends all progress lines to stderr, leaving stdout for machine-readable output
    pub fn with_stderr_only(mut self) -> Self {
        self.stderr_only = true;
        self
    }

    pub fn debug(&self, message: &str) {
        if self.verbose && !self.quiet {
            self.print_with_timestamp(Level::Debug, message);
        }
    }

    pub fn info(&self, message: &str) {
        if !self.quiet {
            self.print_with_timestamp(Level::Info, message);
        }
    }

    pub fn success(&self, message: &str) {
        if !self.quiet {
            self.print_with_timestamp(Level::Success, message);
        }
    }

    pub fn warning(&self, message: &str) {
        if !self.quiet {
            self.print_with_timestamp(Level::Warn, message);
        }
    }

    /// Errors are shown even in quiet mode
    pub fn error(&self, message: &str) {
        self.print_with_timestamp(Level::Error, message);
    }

    pub fn section(&self, title: &str) {
        if self.quiet {
            return;
        }
        let line = if self.verbose {
            format!("\n{}\n{}\n{}", "━".repeat(60), title.bold(), "━".repeat(60))
        } else {
            format!("\n{}", title.bold())
        };
        self.write_line(&line);
    }

    /// Stage transition inside one migration
    pub fn step(&self, step: &str) {
        if !self.quiet {
            self.write_line(&format!("    {} {}", "▸".cyan(), step));
        }
    }

    pub fn detail(&self, detail: &str) {
        if self.verbose && !self.quiet {
            self.write_line(&format!("      {}", detail.dimmed()));
        }
    }

    /// Prompt without a trailing newline
    pub fn prompt(&self, prompt: &str) {
        if self.quiet {
            return;
        }
        if self.stderr_only {
            eprint!("{}", prompt);
            let _ = io::stderr().flush();
        } else {
            print!("{}", prompt);
            let _ = io::stdout().flush();
        }
    }

    /// Final report; printed even in quiet mode
    pub fn summary(&self, title: &str, items: &[(&str, String)]) {
        self.write_line(&format!("\n{}", title.bold()));
        for (key, value) in items {
            self.write_line(&format!("  • {}: {}", key, value));
        }
    }

    pub fn list(&self, title: &str, items: &[String]) {
        self.write_line(&format!("\n{}", title.bold()));
        for (i, item) in items.iter().enumerate() {
            self.write_line(&format!("  {}. {}", i + 1, item));
        }
        if items.is_empty() {
            self.write_line("  (none)");
        }
    }

    pub fn elapsed_time(&self) -> String {
        format_duration(self.start_time.elapsed())
    }

    fn print_with_timestamp(&self, level: Level, message: &str) {
        let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S");
        let line = format!(
            "[{}] {} {}",
            timestamp.to_string().dimmed(),
            level.tag(),
            message
        );
        if matches!(level, Level::Warn | Level::Error) {
            eprintln!("{}", line);
        } else {
            self.write_line(&line);
        }
    }

    fn write_line(&self, line: &str) {
        if self.stderr_only {
            eprintln!("{}", line);
        } else {
            println!("{}", line);
        }
    }
}

pub fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    if secs < 60 {
        format!("{:.1}s", duration.as_secs_f64())
    } else if secs < 3600 {
        format!("{}m{:02}s", secs / 60, secs % 60)
    } else {
        format!("{}h{:02}m{:02}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}
