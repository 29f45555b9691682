//! Interactive catalog entry
//!
//! The operator types `source target` pairs, one per line, until [`SENTINEL`]
//! or end of input. Invalid lines are reported and skipped rather than
//! aborting the session.

use crate::catalog::MigrationEntry;
use crate::error::Result;
use crate::output::OutputManager;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

/// Token that ends interactive entry
pub const SENTINEL: &str = "done";

pub async fn read_interactive<R>(
    mut reader: R,
    output: &OutputManager,
) -> Result<Vec<MigrationEntry>>
where
    R: AsyncBufRead + Unpin,
{
    let mut buf = Vec::new();
    let mut entries = Vec::new();

    output.info(&format!(
        "Enter 'source target' pairs, one per line. Type '{}' to finish.",
        SENTINEL
    ));

    loop {
        output.prompt("> ");
        buf.clear();
        if reader.read_until(b'\n', &mut buf).await? == 0 {
            break;
        }
        let Ok(line) = std::str::from_utf8(&buf) else {
            output.warning("Ignoring line that is not valid UTF-8");
            continue;
        };
        let line = line.trim();
        if line.eq_ignore_ascii_case(SENTINEL) {
            break;
        }
        if line.is_empty() {
            continue;
        }
        match MigrationEntry::parse_pair(line) {
            Ok(entry) => {
                output.detail(&format!("Added {} -> {}", entry.source, entry.target));
                entries.push(entry);
            }
            Err(message) => output.warning(&format!("Ignoring '{}': {}", line, message)),
        }
    }

    output.info(&format!("{} image(s) added interactively", entries.len()));
    Ok(entries)
}
