//! I/O operations for benchmark results.
//!
//! The report is written once, at the end of a successful run. There is no
//! incremental persistence.

use crate::markdown;
use crate::result::BenchmarkResults;
use crate::Result;
use std::fs;
use std::path::Path;

fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

/// Write the report as pretty-printed JSON.
pub fn write_results_json(results: &BenchmarkResults, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    ensure_parent_dir(path)?;
    let json = serde_json::to_string_pretty(results)?;
    fs::write(path, json)?;
    Ok(())
}

/// Write the markdown summary of the report.
pub fn write_summary(results: &BenchmarkResults, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    ensure_parent_dir(path)?;
    fs::write(path, markdown::generate_summary(results))?;
    Ok(())
}

/// Read a report written by [`write_results_json`].
pub fn read_results_json(path: impl AsRef<Path>) -> Result<BenchmarkResults> {
    let content = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}
