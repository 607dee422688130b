//! Markdown output generation for benchmark results.

use crate::result::{BaselineResults, BenchmarkResults};
use std::fmt::Write;

/// Generate a markdown summary of a report.
///
/// Values returned by the `perf` binaries are opaque here, so benchmarks are
/// summarized by sample count; baselines additionally get min/mean/max.
pub fn generate_summary(results: &BenchmarkResults) -> String {
    let mut output = String::new();

    write_summary(&mut output, results).expect("write to String");

    output
}

fn write_summary(output: &mut String, results: &BenchmarkResults) -> std::fmt::Result {
    writeln!(output, "# Benchmark Summary")?;
    writeln!(output)?;
    writeln!(output, "Generated: {}", chrono::Utc::now().to_rfc3339())?;
    writeln!(output)?;

    writeln!(output, "## Baselines")?;
    writeln!(output)?;
    writeln!(output, "| Probe | Unit | Samples | Min | Mean | Max |")?;
    writeln!(output, "|-------|------|---------|-----|------|-----|")?;
    write_baseline_row(output, "ping", &results.pings)?;
    write_baseline_row(output, "iperf", &results.iperf)?;
    writeln!(output)?;

    for benchmark in &results.benchmarks {
        writeln!(output, "## {}", benchmark.name)?;
        writeln!(output)?;
        writeln!(
            output,
            "Unit: {}, upload: {} bytes, download: {} bytes",
            benchmark.unit,
            benchmark.parameters.upload_bytes,
            benchmark.parameters.download_bytes
        )?;
        writeln!(output)?;
        writeln!(output, "| Implementation | Version | Transport | Samples |")?;
        writeln!(output, "|----------------|---------|-----------|---------|")?;
        for result in &benchmark.results {
            writeln!(
                output,
                "| {} | {} | {} | {} |",
                result.implementation,
                result.version,
                result.transport_stack,
                result.result.len()
            )?;
        }
        writeln!(output)?;
    }

    writeln!(output, "---")?;
    writeln!(output, "Total benchmarks: {}", results.benchmarks.len())?;
    Ok(())
}

fn write_baseline_row(
    output: &mut String,
    name: &str,
    baseline: &BaselineResults,
) -> std::fmt::Result {
    let min = baseline.results.iter().copied().reduce(f64::min);
    let max = baseline.results.iter().copied().reduce(f64::max);
    writeln!(
        output,
        "| {} | {} | {} | {} | {} | {} |",
        name,
        baseline.unit,
        baseline.results.len(),
        format_opt(min),
        format_opt(baseline.mean()),
        format_opt(max)
    )
}

fn format_opt(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{:.6e}", v),
        None => "-".to_string(),
    }
}
