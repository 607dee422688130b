//! Benchmark execution and result aggregation for the perf harness.
//!
//! This crate runs the standard benchmark plan across the selected versions
//! and assembles a single [`BenchmarkResults`] report.
//!
//! # Quick Start
//!
//! ```no_run
//! use perf_harness_benchmarks::{run_and_write_all, RunOptions};
//! use perf_harness_core::{HarnessConfig, Hosts, ImplementationFilter, VERSIONS};
//! use perf_harness_remote::SshRunner;
//!
//! # async fn example() -> perf_harness_benchmarks::Result<()> {
//! let config = HarnessConfig::default();
//! let runner = SshRunner::new(&config.ssh);
//! let options = RunOptions {
//!     hosts: Hosts::new("203.0.113.1", "203.0.113.2").unwrap(),
//!     testing: true,
//!     filters: vec![ImplementationFilter::All],
//! };
//!
//! let report = run_and_write_all(&runner, &config, VERSIONS, &options, None).await?;
//! println!("{} benchmarks", report.benchmarks.len());
//! # Ok(())
//! # }
//! ```
//!
//! # Modules
//!
//! - [`executor`] - runs one benchmark across the version matrix
//! - [`result`] - report types
//! - [`io`] - reading and writing the report
//! - [`markdown`] - markdown summary generation

#![warn(missing_docs, rust_2018_idioms)]
#![deny(unsafe_code)]

pub mod executor;
pub mod io;
pub mod markdown;
pub mod result;

#[cfg(test)]
pub(crate) mod testing;

pub use executor::BenchmarkExecutor;
pub use result::{
    BaselineResults, Benchmark, BenchmarkResult, BenchmarkResults, IperfResults, PingResults,
    ResultValue,
};

use perf_harness_core::version::{filter_versions, implementations_of};
use perf_harness_core::{BenchmarkPlan, HarnessConfig, Hosts, ImplementationFilter, Version};
use perf_harness_remote::{deploy, probes, CommandRunner, RemoteError};
use std::path::Path;
use thiserror::Error;
use tracing::{info, warn};

/// Errors that abort a harness run.
#[derive(Debug, Error)]
pub enum BenchmarkError {
    /// A remote operation failed.
    #[error(transparent)]
    Remote(#[from] RemoteError),

    /// Reading or writing a report failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The report could not be (de)serialized.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for benchmark operations.
pub type Result<T> = std::result::Result<T, BenchmarkError>;

/// Per-invocation options of a harness run.
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Client and server hosts.
    pub hosts: Hosts,
    /// Reduced iteration counts.
    pub testing: bool,
    /// Implementations to run.
    pub filters: Vec<ImplementationFilter>,
}

/// Run the baseline probes.
///
/// Probes are best effort: a failure is logged and replaced by an empty
/// series with the right unit.
pub async fn run_baselines<R: CommandRunner + ?Sized>(
    runner: &R,
    config: &HarnessConfig,
    plan: &BenchmarkPlan,
    hosts: &Hosts,
) -> (PingResults, IperfResults) {
    let pings = match probes::run_ping(runner, hosts, plan.ping_count).await {
        Ok(times) => BaselineResults::ping(times),
        Err(e) => {
            warn!(error = %e, "Ping test failed");
            BaselineResults::ping(Vec::new())
        }
    };

    let iperf = match probes::run_iperf(runner, &config.remote, hosts, plan.iperf_secs).await {
        Ok(rates) => BaselineResults::iperf(rates),
        Err(e) => {
            warn!(error = %e, "iPerf test failed");
            BaselineResults::iperf(Vec::new())
        }
    };

    (pings, iperf)
}

/// Run the whole harness: baselines, deploy, then every benchmark of the
/// standard plan across the versions of `catalog` selected by the options.
///
/// Any failure other than a baseline probe aborts the run.
pub async fn run_all_benchmarks<R: CommandRunner + ?Sized>(
    runner: &R,
    config: &HarnessConfig,
    catalog: &[Version],
    options: &RunOptions,
) -> Result<BenchmarkResults> {
    let plan = BenchmarkPlan::standard(options.testing);
    let versions = filter_versions(catalog, &options.filters);
    let implementations = implementations_of(&versions);
    info!(
        iterations = plan.benchmarks.first().map(|b| b.iterations),
        ?implementations,
        "Starting benchmark run"
    );

    let (pings, iperf) = run_baselines(runner, config, &plan, &options.hosts).await;

    if implementations.is_empty() {
        warn!("No versions selected, skipping build");
    } else {
        for host in [&options.hosts.server, &options.hosts.client] {
            deploy::copy_and_build(
                runner,
                &config.ssh,
                &config.deploy,
                &config.remote,
                host,
                &implementations,
            )
            .await?;
        }
    }

    let executor = BenchmarkExecutor::new(
        runner,
        &options.hosts,
        &config.remote,
        config.discovery.settle_delay(),
    );
    let mut benchmarks = Vec::with_capacity(plan.benchmarks.len());
    for spec in &plan.benchmarks {
        benchmarks.push(executor.run_across_versions(spec, &versions).await?);
    }

    Ok(BenchmarkResults {
        benchmarks,
        pings,
        iperf,
    })
}

/// Run the harness and write the report to the configured path, plus an
/// optional markdown summary.
///
/// Nothing is written unless the whole run succeeds.
pub async fn run_and_write_all<R: CommandRunner + ?Sized>(
    runner: &R,
    config: &HarnessConfig,
    catalog: &[Version],
    options: &RunOptions,
    summary_path: Option<&Path>,
) -> Result<BenchmarkResults> {
    let results = run_all_benchmarks(runner, config, catalog, options).await?;

    io::write_results_json(&results, &config.output.report_path)?;
    info!(path = %config.output.report_path.display(), "Results written");

    if let Some(path) = summary_path {
        io::write_summary(&results, path)?;
        info!(path = %path.display(), "Summary written");
    }

    Ok(results)
}
