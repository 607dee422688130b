//! CLI for the perf harness.
//!
//! Parses the command line, loads configuration, sets up logging and runs
//! the full benchmark matrix against the given client and server hosts.
//! Logs go to stderr; the report goes to `benchmark-results.json` unless
//! overridden.

#![warn(missing_docs, rust_2018_idioms)]
#![deny(unsafe_code)]

use anyhow::Context;
use clap::{Parser, ValueEnum};
use perf_harness_benchmarks::{run_and_write_all, RunOptions};
use perf_harness_core::{HarnessConfig, Hosts, Implementation, ImplementationFilter, VERSIONS};
use perf_harness_remote::SshRunner;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Perf harness CLI.
#[derive(Parser, Debug)]
#[command(name = "perf-harness")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Client public IP address.
    #[arg(long, env = "PERF_CLIENT_PUBLIC_IP")]
    pub client_public_ip: String,

    /// Server public IP address.
    #[arg(long, env = "PERF_SERVER_PUBLIC_IP")]
    pub server_public_ip: String,

    /// Run in testing mode (one iteration per benchmark).
    #[arg(long)]
    pub testing: bool,

    /// Only run these implementations. Repeatable; defaults to all.
    #[arg(long, value_enum, num_args = 1.., default_value = "all")]
    pub test_filter: Vec<TestFilter>,

    /// Configuration file (TOML). Defaults to `perf-harness.toml` if present.
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Report output path override.
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Also write a markdown summary to this path.
    #[arg(long)]
    pub summary: Option<PathBuf>,

    /// Emit logs as JSON lines.
    #[arg(long)]
    pub json_logs: bool,
}

/// Values accepted by `--test-filter`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TestFilter {
    /// Every implementation.
    All,
    /// js-libp2p
    JsLibp2p,
    /// rust-libp2p
    RustLibp2p,
    /// go-libp2p
    GoLibp2p,
    /// HTTPS baseline
    Https,
    /// quic-go baseline
    QuicGo,
}

impl From<TestFilter> for ImplementationFilter {
    fn from(filter: TestFilter) -> Self {
        match filter {
            TestFilter::All => ImplementationFilter::All,
            TestFilter::JsLibp2p => ImplementationFilter::Only(Implementation::JsLibp2p),
            TestFilter::RustLibp2p => ImplementationFilter::Only(Implementation::RustLibp2p),
            TestFilter::GoLibp2p => ImplementationFilter::Only(Implementation::GoLibp2p),
            TestFilter::Https => ImplementationFilter::Only(Implementation::Https),
            TestFilter::QuicGo => ImplementationFilter::Only(Implementation::QuicGo),
        }
    }
}

impl Cli {
    /// Run options derived from the arguments.
    pub fn run_options(&self) -> anyhow::Result<RunOptions> {
        Ok(RunOptions {
            hosts: Hosts::new(&self.client_public_ip, &self.server_public_ip)?,
            testing: self.testing,
            filters: self.test_filter.iter().copied().map(Into::into).collect(),
        })
    }

    /// Load configuration and apply command-line overrides.
    pub fn harness_config(&self) -> anyhow::Result<HarnessConfig> {
        let mut config =
            HarnessConfig::load(self.config.as_deref()).context("failed to load configuration")?;
        if let Some(output) = &self.output {
            config.output.report_path = output.clone();
        }
        Ok(config)
    }
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

/// Run the CLI with the process arguments.
///
/// # Returns
///
/// Returns `Ok(())` once the report is written, or the error that aborted
/// the run. No report is written on error.
pub fn run() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_tracing(cli.json_logs);

    let config = cli.harness_config()?;
    let options = cli.run_options()?;
    info!(
        client = %options.hosts.client,
        server = %options.hosts.server,
        testing = options.testing,
        filters = ?cli.test_filter,
        "Starting perf harness"
    );

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to start runtime")?;
    let runner = SshRunner::new(&config.ssh);

    let results = runtime.block_on(run_and_write_all(
        &runner,
        &config,
        VERSIONS,
        &options,
        cli.summary.as_deref(),
    ))?;

    info!(benchmarks = results.benchmarks.len(), "Done");
    Ok(())
}
