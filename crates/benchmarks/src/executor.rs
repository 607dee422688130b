//! Benchmark executor.
//!
//! Runs one [`BenchmarkSpec`] across a set of versions. Per version exactly
//! one server lifecycle runs on the server host:
//!
//! ```text
//! start server -> [discover listen address] -> client per transport stack -> stop server
//! ```
//!
//! Versions are processed strictly one after another; only one server may
//! hold the fixed port at a time.

use crate::result::{Benchmark, BenchmarkResult, Parameters, ResultValue};
use crate::Result;
use perf_harness_core::{BenchmarkSpec, Hosts, RemoteLayout, TransportStack, Version};
use perf_harness_remote::discovery::discover_listen_addr;
use perf_harness_remote::{CommandRunner, RemoteCommand, ServerController, TIMEOUT_EXIT_CODE};
use std::time::Duration;
use tracing::{info, warn};

/// Drives benchmarks against the client and server hosts.
pub struct BenchmarkExecutor<'a, R: ?Sized> {
    runner: &'a R,
    hosts: &'a Hosts,
    layout: &'a RemoteLayout,
    settle_delay: Duration,
}

impl<'a, R: CommandRunner + ?Sized> BenchmarkExecutor<'a, R> {
    /// Create an executor.
    ///
    /// `settle_delay` is the wait between server start and address discovery.
    pub fn new(
        runner: &'a R,
        hosts: &'a Hosts,
        layout: &'a RemoteLayout,
        settle_delay: Duration,
    ) -> Self {
        Self {
            runner,
            hosts,
            layout,
            settle_delay,
        }
    }

    /// Run `spec` against every version, producing one result per
    /// (version, transport stack).
    pub async fn run_across_versions(
        &self,
        spec: &BenchmarkSpec,
        versions: &[Version],
    ) -> Result<Benchmark> {
        let names: Vec<String> = versions.iter().map(Version::to_string).collect();
        info!(benchmark = %spec.name, versions = ?names, "Starting benchmark");

        let controller = ServerController::new(self.runner, self.layout);
        let mut results = Vec::new();

        for version in versions {
            info!(benchmark = %spec.name, version = %version, "Running version");

            let discovery_transport = version.discovery_transport();
            controller
                .start_server(&self.hosts.server, version, discovery_transport)
                .await?;

            let listen_addr = match discovery_transport {
                Some(_) => Some(
                    discover_listen_addr(
                        self.runner,
                        &self.hosts.server,
                        &self.layout.listen_addrs_file,
                        self.settle_delay,
                    )
                    .await?,
                ),
                None => None,
            };

            for &transport_stack in version.transport_stacks {
                let values = self
                    .run_client(spec, version, transport_stack, listen_addr.as_deref())
                    .await?;
                results.push(BenchmarkResult {
                    result: values,
                    implementation: version.implementation,
                    version: version.id.to_string(),
                    transport_stack,
                });
            }

            controller.stop_server(&self.hosts.server).await?;
        }

        Ok(Benchmark {
            name: spec.name.clone(),
            unit: spec.unit,
            results,
            parameters: Parameters {
                upload_bytes: spec.upload_bytes,
                download_bytes: spec.download_bytes,
            },
        })
    }

    /// Address the client dials.
    ///
    /// Discovery transports dial the published multiaddr; everything else
    /// dials the fixed port on the server's public address.
    pub fn server_address(&self, transport_stack: TransportStack, listen_addr: Option<&str>) -> String {
        match listen_addr {
            Some(addr) if transport_stack.requires_address_discovery() => addr.to_string(),
            _ => format!("{}:{}", self.hosts.server, self.layout.port),
        }
    }

    /// Shell loop running the client `spec.iterations` times.
    ///
    /// `spec.iterations` must be at least 1: bash expands `{1..0}` to `1 0`.
    ///
    /// Each invocation is wrapped in `timeout`; a timed-out iteration is a
    /// normal end for throughput benchmarks and does not fail the loop.
    pub fn client_script(
        &self,
        spec: &BenchmarkSpec,
        version: &Version,
        transport_stack: TransportStack,
        server_address: &str,
    ) -> String {
        let client = format!(
            "{} --server-address {} --transport {} --upload-bytes {} --download-bytes {}",
            self.layout
                .perf_binary(version.implementation.as_str(), version.id),
            server_address,
            transport_stack,
            spec.upload_bytes,
            spec.download_bytes,
        );
        format!(
            "for i in {{1..{}}}; do timeout {}s {} || [ $? -eq {} ]; done",
            spec.iterations, spec.duration_secs_per_iteration, client, TIMEOUT_EXIT_CODE
        )
    }

    async fn run_client(
        &self,
        spec: &BenchmarkSpec,
        version: &Version,
        transport_stack: TransportStack,
        listen_addr: Option<&str>,
    ) -> Result<Vec<ResultValue>> {
        if spec.iterations == 0 {
            warn!(benchmark = %spec.name, version = %version, "Zero iterations, skipping client");
            return Ok(Vec::new());
        }
        info!(
            version = %version,
            transport = %transport_stack,
            iterations = spec.iterations,
            "Starting client"
        );

        let server_address = self.server_address(transport_stack, listen_addr);
        let command = RemoteCommand::on_host(
            &self.hosts.client,
            self.client_script(spec, version, transport_stack, &server_address),
        )
        .allow_exit_code(TIMEOUT_EXIT_CODE);

        let stdout = self.runner.run(&command).await?;
        Ok(parse_result_values(&stdout, spec.iterations))
    }
}

/// Parse client output, one JSON value per line.
///
/// Lines that are not valid JSON are logged and dropped. At most
/// `iterations` values are kept.
pub fn parse_result_values(stdout: &str, iterations: u32) -> Vec<ResultValue> {
    let mut values: Vec<ResultValue> = stdout
        .trim()
        .lines()
        .filter_map(|line| match serde_json::from_str(line) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(line, error = %e, "Could not parse result value");
                None
            }
        })
        .collect();

    let limit = iterations as usize;
    if values.len() > limit {
        warn!(
            parsed = values.len(),
            iterations, "Client printed more values than iterations, dropping surplus"
        );
        values.truncate(limit);
    }
    values
}
