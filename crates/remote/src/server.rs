// Copyright 2025 Perf Harness Contributors
// SPDX-License-Identifier: Apache-2.0

//! Remote process controller.
//!
//! Servers run detached on the server host. Their pid is written to a fixed
//! pidfile so that a later call, possibly from a later harness run, can kill
//! them. Combined output goes to a fixed log file.
//!
//! Every start first runs the stale cleanup, so a server left behind by an
//! interrupted run never blocks the fixed port. Cleanup of files that are
//! already gone is not an error.

use crate::command::{CommandRunner, RemoteCommand};
use crate::error::Result;
use perf_harness_core::{RemoteLayout, TransportStack, Version};
use tracing::{debug, info};

/// Starts and stops pidfile-managed processes on a host.
pub struct ServerController<'a, R: ?Sized> {
    runner: &'a R,
    layout: &'a RemoteLayout,
}

impl<'a, R: CommandRunner + ?Sized> ServerController<'a, R> {
    /// Create a controller over `runner` using the paths in `layout`.
    pub fn new(runner: &'a R, layout: &'a RemoteLayout) -> Self {
        Self { runner, layout }
    }

    /// Kill whatever the pidfile names and remove pidfile, log and
    /// discovery file.
    pub fn cleanup_script(&self) -> String {
        format!(
            "kill $(cat {pid} 2>/dev/null) 2>/dev/null; rm -f {pid} {log} {addrs} || true",
            pid = self.layout.pidfile,
            log = self.layout.server_log,
            addrs = self.layout.listen_addrs_file,
        )
    }

    /// Detach `command_line`, redirecting its output to the log and its pid
    /// to the pidfile.
    pub fn launch_script(&self, command_line: &str) -> String {
        format!(
            "nohup {} > {} 2>&1 & echo $! > {}",
            command_line, self.layout.server_log, self.layout.pidfile
        )
    }

    /// Command line of the `perf` server for `version`.
    ///
    /// `transport_hint` is passed through only for transports that need
    /// address discovery; other servers listen on all their transports.
    pub fn server_command_line(
        &self,
        version: &Version,
        transport_hint: Option<TransportStack>,
    ) -> String {
        let mut line = format!(
            "{} --run-server --server-address {}:{}",
            self.layout
                .perf_binary(version.implementation.as_str(), version.id),
            self.layout.bind_host,
            self.layout.port,
        );
        if let Some(stack) = transport_hint.filter(TransportStack::requires_address_discovery) {
            line.push_str(" --transport ");
            line.push_str(stack.as_str());
        }
        line
    }

    /// Clear any stale process, then launch `command_line` detached.
    pub async fn start_process(&self, host: &str, command_line: &str) -> Result<()> {
        self.clear_stale(host).await?;

        debug!(host, command_line, "Launching remote process");
        let out = self
            .runner
            .run(&RemoteCommand::on_host(host, self.launch_script(command_line)))
            .await?;
        log_output(&out);
        Ok(())
    }

    /// Clear any stale process, then start the `perf` server for `version`.
    pub async fn start_server(
        &self,
        host: &str,
        version: &Version,
        transport_hint: Option<TransportStack>,
    ) -> Result<()> {
        info!(
            implementation = %version.implementation,
            version = version.id,
            host,
            "Starting server"
        );
        let command_line = self.server_command_line(version, transport_hint);
        self.start_process(host, &command_line).await
    }

    /// Kill the process named by the pidfile and remove its artifacts.
    ///
    /// A missing pidfile is tolerated.
    pub async fn stop_server(&self, host: &str) -> Result<()> {
        info!(host, "Stopping server");
        self.clear_stale(host).await
    }

    async fn clear_stale(&self, host: &str) -> Result<()> {
        let out = self
            .runner
            .run(&RemoteCommand::on_host(host, self.cleanup_script()))
            .await?;
        log_output(&out);
        Ok(())
    }
}

fn log_output(out: &str) {
    let out = out.trim();
    if !out.is_empty() {
        debug!(output = out, "Remote output");
    }
}
