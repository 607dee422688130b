// Copyright 2025 Perf Harness Contributors
// SPDX-License-Identifier: Apache-2.0

//! Copy the implementation sources to a host and build the selected ones.

use crate::command::{CommandRunner, RemoteCommand};
use crate::error::Result;
use perf_harness_core::config::{DeployConfig, SshConfig};
use perf_harness_core::{Implementation, RemoteLayout};
use tracing::{debug, info};

/// `rsync` invocation copying the local implementation tree to `host`.
pub fn rsync_script(ssh: &SshConfig, deploy: &DeployConfig, host: &str) -> String {
    let mut remote_shell = String::from("ssh");
    for option in &ssh.options {
        remote_shell.push(' ');
        remote_shell.push_str(option);
    }
    format!(
        "rsync -avz --progress --exclude='node_modules' --filter=':- .gitignore' -e \"{}\" {} {}@{}:{}",
        remote_shell,
        deploy.local_impl_dir.display(),
        ssh.user,
        host,
        deploy.remote_root,
    )
}

/// `make` invocation building `implementations` on the host.
pub fn build_script(layout: &RemoteLayout, implementations: &[Implementation]) -> String {
    let targets: Vec<&str> = implementations.iter().map(|i| i.as_str()).collect();
    format!("cd {} && make {}", layout.impl_dir, targets.join(" "))
}

/// Copy the implementations to `host` and build the ones given.
///
/// Any failure is returned to the caller; a host without binaries cannot
/// take part in the run.
pub async fn copy_and_build<R: CommandRunner + ?Sized>(
    runner: &R,
    ssh: &SshConfig,
    deploy: &DeployConfig,
    layout: &RemoteLayout,
    host: &str,
    implementations: &[Implementation],
) -> Result<()> {
    info!(host, ?implementations, "Building implementations");

    let out = runner
        .run(&RemoteCommand::local(rsync_script(ssh, deploy, host)))
        .await?;
    debug!(host, output = out.trim(), "rsync finished");

    let out = runner
        .run(&RemoteCommand::on_host(
            host,
            build_script(layout, implementations),
        ))
        .await?;
    debug!(host, output = out.trim(), "make finished");

    Ok(())
}
