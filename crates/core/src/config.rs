// Copyright 2025 Perf Harness Contributors
// SPDX-License-Identifier: Apache-2.0

//! Harness configuration.
//!
//! Values are layered with the `config` crate: built-in defaults, then an
//! optional TOML file, then `PERF_HARNESS__*` environment variables.
//!
//! # Example
//!
//! ```toml
//! [ssh]
//! user = "ubuntu"
//!
//! [remote]
//! port = 4001
//!
//! [discovery]
//! settle_delay_secs = 5
//! ```

use crate::error::Result;
use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default configuration file looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "perf-harness.toml";

/// Prefix of configuration environment variables.
pub const ENV_PREFIX: &str = "PERF_HARNESS";

/// Top-level harness configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HarnessConfig {
    /// Remote shell settings.
    #[serde(default)]
    pub ssh: SshConfig,
    /// Paths and ports on the remote hosts.
    #[serde(default)]
    pub remote: RemoteLayout,
    /// Build and copy settings.
    #[serde(default)]
    pub deploy: DeployConfig,
    /// Listen address discovery settings.
    #[serde(default)]
    pub discovery: DiscoveryConfig,
    /// Report output settings.
    #[serde(default)]
    pub output: OutputConfig,
}

/// Remote shell settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SshConfig {
    /// Login user on both hosts.
    #[serde(default = "default_ssh_user")]
    pub user: String,
    /// Extra options passed to every `ssh` invocation.
    #[serde(default = "default_ssh_options")]
    pub options: Vec<String>,
}

impl Default for SshConfig {
    fn default() -> Self {
        Self {
            user: default_ssh_user(),
            options: default_ssh_options(),
        }
    }
}

/// Well-known paths and the fixed port used on the remote hosts.
///
/// Relative paths resolve against the remote user's home directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteLayout {
    /// Directory holding `<implementation>/<id>/perf` builds.
    #[serde(default = "default_impl_dir")]
    pub impl_dir: String,
    /// Pidfile of the currently running server process.
    #[serde(default = "default_pidfile")]
    pub pidfile: String,
    /// Combined stdout/stderr of the server process.
    #[serde(default = "default_server_log")]
    pub server_log: String,
    /// File the server appends `[LISTEN_ADDR]` lines to.
    #[serde(default = "default_listen_addrs_file")]
    pub listen_addrs_file: String,
    /// Host the server binds to.
    #[serde(default = "default_bind_host")]
    pub bind_host: String,
    /// Fixed server port.
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for RemoteLayout {
    fn default() -> Self {
        Self {
            impl_dir: default_impl_dir(),
            pidfile: default_pidfile(),
            server_log: default_server_log(),
            listen_addrs_file: default_listen_addrs_file(),
            bind_host: default_bind_host(),
            port: default_port(),
        }
    }
}

impl RemoteLayout {
    /// Path of the `perf` binary for an implementation build.
    pub fn perf_binary(&self, implementation: &str, id: &str) -> String {
        format!("./{}/{}/{}/perf", self.impl_dir, implementation, id)
    }
}

/// Build and copy settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeployConfig {
    /// Local directory copied to each host.
    #[serde(default = "default_local_impl_dir")]
    pub local_impl_dir: PathBuf,
    /// Remote directory the implementations are copied into.
    #[serde(default = "default_remote_root")]
    pub remote_root: String,
}

impl Default for DeployConfig {
    fn default() -> Self {
        Self {
            local_impl_dir: default_local_impl_dir(),
            remote_root: default_remote_root(),
        }
    }
}

/// Listen address discovery settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscoveryConfig {
    /// Wait between server start and reading the discovery file.
    #[serde(default = "default_settle_delay_secs")]
    pub settle_delay_secs: u64,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            settle_delay_secs: default_settle_delay_secs(),
        }
    }
}

impl DiscoveryConfig {
    /// Settle delay as a [`Duration`].
    pub fn settle_delay(&self) -> Duration {
        Duration::from_secs(self.settle_delay_secs)
    }
}

/// Report output settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Path of the JSON report.
    #[serde(default = "default_report_path")]
    pub report_path: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            report_path: default_report_path(),
        }
    }
}

fn default_ssh_user() -> String {
    "root".to_string()
}

fn default_ssh_options() -> Vec<String> {
    vec!["-o".to_string(), "StrictHostKeyChecking=no".to_string()]
}

fn default_impl_dir() -> String {
    "impl".to_string()
}

fn default_pidfile() -> String {
    "pidfile".to_string()
}

fn default_server_log() -> String {
    "server.log".to_string()
}

fn default_listen_addrs_file() -> String {
    "/tmp/webrtc-listen-addrs.txt".to_string()
}

fn default_bind_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    4001
}

fn default_local_impl_dir() -> PathBuf {
    PathBuf::from("../impl")
}

fn default_remote_root() -> String {
    "/root".to_string()
}

fn default_settle_delay_secs() -> u64 {
    2
}

fn default_report_path() -> PathBuf {
    PathBuf::from("./benchmark-results.json")
}

impl HarnessConfig {
    /// Load configuration from `path`, or from [`DEFAULT_CONFIG_FILE`] if it
    /// exists, then apply environment overrides.
    ///
    /// An explicitly given file must exist.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let file = match path {
            Some(path) => File::from(path).format(FileFormat::Toml).required(true),
            None => File::with_name(DEFAULT_CONFIG_FILE)
                .format(FileFormat::Toml)
                .required(false),
        };

        let config = Config::builder()
            .add_source(file)
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .list_separator(" ")
                    .with_list_parse_key("ssh.options")
                    .try_parsing(true),
            )
            .build()?;

        Ok(config.try_deserialize()?)
    }
}
