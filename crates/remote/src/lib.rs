// Copyright 2025 Perf Harness Contributors
// SPDX-License-Identifier: Apache-2.0

//! Remote host operations for the perf harness.
//!
//! Everything the harness does on the client and server hosts goes through
//! a [`CommandRunner`]:
//!
//! - [`command`] - the runner trait and its ssh implementation
//! - [`server`] - pidfile-managed server lifecycle
//! - [`discovery`] - listen address discovery for late-bound transports
//! - [`probes`] - ping and iperf3 baselines
//! - [`deploy`] - copy and build the implementations
//!
//! # Example
//!
//! ```no_run
//! use perf_harness_core::{HarnessConfig, Hosts};
//! use perf_harness_remote::{probes, SshRunner};
//!
//! # async fn example() -> perf_harness_remote::Result<()> {
//! let config = HarnessConfig::default();
//! let runner = SshRunner::new(&config.ssh);
//! let hosts = Hosts::new("203.0.113.1", "203.0.113.2").unwrap();
//!
//! let rtts = probes::run_ping(&runner, &hosts, 10).await?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs, rust_2018_idioms)]
#![deny(unsafe_code)]

pub mod command;
pub mod deploy;
pub mod discovery;
pub mod error;
pub mod probes;
pub mod server;

pub use command::{CommandRunner, RemoteCommand, SshRunner, Target, TIMEOUT_EXIT_CODE};
pub use error::{RemoteError, Result};
pub use server::ServerController;
