// Copyright 2025 Perf Harness Contributors
// SPDX-License-Identifier: Apache-2.0

//! Core types for the perf harness.
//!
//! This crate holds the static inputs of a harness run:
//!
//! - [`config`] - layered [`HarnessConfig`] (defaults, TOML file, environment)
//! - [`version`] - the catalog of implementation versions and their transports
//! - [`spec`] - benchmark specifications and the standard run plan
//! - [`error`] - shared error type

#![warn(missing_docs, rust_2018_idioms)]
#![deny(unsafe_code)]

pub mod config;
pub mod error;
pub mod spec;
pub mod version;

pub use config::{HarnessConfig, RemoteLayout};
pub use error::{Error, Result};
pub use spec::{BenchmarkPlan, BenchmarkSpec, Unit};
pub use version::{Implementation, ImplementationFilter, TransportStack, Version, VERSIONS};

/// Client and server host addresses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hosts {
    /// Public address of the host running the clients.
    pub client: String,
    /// Public address of the host running the servers.
    pub server: String,
}

impl Hosts {
    /// Create a host pair, rejecting empty addresses.
    pub fn new(client: impl Into<String>, server: impl Into<String>) -> Result<Self> {
        let client = client.into();
        let server = server.into();
        if client.trim().is_empty() {
            return Err(Error::invalid_input("client address must not be empty"));
        }
        if server.trim().is_empty() {
            return Err(Error::invalid_input("server address must not be empty"));
        }
        Ok(Self { client, server })
    }
}
