// Copyright 2025 Perf Harness Contributors
// SPDX-License-Identifier: Apache-2.0

//! Errors raised by remote operations.

use thiserror::Error;

/// Errors that can occur while running commands on the hosts.
#[derive(Debug, Error)]
pub enum RemoteError {
    /// The local program (ssh, sh) could not be started.
    #[error("Failed to spawn {program}: {source}")]
    Spawn {
        /// Program that failed to start.
        program: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The command exited with a code that is not whitelisted.
    #[error("Command failed with exit code {}: {command}", display_code(.code))]
    CommandFailed {
        /// The command as displayed in logs.
        command: String,
        /// Exit code; `None` when killed by a signal.
        code: Option<i32>,
    },

    /// No usable listen address was published by the server.
    #[error("Could not find listen address in {file} on {host}")]
    AddressNotFound {
        /// Server host.
        host: String,
        /// Discovery file that was read.
        file: String,
    },
}

fn display_code(code: &Option<i32>) -> String {
    match code {
        Some(code) => code.to_string(),
        None => "none (terminated by signal)".to_string(),
    }
}

/// Result type for remote operations.
pub type Result<T> = std::result::Result<T, RemoteError>;
