// Copyright 2025 Perf Harness Contributors
// SPDX-License-Identifier: Apache-2.0

//! Command runner.
//!
//! Every external process the harness starts goes through a
//! [`CommandRunner`]. A [`RemoteCommand`] is a shell script plus the host it
//! runs on; [`SshRunner`] runs it through `ssh` for remote hosts and `sh -c`
//! locally. Commands run one at a time and the caller awaits each to
//! completion.
//!
//! A non-zero exit is an error unless the command whitelists the code.

use crate::error::{RemoteError, Result};
use async_trait::async_trait;
use perf_harness_core::config::SshConfig;
use std::fmt;
use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;

/// Exit code of `timeout(1)` when the wrapped command was cut off.
pub const TIMEOUT_EXIT_CODE: i32 = 124;

/// Where a command runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// The machine running the harness.
    Local,
    /// A remote host reached over ssh.
    Host(String),
}

/// A shell script bound to a target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteCommand {
    /// Where the script runs.
    pub target: Target,
    /// Script passed to the shell.
    pub script: String,
    /// Non-zero exit codes treated as success.
    pub benign_exit_codes: Vec<i32>,
}

impl RemoteCommand {
    /// A script run on `host`.
    pub fn on_host(host: impl Into<String>, script: impl Into<String>) -> Self {
        Self {
            target: Target::Host(host.into()),
            script: script.into(),
            benign_exit_codes: Vec::new(),
        }
    }

    /// A script run on the local machine.
    pub fn local(script: impl Into<String>) -> Self {
        Self {
            target: Target::Local,
            script: script.into(),
            benign_exit_codes: Vec::new(),
        }
    }

    /// Treat `code` as a successful exit.
    pub fn allow_exit_code(mut self, code: i32) -> Self {
        self.benign_exit_codes.push(code);
        self
    }

    /// Whether an exit with `code` counts as success.
    pub fn is_success(&self, code: i32) -> bool {
        code == 0 || self.benign_exit_codes.contains(&code)
    }

    /// Host the command runs on, if remote.
    pub fn host(&self) -> Option<&str> {
        match &self.target {
            Target::Local => None,
            Target::Host(host) => Some(host),
        }
    }
}

impl fmt::Display for RemoteCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.target {
            Target::Local => write!(f, "{}", self.script),
            Target::Host(host) => write!(f, "[{}] {}", host, self.script),
        }
    }
}

/// Executes commands and returns their standard output.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run `command` to completion.
    ///
    /// Returns stdout on success, [`RemoteError::CommandFailed`] on a
    /// non-whitelisted exit.
    async fn run(&self, command: &RemoteCommand) -> Result<String>;
}

/// Runs commands with `ssh` (remote) or `sh -c` (local).
#[derive(Debug, Clone)]
pub struct SshRunner {
    user: String,
    options: Vec<String>,
}

impl SshRunner {
    /// Create a runner from ssh settings.
    pub fn new(config: &SshConfig) -> Self {
        Self {
            user: config.user.clone(),
            options: config.options.clone(),
        }
    }

    /// `user@host` for a host.
    pub fn destination(&self, host: &str) -> String {
        format!("{}@{}", self.user, host)
    }

    /// Program and arguments used to run `command`.
    pub fn argv(&self, command: &RemoteCommand) -> (String, Vec<String>) {
        match &command.target {
            Target::Local => (
                "sh".to_string(),
                vec!["-c".to_string(), command.script.clone()],
            ),
            Target::Host(host) => {
                let mut args = self.options.clone();
                args.push(self.destination(host));
                args.push(command.script.clone());
                ("ssh".to_string(), args)
            }
        }
    }
}

#[async_trait]
impl CommandRunner for SshRunner {
    async fn run(&self, command: &RemoteCommand) -> Result<String> {
        let (program, args) = self.argv(command);
        debug!(command = %command, "Running command");

        let output = Command::new(&program)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .output()
            .await
            .map_err(|source| RemoteError::Spawn {
                program: program.clone(),
                source,
            })?;

        match output.status.code() {
            Some(code) if command.is_success(code) => {
                Ok(String::from_utf8_lossy(&output.stdout).into_owned())
            }
            code => Err(RemoteError::CommandFailed {
                command: command.to_string(),
                code,
            }),
        }
    }
}
