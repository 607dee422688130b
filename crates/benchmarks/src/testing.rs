//! Test doubles for the command runner.

use async_trait::async_trait;
use perf_harness_remote::{CommandRunner, RemoteCommand, RemoteError};
use std::sync::{Arc, Mutex};

mockall::mock! {
    pub Runner {}

    #[async_trait]
    impl CommandRunner for Runner {
        async fn run(&self, command: &RemoteCommand) -> perf_harness_remote::Result<String>;
    }
}

/// Scripted client and server hosts.
///
/// Answers each command by its script prefix and records every command.
/// Assumes the server host is `10.0.0.2`.
pub struct FakeHosts {
    commands: Arc<Mutex<Vec<RemoteCommand>>>,
    values_per_client_run: usize,
    publish_addr: bool,
    fail_ping: bool,
    fail_iperf: bool,
    fail_client: bool,
}

impl FakeHosts {
    pub const LISTEN_LINE: &'static str =
        "[LISTEN_ADDR] /ip4/127.0.0.1/udp/4001/webrtc-direct/certhash/uEiA/p2p/12D3KooW";
    pub const PUBLISHED_ADDR: &'static str =
        "/ip4/10.0.0.2/udp/4001/webrtc-direct/certhash/uEiA/p2p/12D3KooW";
    pub const PING_OUTPUT: &'static str =
        "64 bytes from 10.0.0.2: icmp_seq=1 ttl=64 time=23.4 ms\n";
    pub const IPERF_OUTPUT: &'static str =
        "[  5]   0.00-1.00   sec  1.22 GBytes  10.5 Gbits/sec    0   3.01 MBytes\n";

    /// Each client run prints `values_per_client_run` JSON lines plus one
    /// line of noise.
    pub fn new(values_per_client_run: usize) -> Self {
        Self {
            commands: Arc::new(Mutex::new(Vec::new())),
            values_per_client_run,
            publish_addr: true,
            fail_ping: false,
            fail_iperf: false,
            fail_client: false,
        }
    }

    pub fn without_published_addr(mut self) -> Self {
        self.publish_addr = false;
        self
    }

    pub fn failing_ping(mut self) -> Self {
        self.fail_ping = true;
        self
    }

    pub fn failing_iperf(mut self) -> Self {
        self.fail_iperf = true;
        self
    }

    /// Client runs exit with code 1.
    pub fn failing_client(mut self) -> Self {
        self.fail_client = true;
        self
    }

    pub fn runner(&self) -> MockRunner {
        let commands = Arc::clone(&self.commands);
        let values = self.values_per_client_run;
        let publish_addr = self.publish_addr;
        let fail_ping = self.fail_ping;
        let fail_iperf = self.fail_iperf;
        let fail_client = self.fail_client;

        let mut runner = MockRunner::new();
        runner.expect_run().returning(move |cmd| {
            commands.lock().unwrap().push(cmd.clone());
            let script = cmd.script.as_str();

            if script.starts_with("ping") {
                return if fail_ping {
                    Err(failed(cmd))
                } else {
                    Ok(Self::PING_OUTPUT.to_string())
                };
            }
            if script.starts_with("iperf3 -c") {
                return if fail_iperf {
                    Err(failed(cmd))
                } else {
                    Ok(Self::IPERF_OUTPUT.to_string())
                };
            }
            if script.starts_with("cat ") {
                return Ok(if publish_addr {
                    format!("{}\n", Self::LISTEN_LINE)
                } else {
                    String::new()
                });
            }
            if script.starts_with("for i in") {
                if fail_client {
                    return Err(RemoteError::CommandFailed {
                        command: cmd.to_string(),
                        code: Some(1),
                    });
                }
                let mut out = String::new();
                for i in 0..values {
                    out.push_str(&format!("{{\"type\":\"final\",\"iteration\":{}}}\n", i));
                }
                out.push_str("Error: connection reset by peer\n");
                return Ok(out);
            }
            Ok(String::new())
        });
        runner
    }

    pub fn commands(&self) -> Vec<RemoteCommand> {
        self.commands.lock().unwrap().clone()
    }

    pub fn scripts(&self) -> Vec<String> {
        self.commands().into_iter().map(|c| c.script).collect()
    }
}

fn failed(cmd: &RemoteCommand) -> RemoteError {
    RemoteError::CommandFailed {
        command: cmd.to_string(),
        code: Some(2),
    }
}
