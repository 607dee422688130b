// Copyright 2025 Perf Harness Contributors
// SPDX-License-Identifier: Apache-2.0

//! Baseline network probes.
//!
//! Raw round-trip latency (`ping`) and raw TCP throughput (`iperf3`) between
//! the two hosts, measured independently of any implementation under test.
//! The probes return plain numeric series; the caller decides how to handle
//! failures.
//!
//! # Parsing
//!
//! - `time=23.4 ms` becomes `0.0234` seconds.
//! - `10.5 Gbits/sec` becomes `10.5e9` bits per second; `K`, `M` and `G`
//!   prefixes are base 1000, any other prefix letter counts as 1.

use crate::command::{CommandRunner, RemoteCommand};
use crate::error::Result;
use crate::server::ServerController;
use once_cell::sync::Lazy;
use perf_harness_core::{Hosts, RemoteLayout};
use regex::Regex;
use tracing::{info, warn};

static PING_TIME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"time=(\d+(?:\.\d+)?) ms").expect("valid regex"));

static BITRATE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d+(?:\.\d+)?) (\w)bits/sec").expect("valid regex"));

/// Round-trip times in seconds, one per matching line of `ping` output.
pub fn parse_ping_output(output: &str) -> Vec<f64> {
    output
        .lines()
        .filter_map(|line| PING_TIME_RE.captures(line))
        .filter_map(|caps| caps[1].parse::<f64>().ok())
        .map(|ms| ms / 1000.0)
        .collect()
}

/// Bitrates in bits per second, one per matching line of `iperf3` output.
pub fn parse_iperf_output(output: &str) -> Vec<f64> {
    output
        .lines()
        .filter_map(|line| BITRATE_RE.captures(line))
        .filter_map(|caps| {
            let value = caps[1].parse::<f64>().ok()?;
            Some(value * bitrate_multiplier(&caps[2]))
        })
        .collect()
}

fn bitrate_multiplier(prefix: &str) -> f64 {
    match prefix {
        "G" => 1e9,
        "M" => 1e6,
        "K" => 1e3,
        _ => 1.0,
    }
}

/// Ping the server from the client `count` times.
pub async fn run_ping<R: CommandRunner + ?Sized>(
    runner: &R,
    hosts: &Hosts,
    count: u32,
) -> Result<Vec<f64>> {
    info!(count, "Running pings from client to server");
    let output = runner
        .run(&RemoteCommand::on_host(
            &hosts.client,
            format!("ping -c {} {}", count, hosts.server),
        ))
        .await?;
    Ok(parse_ping_output(&output))
}

/// Measure raw TCP throughput from client to server for `secs` seconds.
///
/// The iperf3 server uses the same pidfile lifecycle as the `perf` servers
/// and is stopped again afterwards. A failed stop is logged; the next
/// start's cleanup clears the server.
pub async fn run_iperf<R: CommandRunner + ?Sized>(
    runner: &R,
    layout: &RemoteLayout,
    hosts: &Hosts,
    secs: u32,
) -> Result<Vec<f64>> {
    info!(secs, "Running iPerf TCP from client to server");
    let controller = ServerController::new(runner, layout);
    controller.start_process(&hosts.server, "iperf3 -s").await?;

    let output = runner
        .run(&RemoteCommand::on_host(
            &hosts.client,
            format!("iperf3 -c {} -t {} -N", hosts.server, secs),
        ))
        .await;
    if let Err(e) = controller.stop_server(&hosts.server).await {
        warn!(error = %e, host = %hosts.server, "Failed to stop iperf3 server");
    }

    Ok(parse_iperf_output(&output?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::MockCommandRunner;
    use crate::error::RemoteError;
    use std::sync::{Arc, Mutex};

    const PING_OUTPUT: &str = "\
PING 10.0.0.2 (10.0.0.2) 56(84) bytes of data.
64 bytes from 10.0.0.2: icmp_seq=1 ttl=64 time=23.4 ms
64 bytes from 10.0.0.2: icmp_seq=2 ttl=64 time=0.512 ms

--- 10.0.0.2 ping statistics ---
2 packets transmitted, 2 received, 0% packet loss, time 1001ms
rtt min/avg/max/mdev = 0.512/11.956/23.400/11.444 ms
";

    const IPERF_OUTPUT: &str = "\
Connecting to host 10.0.0.2, port 5201
[  5] local 10.0.0.1 port 43210 connected to 10.0.0.2 port 5201
[ ID] Interval           Transfer     Bitrate         Retr  Cwnd
[  5]   0.00-1.00   sec  1.22 GBytes  10.5 Gbits/sec    0   3.01 MBytes
[  5]   1.00-2.00   sec   112 MBytes   940 Mbits/sec    0   3.01 MBytes
[  5]   2.00-3.00   sec   100 KBytes   800 Kbits/sec    0   3.01 MBytes
";

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() <= expected.abs() * 1e-12,
            "{} != {}",
            actual,
            expected
        );
    }

    #[test]
    fn test_ping_time_converted_to_seconds() {
        let times = parse_ping_output(PING_OUTPUT);
        assert_eq!(times.len(), 2);
        assert_close(times[0], 0.0234);
        assert_close(times[1], 0.000512);
    }

    #[test]
    fn test_ping_without_replies_is_empty() {
        assert!(parse_ping_output("From 10.0.0.1 icmp_seq=1 Destination Host Unreachable").is_empty());
    }

    #[test]
    fn test_iperf_units_normalized() {
        let rates = parse_iperf_output(IPERF_OUTPUT);
        assert_eq!(rates.len(), 3);
        assert_close(rates[0], 10.5e9);
        assert_close(rates[1], 940e6);
        assert_close(rates[2], 800e3);
    }

    #[test]
    fn test_iperf_unknown_prefix_counts_as_one() {
        let rates = parse_iperf_output("[  5] 0.00-1.00 sec 12 Bytes 96 Xbits/sec");
        assert_eq!(rates, vec![96.0]);
    }

    #[tokio::test]
    async fn test_run_ping_targets_client() {
        let mut runner = MockCommandRunner::new();
        runner
            .expect_run()
            .withf(|cmd| cmd.host() == Some("10.0.0.1") && cmd.script == "ping -c 3 10.0.0.2")
            .times(1)
            .returning(|_| Ok(PING_OUTPUT.to_string()));
        let hosts = Hosts::new("10.0.0.1", "10.0.0.2").unwrap();

        let times = run_ping(&runner, &hosts, 3).await.unwrap();
        assert_eq!(times.len(), 2);
    }

    #[tokio::test]
    async fn test_run_iperf_stops_server_after_client_failure() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let recorded = log.clone();
        let mut runner = MockCommandRunner::new();
        runner.expect_run().returning(move |cmd| {
            recorded
                .lock()
                .unwrap()
                .push((cmd.host().map(str::to_string), cmd.script.clone()));
            if cmd.script.starts_with("iperf3 -c") {
                Err(RemoteError::CommandFailed {
                    command: cmd.to_string(),
                    code: Some(1),
                })
            } else {
                Ok(String::new())
            }
        });

        let hosts = Hosts::new("10.0.0.1", "10.0.0.2").unwrap();
        let layout = RemoteLayout::default();
        let err = run_iperf(&runner, &layout, &hosts, 1).await.unwrap_err();
        assert!(matches!(err, RemoteError::CommandFailed { code: Some(1), .. }));

        let calls = log.lock().unwrap();
        let server = Some("10.0.0.2".to_string());
        assert_eq!(calls.len(), 4);
        assert!(calls[0].1.starts_with("kill") && calls[0].0 == server);
        assert!(calls[1].1.starts_with("nohup iperf3 -s") && calls[1].0 == server);
        assert_eq!(calls[2].1, "iperf3 -c 10.0.0.2 -t 1 -N");
        assert_eq!(calls[2].0.as_deref(), Some("10.0.0.1"));
        assert!(calls[3].1.starts_with("kill") && calls[3].0 == server);
    }

    /// Runner whose client `iperf3 -c` and final cleanup outcomes are chosen
    /// by the test; the first cleanup and the launch succeed.
    fn iperf_runner(client_fails: bool, final_cleanup_fails: bool) -> MockCommandRunner {
        let cleanups = Arc::new(Mutex::new(0));
        let mut runner = MockCommandRunner::new();
        runner.expect_run().returning(move |cmd| {
            let failed = || RemoteError::CommandFailed {
                command: cmd.to_string(),
                code: Some(255),
            };
            if cmd.script.starts_with("iperf3 -c") {
                return if client_fails {
                    Err(failed())
                } else {
                    Ok(IPERF_OUTPUT.to_string())
                };
            }
            if cmd.script.starts_with("kill") {
                let mut count = cleanups.lock().unwrap();
                *count += 1;
                if *count == 2 && final_cleanup_fails {
                    return Err(failed());
                }
            }
            Ok(String::new())
        });
        runner
    }

    #[tokio::test]
    async fn test_run_iperf_keeps_measurement_when_stop_fails() {
        let runner = iperf_runner(false, true);
        let hosts = Hosts::new("10.0.0.1", "10.0.0.2").unwrap();
        let layout = RemoteLayout::default();

        let rates = run_iperf(&runner, &layout, &hosts, 1).await.unwrap();
        assert_eq!(rates.len(), 3);
        assert_close(rates[0], 10.5e9);
    }

    #[tokio::test]
    async fn test_run_iperf_client_error_wins_over_stop_error() {
        let runner = iperf_runner(true, true);
        let hosts = Hosts::new("10.0.0.1", "10.0.0.2").unwrap();
        let layout = RemoteLayout::default();

        let err = run_iperf(&runner, &layout, &hosts, 1).await.unwrap_err();
        match err {
            RemoteError::CommandFailed { command, .. } => {
                assert!(command.contains("iperf3 -c 10.0.0.2"))
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
