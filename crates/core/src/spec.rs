// Copyright 2025 Perf Harness Contributors
// SPDX-License-Identifier: Apache-2.0

//! Benchmark specifications and the standard run plan.
//!
//! A [`BenchmarkPlan`] fixes everything that depends on the `--testing`
//! switch: the benchmark list with its iteration counts and per-iteration
//! timeouts, and the sizes of the two baseline probes.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Largest byte count the `perf` binaries accept; used as "unbounded".
pub const UNBOUNDED_BYTES: u64 = 9_007_199_254_740_991;

/// Per-iteration timeout for benchmarks that terminate on their own.
pub const UNBOUNDED_SECS: u64 = 9_007_199_254_740_991;

/// Unit of a benchmark or baseline series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Unit {
    /// Bits per second.
    #[serde(rename = "bit/s")]
    BitsPerSecond,
    /// Seconds.
    #[serde(rename = "s")]
    Seconds,
}

impl Unit {
    /// Report representation of the unit.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BitsPerSecond => "bit/s",
            Self::Seconds => "s",
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One parameterized benchmark run across the version matrix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BenchmarkSpec {
    /// Benchmark name as written to the report.
    pub name: String,
    /// Bytes the client uploads per iteration.
    pub upload_bytes: u64,
    /// Bytes the client downloads per iteration.
    pub download_bytes: u64,
    /// Unit of the values the client reports.
    pub unit: Unit,
    /// Client invocations per (version, transport stack).
    pub iterations: u32,
    /// Timeout wrapped around each client invocation, in seconds.
    pub duration_secs_per_iteration: u64,
}

/// Everything that varies between a full run and a testing run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BenchmarkPlan {
    /// Number of echo requests sent by the latency probe.
    pub ping_count: u32,
    /// Duration of the raw throughput probe, in seconds.
    pub iperf_secs: u32,
    /// Benchmarks to run, in order.
    pub benchmarks: Vec<BenchmarkSpec>,
}

impl BenchmarkPlan {
    /// The standard plan: upload throughput, download throughput and
    /// connection establishment latency.
    pub fn standard(testing: bool) -> Self {
        let iterations = if testing { 1 } else { 10 };
        let throughput_secs = if testing { 5 } else { 20 };

        Self {
            ping_count: if testing { 1 } else { 100 },
            iperf_secs: if testing { 1 } else { 60 },
            benchmarks: vec![
                BenchmarkSpec {
                    name: "throughput/upload".to_string(),
                    upload_bytes: UNBOUNDED_BYTES,
                    download_bytes: 0,
                    unit: Unit::BitsPerSecond,
                    iterations,
                    duration_secs_per_iteration: throughput_secs,
                },
                BenchmarkSpec {
                    name: "throughput/download".to_string(),
                    upload_bytes: 0,
                    download_bytes: UNBOUNDED_BYTES,
                    unit: Unit::BitsPerSecond,
                    iterations,
                    duration_secs_per_iteration: throughput_secs,
                },
                BenchmarkSpec {
                    name: "Connection establishment + 1 byte round trip latencies".to_string(),
                    upload_bytes: 1,
                    download_bytes: 1,
                    unit: Unit::Seconds,
                    iterations: if testing { 1 } else { 100 },
                    duration_secs_per_iteration: UNBOUNDED_SECS,
                },
            ],
        }
    }
}
