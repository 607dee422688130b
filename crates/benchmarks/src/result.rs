//! Benchmark result types.
//!
//! These types make up the persisted report. Field names follow the report
//! format consumed by the dashboards (camelCase).

use perf_harness_core::{Implementation, TransportStack, Unit};
use serde::{Deserialize, Serialize};

/// One JSON value printed by a single client iteration.
///
/// Its fields belong to the `perf` binaries and are kept as-is.
pub type ResultValue = serde_json::Value;

/// Values collected for one (version, transport stack) pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BenchmarkResult {
    /// Values in iteration order.
    pub result: Vec<ResultValue>,
    /// Implementation under test.
    pub implementation: Implementation,
    /// Version id within the implementation.
    pub version: String,
    /// Transport stack the client used.
    pub transport_stack: TransportStack,
}

/// Byte counts a benchmark was run with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Parameters {
    /// Bytes uploaded per iteration.
    pub upload_bytes: u64,
    /// Bytes downloaded per iteration.
    pub download_bytes: u64,
}

/// All results of one benchmark across the version matrix.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Benchmark {
    /// Benchmark name.
    pub name: String,
    /// Unit of the values.
    pub unit: Unit,
    /// One entry per (version, transport stack), in run order.
    pub results: Vec<BenchmarkResult>,
    /// Byte counts.
    pub parameters: Parameters,
}

/// A baseline series measured without any implementation under test.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BaselineResults {
    /// Unit of the measurements.
    pub unit: Unit,
    /// Measurements in the order they were reported.
    pub results: Vec<f64>,
}

/// Round-trip latencies in seconds.
pub type PingResults = BaselineResults;

/// Raw TCP throughput in bits per second.
pub type IperfResults = BaselineResults;

impl BaselineResults {
    /// Latency series.
    pub fn ping(results: Vec<f64>) -> PingResults {
        Self {
            unit: Unit::Seconds,
            results,
        }
    }

    /// Throughput series.
    pub fn iperf(results: Vec<f64>) -> IperfResults {
        Self {
            unit: Unit::BitsPerSecond,
            results,
        }
    }

    /// Arithmetic mean, `None` for an empty series.
    pub fn mean(&self) -> Option<f64> {
        if self.results.is_empty() {
            return None;
        }
        Some(self.results.iter().sum::<f64>() / self.results.len() as f64)
    }
}

/// The complete report of a harness run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkResults {
    /// Benchmarks in run order.
    pub benchmarks: Vec<Benchmark>,
    /// Latency baseline.
    pub pings: PingResults,
    /// Throughput baseline.
    pub iperf: IperfResults,
}
