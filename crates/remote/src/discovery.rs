// Copyright 2025 Perf Harness Contributors
// SPDX-License-Identifier: Apache-2.0

//! Listen address discovery.
//!
//! Some transports (WebRTC direct) only know their full listen address once
//! bound: it embeds a certificate hash. Servers publish each bound address
//! by appending a line to a well-known file:
//!
//! ```text
//! [LISTEN_ADDR] /ip4/10.0.0.2/udp/4001/webrtc-direct/certhash/uEiB.../p2p/12D3Koo...
//! ```
//!
//! There is no readiness handshake, so discovery waits a fixed settle delay
//! and then reads the file once. The last marker line wins. Servers that
//! bind to loopback despite being asked for all interfaces get their
//! loopback host rewritten to the server's public address.

use crate::command::{CommandRunner, RemoteCommand};
use crate::error::{RemoteError, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use std::time::Duration;
use tracing::{info, warn};

/// Marker prefixing every published address.
pub const LISTEN_ADDR_MARKER: &str = "[LISTEN_ADDR]";

const LOOPBACK_IP4: &str = "/ip4/127.0.0.1/";

static LISTEN_ADDR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[LISTEN_ADDR\]\s+(/ip[46]/\S+)").expect("valid regex"));

/// Extract the published address from the contents of a discovery file.
///
/// Returns `None` when no marker line carries an address.
pub fn parse_listen_addr(contents: &str, public_host: &str) -> Option<String> {
    let last = contents
        .lines()
        .rfind(|line| line.contains(LISTEN_ADDR_MARKER))?;
    let addr = LISTEN_ADDR_RE.captures(last)?.get(1)?.as_str();
    Some(addr.replace(LOOPBACK_IP4, &format!("/ip4/{}/", public_host)))
}

/// Wait `settle_delay`, then read the discovery file on `host`.
///
/// A missing address is fatal for the run and returned as
/// [`RemoteError::AddressNotFound`].
pub async fn discover_listen_addr<R: CommandRunner + ?Sized>(
    runner: &R,
    host: &str,
    listen_addrs_file: &str,
    settle_delay: Duration,
) -> Result<String> {
    info!(host, ?settle_delay, "Waiting for server listen address");
    tokio::time::sleep(settle_delay).await;

    let contents = runner
        .run(&RemoteCommand::on_host(
            host,
            format!("cat {} 2>/dev/null || true", listen_addrs_file),
        ))
        .await?;

    match parse_listen_addr(&contents, host) {
        Some(addr) => {
            info!(host, addr = %addr, "Captured server listen address");
            Ok(addr)
        }
        None => {
            warn!(host, output = contents.trim(), "Failed to extract listen address");
            Err(RemoteError::AddressNotFound {
                host: host.to_string(),
                file: listen_addrs_file.to_string(),
            })
        }
    }
}
