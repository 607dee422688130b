// Copyright 2025 Perf Harness Contributors
// SPDX-License-Identifier: Apache-2.0

//! Version catalog for the implementations under test.
//!
//! The catalog is a static table of plain records. Each [`Version`] names an
//! implementation, the build directory it lives in on the remote hosts and
//! the transport stacks its `perf` binary supports.
//!
//! # Example
//!
//! ```
//! use perf_harness_core::version::{filter_versions, ImplementationFilter, VERSIONS};
//!
//! let selected = filter_versions(VERSIONS, &[ImplementationFilter::All]);
//! assert_eq!(selected.len(), VERSIONS.len());
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

/// An implementation under test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Implementation {
    /// JavaScript libp2p
    JsLibp2p,
    /// Rust libp2p
    RustLibp2p,
    /// Go libp2p
    GoLibp2p,
    /// Plain HTTPS baseline
    Https,
    /// Bare quic-go baseline
    QuicGo,
}

impl Implementation {
    /// All implementations, in catalog order.
    pub const ALL: [Implementation; 5] = [
        Implementation::JsLibp2p,
        Implementation::RustLibp2p,
        Implementation::GoLibp2p,
        Implementation::Https,
        Implementation::QuicGo,
    ];

    /// Directory name and wire identifier of the implementation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::JsLibp2p => "js-libp2p",
            Self::RustLibp2p => "rust-libp2p",
            Self::GoLibp2p => "go-libp2p",
            Self::Https => "https",
            Self::QuicGo => "quic-go",
        }
    }
}

impl fmt::Display for Implementation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A transport stack selectable through the `perf` binary's `--transport` flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TransportStack {
    /// TCP with security and multiplexing negotiated on top.
    Tcp,
    /// QUIC version 1.
    QuicV1,
    /// WebRTC direct; the listen address carries a certificate hash only
    /// known once the server is bound.
    WebrtcDirect,
}

impl TransportStack {
    /// Value passed to `--transport`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Tcp => "tcp",
            Self::QuicV1 => "quic-v1",
            Self::WebrtcDirect => "webrtc-direct",
        }
    }

    /// Whether the server's listen address must be read back after start.
    pub fn requires_address_discovery(&self) -> bool {
        matches!(self, Self::WebrtcDirect)
    }
}

impl fmt::Display for TransportStack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One buildable version of an implementation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Version {
    /// Implementation this version belongs to.
    pub implementation: Implementation,
    /// Build id; also the directory under `impl/<implementation>/`.
    pub id: &'static str,
    /// Transport stacks supported by this build.
    pub transport_stacks: &'static [TransportStack],
}

impl Version {
    /// The first transport stack that requires address discovery, if any.
    pub fn discovery_transport(&self) -> Option<TransportStack> {
        self.transport_stacks
            .iter()
            .copied()
            .find(TransportStack::requires_address_discovery)
    }

    /// Whether `stack` is in the supported set.
    pub fn supports(&self, stack: TransportStack) -> bool {
        self.transport_stacks.contains(&stack)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.implementation, self.id)
    }
}

/// The built-in version catalog.
pub static VERSIONS: &[Version] = &[
    Version {
        implementation: Implementation::RustLibp2p,
        id: "v0.53",
        transport_stacks: &[TransportStack::Tcp, TransportStack::QuicV1],
    },
    Version {
        implementation: Implementation::RustLibp2p,
        id: "v0.54",
        transport_stacks: &[TransportStack::Tcp, TransportStack::QuicV1],
    },
    Version {
        implementation: Implementation::Https,
        id: "v0.1",
        transport_stacks: &[TransportStack::Tcp],
    },
    Version {
        implementation: Implementation::QuicGo,
        id: "v0.34",
        transport_stacks: &[TransportStack::QuicV1],
    },
    Version {
        implementation: Implementation::GoLibp2p,
        id: "v0.41",
        transport_stacks: &[TransportStack::Tcp, TransportStack::QuicV1],
    },
    Version {
        implementation: Implementation::JsLibp2p,
        id: "v2.8",
        transport_stacks: &[TransportStack::Tcp],
    },
    Version {
        implementation: Implementation::JsLibp2p,
        id: "webrtc-roamhq-wrtc",
        transport_stacks: &[TransportStack::WebrtcDirect],
    },
];

/// Selection of implementations to run; `All` is a wildcard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImplementationFilter {
    /// Every implementation.
    All,
    /// A single implementation.
    Only(Implementation),
}

impl ImplementationFilter {
    /// Whether the filter selects `implementation`.
    pub fn matches(&self, implementation: Implementation) -> bool {
        match self {
            Self::All => true,
            Self::Only(selected) => *selected == implementation,
        }
    }
}

/// Versions selected by any of `filters`, in catalog order.
pub fn filter_versions(catalog: &[Version], filters: &[ImplementationFilter]) -> Vec<Version> {
    catalog
        .iter()
        .filter(|v| filters.iter().any(|f| f.matches(v.implementation)))
        .copied()
        .collect()
}

/// Distinct implementations of `versions`, in first-seen order.
pub fn implementations_of(versions: &[Version]) -> Vec<Implementation> {
    let mut seen = Vec::new();
    for version in versions {
        if !seen.contains(&version.implementation) {
            seen.push(version.implementation);
        }
    }
    seen
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_versions_have_transports() {
        for version in VERSIONS {
            assert!(
                !version.transport_stacks.is_empty(),
                "{} has no transport stacks",
                version
            );
        }
    }

    #[test]
    fn test_catalog_ids_are_unique_per_implementation() {
        let mut seen = std::collections::HashSet::new();
        for version in VERSIONS {
            assert!(seen.insert((version.implementation, version.id)));
        }
    }

    #[test]
    fn test_filter_all_selects_everything() {
        let selected = filter_versions(VERSIONS, &[ImplementationFilter::All]);
        assert_eq!(selected, VERSIONS.to_vec());
    }

    #[test]
    fn test_filter_subset_preserves_catalog_order() {
        let selected = filter_versions(
            VERSIONS,
            &[
                ImplementationFilter::Only(Implementation::Https),
                ImplementationFilter::Only(Implementation::RustLibp2p),
            ],
        );
        assert_eq!(selected.len(), 3);
        assert_eq!(selected[0].implementation, Implementation::RustLibp2p);
        assert_eq!(selected[2].implementation, Implementation::Https);
    }

    #[test]
    fn test_filter_with_no_match_is_empty() {
        let catalog = [Version {
            implementation: Implementation::Https,
            id: "v0.1",
            transport_stacks: &[TransportStack::Tcp],
        }];
        let selected = filter_versions(
            &catalog,
            &[ImplementationFilter::Only(Implementation::QuicGo)],
        );
        assert!(selected.is_empty());
    }

    #[test]
    fn test_implementations_of_deduplicates() {
        let impls = implementations_of(VERSIONS);
        assert_eq!(impls.len(), Implementation::ALL.len());
        assert_eq!(impls[0], Implementation::RustLibp2p);
    }

    #[test]
    fn test_discovery_transport_only_for_webrtc_direct() {
        let tcp_only = Version {
            implementation: Implementation::Https,
            id: "v0.1",
            transport_stacks: &[TransportStack::Tcp, TransportStack::QuicV1],
        };
        assert_eq!(tcp_only.discovery_transport(), None);

        let webrtc = Version {
            implementation: Implementation::JsLibp2p,
            id: "webrtc",
            transport_stacks: &[TransportStack::WebrtcDirect],
        };
        assert_eq!(
            webrtc.discovery_transport(),
            Some(TransportStack::WebrtcDirect)
        );
        assert!(webrtc.supports(TransportStack::WebrtcDirect));
        assert!(!webrtc.supports(TransportStack::Tcp));
    }

    #[test]
    fn test_identifiers_match_serde_names() {
        for implementation in Implementation::ALL {
            let json = serde_json::to_string(&implementation).unwrap();
            assert_eq!(json, format!("\"{}\"", implementation.as_str()));
        }
        let json = serde_json::to_string(&TransportStack::QuicV1).unwrap();
        assert_eq!(json, "\"quic-v1\"");
        assert_eq!(TransportStack::WebrtcDirect.to_string(), "webrtc-direct");
    }
}
