//! Result types returned by [`NetworkManager`](crate::NetworkManager).

use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use serde::Serialize;

use crate::parse::{InterfaceAddress, Route};

fn millis(duration: Duration) -> f64 {
    duration.as_secs_f64() * 1000.0
}

/// Outcome of one connectivity check.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CheckResult {
    /// Check name, e.g. `DNS Resolution`.
    pub name: String,
    /// Whether the check passed.
    pub passed: bool,
    /// What was found, or why it failed.
    pub detail: String,
    /// Time spent on the check in milliseconds.
    pub elapsed_ms: f64,
}

impl CheckResult {
    pub(crate) fn new(name: &str, outcome: Result<String, String>, elapsed: Duration) -> Self {
        let (passed, detail) = match outcome {
            Ok(detail) => (true, detail),
            Err(detail) => (false, detail),
        };
        Self {
            name: name.to_string(),
            passed,
            detail,
            elapsed_ms: millis(elapsed),
        }
    }
}

/// A host probed by the latency test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LatencyTarget {
    /// Human label, e.g. `Cloudflare DNS (1.1.1.1)`.
    pub label: String,
    /// Address dialled.
    pub address: SocketAddr,
}

impl LatencyTarget {
    /// Creates a target.
    #[must_use]
    pub fn new(label: impl Into<String>, address: SocketAddr) -> Self {
        Self {
            label: label.into(),
            address,
        }
    }
}

/// Round-trip time to one target.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LatencyResult {
    /// Target label.
    pub label: String,
    /// Address dialled.
    pub address: SocketAddr,
    /// TCP handshake time in milliseconds, `None` if unreachable.
    pub latency_ms: Option<f64>,
    /// Why the probe failed.
    pub error: Option<String>,
}

impl LatencyResult {
    pub(crate) fn new(target: &LatencyTarget, outcome: Result<Duration, String>) -> Self {
        let (latency_ms, error) = match outcome {
            Ok(elapsed) => (Some(millis(elapsed)), None),
            Err(e) => (None, Some(e)),
        };
        Self {
            label: target.label.clone(),
            address: target.address,
            latency_ms,
            error,
        }
    }
}

/// Resolution of one domain.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DnsResult {
    /// Name looked up.
    pub domain: String,
    /// Addresses returned.
    pub addresses: Vec<IpAddr>,
    /// Why the lookup failed.
    pub error: Option<String>,
    /// Lookup time in milliseconds.
    pub elapsed_ms: f64,
}

impl DnsResult {
    pub(crate) fn new(domain: &str, outcome: Result<Vec<IpAddr>, String>, elapsed: Duration) -> Self {
        let (addresses, error) = match outcome {
            Ok(addresses) => (addresses, None),
            Err(e) => (Vec::new(), Some(e)),
        };
        Self {
            domain: domain.to_string(),
            addresses,
            error,
            elapsed_ms: millis(elapsed),
        }
    }

    /// Whether the name resolved.
    #[must_use]
    pub fn resolved(&self) -> bool {
        self.error.is_none()
    }
}

/// Resolver configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DnsInfo {
    /// Servers listed in `resolv.conf`.
    pub nameservers: Vec<String>,
    /// Servers DARP configures for the tunnel.
    pub configured: Vec<String>,
}

/// Interface, routing and DNS state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NetworkInfo {
    /// The tunnel interface.
    pub interface: InterfaceAddress,
    /// Routing table.
    pub routes: Vec<Route>,
    /// Resolver configuration.
    pub dns: DnsInfo,
}

/// A kernel parameter `darp optimize` sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SysctlSetting {
    /// Parameter name.
    pub key: &'static str,
    /// Value written.
    pub value: &'static str,
}

/// Outcome of writing one kernel parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SysctlOutcome {
    /// Parameter name.
    pub key: String,
    /// Value written.
    pub value: String,
    /// Whether `sysctl -w` succeeded.
    pub applied: bool,
    /// Why it failed.
    pub error: Option<String>,
}

/// What the firewall check found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FirewallStatus {
    /// The `iptables` service is not active.
    Inactive,
    /// The service is active and the INPUT chain has no DROP or REJECT rules.
    Open,
}
