//! Network diagnostics for DARP.
//!
//! [`NetworkManager`] answers the questions `darp test`, `darp info`,
//! `darp firewall` and `darp optimize` ask: can we resolve and reach the
//! internet, how fast are the public resolvers, what does the routing table
//! look like, and is a firewall in the way. It shells out to `ip`,
//! `systemctl`, `iptables` and `sysctl` through a
//! [`CommandRunner`](darp_validation::CommandRunner).

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
mod manager;
mod parse;
mod probe;
mod report;

pub use error::{NetworkError, Result};
pub use manager::{
    CONNECTIVITY_HOST, CONNECTIVITY_TARGET, DNS_TEST_DOMAINS, NetworkManager, OPTIMIZATIONS,
    PROBE_TIMEOUT, RESOLV_CONF, default_latency_targets,
};
pub use parse::{InterfaceAddress, Route, parse_ip_addr, parse_ip_route, parse_resolv_conf};
pub use probe::{resolve, tcp_probe};
pub use report::{
    CheckResult, DnsInfo, DnsResult, FirewallStatus, LatencyResult, LatencyTarget, NetworkInfo,
    SysctlOutcome, SysctlSetting,
};
