//! Network diagnostics and tuning.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use darp_config::{Config, DEFAULT_DNS, DEFAULT_WARP_ENDPOINT};
use darp_validation::{AllowedProgram, CommandRunner, SafeCommand, SystemRunner, running_as_root};
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::error::{NetworkError, Result};
use crate::parse::{InterfaceAddress, Route, parse_ip_addr, parse_ip_route, parse_resolv_conf};
use crate::probe::{resolve, tcp_probe};
use crate::report::{
    CheckResult, DnsInfo, DnsResult, FirewallStatus, LatencyResult, LatencyTarget, NetworkInfo,
    SysctlOutcome, SysctlSetting,
};

/// Time allowed for each DNS lookup or TCP connect.
pub const PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// Name resolved by the connectivity check.
pub const CONNECTIVITY_HOST: &str = "cloudflare.com";

/// Address dialled by the connectivity check.
pub const CONNECTIVITY_TARGET: SocketAddr =
    SocketAddr::new(IpAddr::V4(Ipv4Addr::new(1, 1, 1, 1)), 80);

/// Domains resolved by `darp test dns`.
pub const DNS_TEST_DOMAINS: [&str; 4] = ["cloudflare.com", "google.com", "github.com", "archlinux.org"];

/// Default resolver config path.
pub const RESOLV_CONF: &str = "/etc/resolv.conf";

/// Kernel parameters applied by `darp optimize`.
pub const OPTIMIZATIONS: [SysctlSetting; 4] = [
    SysctlSetting { key: "net.core.default_qdisc", value: "fq" },
    SysctlSetting { key: "net.ipv4.tcp_congestion_control", value: "bbr" },
    SysctlSetting { key: "net.core.rmem_max", value: "134217728" },
    SysctlSetting { key: "net.core.wmem_max", value: "134217728" },
];

/// Public resolvers probed by the latency test.
#[must_use]
pub fn default_latency_targets() -> Vec<LatencyTarget> {
    [
        ("Cloudflare DNS", [1, 1, 1, 1]),
        ("Cloudflare DNS", [1, 0, 0, 1]),
        ("Google DNS", [8, 8, 8, 8]),
        ("Google DNS", [8, 8, 4, 4]),
    ]
    .into_iter()
    .map(|(name, octets)| {
        let ip = Ipv4Addr::from(octets);
        LatencyTarget::new(format!("{name} ({ip})"), SocketAddr::new(IpAddr::V4(ip), 80))
    })
    .collect()
}

/// Runs diagnostics against the host's network stack.
#[derive(Debug, Clone)]
pub struct NetworkManager<R = SystemRunner> {
    interface: String,
    dns_servers: Vec<String>,
    warp_endpoint: String,
    use_sudo: bool,
    timeout: Duration,
    resolv_conf: PathBuf,
    probe_host: String,
    probe_target: SocketAddr,
    latency_targets: Vec<LatencyTarget>,
    runner: R,
}

impl NetworkManager<SystemRunner> {
    /// Creates a manager for `interface` with the DNS servers DARP configures.
    #[must_use]
    pub fn new(interface: impl Into<String>, dns_servers: Vec<String>) -> Self {
        Self {
            interface: interface.into(),
            dns_servers,
            warp_endpoint: DEFAULT_WARP_ENDPOINT.to_string(),
            use_sudo: false,
            timeout: PROBE_TIMEOUT,
            resolv_conf: PathBuf::from(RESOLV_CONF),
            probe_host: CONNECTIVITY_HOST.to_string(),
            probe_target: CONNECTIVITY_TARGET,
            latency_targets: default_latency_targets(),
            runner: SystemRunner,
        }
    }

    /// Creates a manager from DARP's config.
    ///
    /// `sudo` is skipped when the process already runs as root.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.network.interface.clone(), config.network.dns.clone())
            .with_warp_endpoint(config.cloudflare.warp_endpoint.clone())
            .with_sudo(config.wireguard.use_sudo && !running_as_root())
    }
}

impl Default for NetworkManager<SystemRunner> {
    fn default() -> Self {
        Self::new(
            darp_config::DEFAULT_INTERFACE,
            DEFAULT_DNS.iter().map(ToString::to_string).collect(),
        )
    }
}

impl<R: CommandRunner> NetworkManager<R> {
    /// Replaces the command runner.
    pub fn with_runner<T: CommandRunner>(self, runner: T) -> NetworkManager<T> {
        NetworkManager {
            interface: self.interface,
            dns_servers: self.dns_servers,
            warp_endpoint: self.warp_endpoint,
            use_sudo: self.use_sudo,
            timeout: self.timeout,
            resolv_conf: self.resolv_conf,
            probe_host: self.probe_host,
            probe_target: self.probe_target,
            latency_targets: self.latency_targets,
            runner,
        }
    }

    /// Sets the WARP endpoint checked by the connectivity tests.
    #[must_use]
    pub fn with_warp_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.warp_endpoint = endpoint.into();
        self
    }

    /// Runs privileged commands through `sudo`.
    #[must_use]
    pub fn with_sudo(mut self, use_sudo: bool) -> Self {
        self.use_sudo = use_sudo;
        self
    }

    /// Sets the per-probe timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Reads resolver config from `path` instead of `/etc/resolv.conf`.
    #[must_use]
    pub fn with_resolv_conf(mut self, path: impl Into<PathBuf>) -> Self {
        self.resolv_conf = path.into();
        self
    }

    /// Changes the host resolved and the address dialled by the
    /// connectivity check.
    #[must_use]
    pub fn with_probe(mut self, host: impl Into<String>, target: SocketAddr) -> Self {
        self.probe_host = host.into();
        self.probe_target = target;
        self
    }

    /// Changes the hosts probed by [`test_latency`](Self::test_latency).
    #[must_use]
    pub fn with_latency_targets(mut self, targets: Vec<LatencyTarget>) -> Self {
        self.latency_targets = targets;
        self
    }

    /// The tunnel interface name.
    #[must_use]
    pub fn interface(&self) -> &str {
        &self.interface
    }

    fn privileged(&self, program: AllowedProgram) -> SafeCommand {
        SafeCommand::new(program).with_sudo(self.use_sudo)
    }

    async fn run_checked(&self, command: SafeCommand) -> Result<String> {
        let description = command.description();
        let output = self.runner.run(command).await?.check(&description)?;
        Ok(output.stdout_lossy())
    }

    /// Resolves `cloudflare.com` and then connects to `1.1.1.1:80`.
    ///
    /// # Errors
    ///
    /// Returns the first failing stage as a DNS, connectivity or timeout error.
    pub async fn check_connectivity(&self) -> Result<()> {
        resolve(&self.probe_host, self.timeout).await?;
        tcp_probe(self.probe_target, self.timeout).await?;
        info!(host = %self.probe_host, target = %self.probe_target, "connectivity ok");
        Ok(())
    }

    /// Runs every connectivity check and reports each result.
    pub async fn run_connectivity_tests(&self) -> Vec<CheckResult> {
        let mut results = Vec::with_capacity(4);

        let started = Instant::now();
        let outcome = resolve(&self.probe_host, self.timeout)
            .await
            .map(|ips| format!("{} resolves to {}", self.probe_host, join_ips(&ips)))
            .map_err(|e| e.to_string());
        results.push(CheckResult::new("DNS Resolution", outcome, started.elapsed()));

        let started = Instant::now();
        let outcome = tcp_probe(self.probe_target, self.timeout)
            .await
            .map(|rtt| format!("{} reachable in {:.1} ms", self.probe_target, rtt.as_secs_f64() * 1000.0))
            .map_err(|e| e.to_string());
        results.push(CheckResult::new("Internet Connectivity", outcome, started.elapsed()));

        let started = Instant::now();
        let outcome = resolve(&self.warp_endpoint, self.timeout)
            .await
            .map(|ips| format!("{} resolves to {}", self.warp_endpoint, join_ips(&ips)))
            .map_err(|e| e.to_string());
        results.push(CheckResult::new("Cloudflare WARP Endpoint", outcome, started.elapsed()));

        let started = Instant::now();
        let outcome = match self.link_up().await {
            Ok(true) => Ok(format!("{} is up", self.interface)),
            Ok(false) => Err(format!("{} is down", self.interface)),
            Err(e) => Err(e.to_string()),
        };
        results.push(CheckResult::new("WireGuard Interface", outcome, started.elapsed()));

        let failed = results.iter().filter(|r| !r.passed).count();
        debug!(total = results.len(), failed, "connectivity tests finished");
        results
    }

    async fn link_up(&self) -> Result<bool> {
        let output = self
            .runner
            .run(SafeCommand::new(AllowedProgram::Ip).args(["link", "show", self.interface.as_str()]))
            .await?;
        Ok(output.success())
    }

    /// Addresses and link state of the tunnel interface.
    ///
    /// # Errors
    ///
    /// Returns an error if `ip addr show` fails, e.g. because the interface
    /// does not exist.
    pub async fn interface_info(&self) -> Result<InterfaceAddress> {
        let stdout = self
            .run_checked(SafeCommand::new(AllowedProgram::Ip).args(["addr", "show", self.interface.as_str()]))
            .await?;
        Ok(parse_ip_addr(&stdout))
    }

    /// The routing table.
    ///
    /// # Errors
    ///
    /// Returns an error if `ip route show` fails.
    pub async fn routes(&self) -> Result<Vec<Route>> {
        let stdout = self
            .run_checked(SafeCommand::new(AllowedProgram::Ip).args(["route", "show"]))
            .await?;
        Ok(parse_ip_route(&stdout))
    }

    /// Nameservers from `resolv.conf` alongside the configured ones.
    ///
    /// # Errors
    ///
    /// Returns an error if `resolv.conf` cannot be read.
    pub async fn dns_info(&self) -> Result<DnsInfo> {
        let contents = tokio::fs::read_to_string(&self.resolv_conf).await?;
        Ok(DnsInfo {
            nameservers: parse_resolv_conf(&contents),
            configured: self.dns_servers.clone(),
        })
    }

    /// Interface, routes and DNS together.
    ///
    /// # Errors
    ///
    /// Returns the first error from the individual lookups.
    pub async fn network_info(&self) -> Result<NetworkInfo> {
        Ok(NetworkInfo {
            interface: self.interface_info().await?,
            routes: self.routes().await?,
            dns: self.dns_info().await?,
        })
    }

    /// TCP handshake time to each latency target, probed one after another.
    ///
    /// Unreachable targets are reported with no latency.
    pub async fn test_latency(&self) -> Vec<LatencyResult> {
        let mut results = Vec::with_capacity(self.latency_targets.len());
        for target in &self.latency_targets {
            let outcome = tcp_probe(target.address, self.timeout)
                .await
                .map_err(|e| e.to_string());
            if let Err(e) = &outcome {
                debug!(target = %target.label, error = %e, "latency probe failed");
            }
            results.push(LatencyResult::new(target, outcome));
        }
        results
    }

    /// Resolves each domain and reports addresses or the error.
    pub async fn test_dns(&self, domains: &[&str]) -> Vec<DnsResult> {
        let mut results = Vec::with_capacity(domains.len());
        for domain in domains {
            let started = Instant::now();
            let outcome = resolve(domain, self.timeout).await.map_err(|e| e.to_string());
            results.push(DnsResult::new(domain, outcome, started.elapsed()));
        }
        results
    }

    /// Looks for DROP or REJECT rules when the `iptables` service is active.
    ///
    /// # Errors
    ///
    /// Returns [`NetworkError::FirewallBlocking`] if the INPUT chain blocks
    /// traffic, or a command error if `iptables` fails.
    pub async fn check_firewall(&self) -> Result<FirewallStatus> {
        let active = match self
            .runner
            .run(SafeCommand::new(AllowedProgram::Systemctl).args(["is-active", "iptables"]))
            .await
        {
            Ok(output) => output.success() && output.stdout_lossy().trim() == "active",
            Err(e) => {
                debug!(error = %e, "systemctl unavailable, assuming no firewall service");
                false
            }
        };

        if !active {
            return Ok(FirewallStatus::Inactive);
        }

        let rules = self
            .run_checked(self.privileged(AllowedProgram::Iptables).args(["-L", "INPUT", "-n"]))
            .await?;
        if rules.contains("DROP") || rules.contains("REJECT") {
            warn!("INPUT chain contains DROP or REJECT rules");
            return Err(NetworkError::FirewallBlocking);
        }
        Ok(FirewallStatus::Open)
    }

    /// Applies the kernel parameters in [`OPTIMIZATIONS`].
    ///
    /// Every setting is attempted; failures are reported, not returned.
    pub async fn optimize(&self) -> Vec<SysctlOutcome> {
        let mut outcomes = Vec::with_capacity(OPTIMIZATIONS.len());
        for setting in OPTIMIZATIONS {
            let assignment = format!("{}={}", setting.key, setting.value);
            let result = self
                .run_checked(self.privileged(AllowedProgram::Sysctl).args(["-w", assignment.as_str()]))
                .await;

            let error = match result {
                Ok(_) => {
                    info!(key = setting.key, value = setting.value, "applied");
                    None
                }
                Err(e) => {
                    warn!(key = setting.key, error = %e, "sysctl failed");
                    Some(e.to_string())
                }
            };
            outcomes.push(SysctlOutcome {
                key: setting.key.to_string(),
                value: setting.value.to_string(),
                applied: error.is_none(),
                error,
            });
        }
        outcomes
    }
}

fn join_ips(ips: &[IpAddr]) -> String {
    ips.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
