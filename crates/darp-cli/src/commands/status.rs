//! Tunnel status command implementation.
//!
//! Shows:
//! - Whether the WARP interface is up
//! - Its IPv4 address, endpoint and last handshake
//! - Traffic counters and configured DNS servers

use std::io::Write;

use darp_config::Config;
use darp_network::NetworkManager;
use darp_validation::{CommandRunner, SystemRunner};
use darp_wireguard::{TunnelManager, TunnelSettings};
use tracing::debug;

use crate::error::CliError;
use crate::output::{OutputFormat, StatusReport};

/// Status command executor.
pub struct StatusCommand<R = SystemRunner> {
    tunnel: TunnelManager<R>,
    network: NetworkManager<R>,
    dns_servers: Vec<String>,
}

impl StatusCommand<SystemRunner> {
    /// Create a status command that inspects the host.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured interface name is invalid.
    pub fn from_config(config: &Config) -> Result<Self, CliError> {
        Self::with_runner(config, SystemRunner)
    }
}

impl<R: CommandRunner + Clone> StatusCommand<R> {
    /// Create a status command with a custom command runner.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured interface name is invalid.
    pub fn with_runner(config: &Config, runner: R) -> Result<Self, CliError> {
        Ok(Self {
            tunnel: TunnelManager::with_runner(TunnelSettings::from_config(config), runner.clone())?,
            network: NetworkManager::from_config(config).with_runner(runner),
            dns_servers: config.network.dns.clone(),
        })
    }
}

impl<R: CommandRunner> StatusCommand<R> {
    /// Execute the status command.
    ///
    /// # Errors
    ///
    /// Returns an error if the tunnel state cannot be read or output fails.
    pub async fn execute<W: Write>(&self, writer: &mut W, format: &OutputFormat) -> Result<(), CliError> {
        let report = self.fetch_status().await?;
        format.write(writer, &report)
    }

    /// Collect the tunnel status.
    ///
    /// # Errors
    ///
    /// Returns an error if the interface is up but `wg show` fails.
    pub async fn fetch_status(&self) -> Result<StatusReport, CliError> {
        let tunnel = self.tunnel.status().await?;

        let ip_address = if tunnel.connected {
            match self.network.interface_info().await {
                Ok(info) => info.ipv4.map(|ip| ip.to_string()),
                Err(e) => {
                    debug!(error = %e, "could not read interface address");
                    None
                }
            }
        } else {
            None
        };

        Ok(StatusReport {
            connected: tunnel.connected,
            interface: tunnel.interface,
            ip_address,
            dns_servers: self.dns_servers.clone(),
            public_key: tunnel.public_key,
            endpoint: tunnel.endpoint,
            latest_handshake: tunnel.latest_handshake,
            bytes_sent: tunnel.tx_bytes,
            bytes_received: tunnel.rx_bytes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::testing::{config, output};
    use darp_validation::ScriptedRunner;

    const WG_SHOW: &str = "interface: warp0\n\
        \x20 public key: bmXOC+F1FxEMF9dyiK2H5/1SUtzH0JuVo51h2wPfgyo=\n\
        \x20 listening port: 51820\n\
        \n\
        peer: bmXOC+F1FxEMF9dyiK2H5/1SUtzH0JuVo51h2wPfgyo=\n\
        \x20 endpoint: 162.159.192.1:2408\n\
        \x20 allowed ips: 0.0.0.0/0, ::/0\n\
        \x20 latest handshake: 12 seconds ago\n\
        \x20 transfer: 2.00 KiB received, 1.00 KiB sent\n";

    const IP_ADDR: &str = "5: warp0: <POINTOPOINT,NOARP,UP,LOWER_UP> mtu 1280 qdisc noqueue state UNKNOWN group default qlen 1000\n\
        \x20   link/none\n\
        \x20   inet 172.16.0.2/32 scope global warp0\n\
        \x20      valid_lft forever preferred_lft forever\n";

    #[tokio::test]
    async fn status_disconnected() {
        let dir = tempfile::tempdir().unwrap();
        let runner = ScriptedRunner::new();
        runner.respond_failure("ip link show warp0", 1, "").await;

        let cmd = StatusCommand::with_runner(&config(dir.path()), runner).unwrap();
        let report = cmd.fetch_status().await.unwrap();

        assert!(!report.connected);
        assert_eq!(report.ip_address, None);
        assert_eq!(report.dns_servers, ["1.1.1.1", "1.0.0.1"]);
    }

    #[tokio::test]
    async fn status_connected() {
        let dir = tempfile::tempdir().unwrap();
        let runner = ScriptedRunner::new();
        runner.respond_ok("ip link show warp0", "5: warp0: <POINTOPOINT,UP>").await;
        runner.respond_ok("wg show warp0", WG_SHOW).await;
        runner.respond_ok("ip addr show warp0", IP_ADDR).await;

        let cmd = StatusCommand::with_runner(&config(dir.path()), runner).unwrap();
        let mut buf = Vec::new();
        cmd.execute(&mut buf, &OutputFormat::default()).await.unwrap();

        let out = output(buf);
        assert!(out.contains("✅ Connected"));
        assert!(out.contains("IP Address: 172.16.0.2"));
        assert!(out.contains("Endpoint: 162.159.192.1:2408"));
        assert!(out.contains("Data Sent: 1.0 KiB"));
        assert!(out.contains("Data Received: 2.0 KiB"));
    }

    #[tokio::test]
    async fn missing_address_is_not_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let runner = ScriptedRunner::new();
        runner.respond_ok("ip link show warp0", "5: warp0: <POINTOPOINT,UP>").await;
        runner.respond_ok("wg show warp0", WG_SHOW).await;

        let cmd = StatusCommand::with_runner(&config(dir.path()), runner).unwrap();
        let report = cmd.fetch_status().await.unwrap();
        assert!(report.connected);
        assert_eq!(report.ip_address, None);
    }
}
