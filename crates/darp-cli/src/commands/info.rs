//! `darp info` and `darp firewall`.

use std::io::Write;

use darp_config::Config;
use darp_network::{FirewallStatus, NetworkManager};
use darp_validation::{CommandRunner, SystemRunner};

use crate::error::CliError;
use crate::output::{Message, OutputFormat};

/// Info command executor.
pub struct InfoCommand<R = SystemRunner> {
    network: NetworkManager<R>,
}

impl InfoCommand<SystemRunner> {
    /// Create an info command that inspects the host.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self::new(NetworkManager::from_config(config))
    }
}

impl<R: CommandRunner> InfoCommand<R> {
    /// Create an info command over an existing network manager.
    #[must_use]
    pub fn new(network: NetworkManager<R>) -> Self {
        Self { network }
    }

    /// Print interface, routing and DNS information.
    ///
    /// # Errors
    ///
    /// Returns an error if `ip` fails, e.g. because the tunnel is down.
    pub async fn execute<W: Write>(&self, writer: &mut W, format: &OutputFormat) -> Result<(), CliError> {
        let info = self.network.network_info().await?;
        format.write(writer, &info)
    }
}

/// Firewall command executor.
pub struct FirewallCommand<R = SystemRunner> {
    network: NetworkManager<R>,
}

impl FirewallCommand<SystemRunner> {
    /// Create a firewall command that inspects the host.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self::new(NetworkManager::from_config(config))
    }
}

impl<R: CommandRunner> FirewallCommand<R> {
    /// Create a firewall command over an existing network manager.
    #[must_use]
    pub fn new(network: NetworkManager<R>) -> Self {
        Self { network }
    }

    /// Report whether the firewall lets traffic through.
    ///
    /// # Errors
    ///
    /// Returns an error if the INPUT chain blocks traffic or `iptables`
    /// cannot be read.
    pub async fn execute<W: Write>(&self, writer: &mut W, format: &OutputFormat) -> Result<(), CliError> {
        let message = match self.network.check_firewall().await? {
            FirewallStatus::Inactive => Message::success("iptables service is not active"),
            FirewallStatus::Open => Message::success("iptables INPUT chain has no blocking rules"),
        };
        format.write(writer, &message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::Format;
    use crate::commands::testing::output;
    use darp_validation::ScriptedRunner;

    fn manager(runner: ScriptedRunner, resolv: &std::path::Path) -> NetworkManager<ScriptedRunner> {
        NetworkManager::default()
            .with_runner(runner)
            .with_sudo(false)
            .with_resolv_conf(resolv)
    }

    #[tokio::test]
    async fn info_json() {
        let dir = tempfile::tempdir().unwrap();
        let resolv = dir.path().join("resolv.conf");
        std::fs::write(&resolv, "# generated\nnameserver 127.0.0.53\n").unwrap();

        let runner = ScriptedRunner::new();
        runner
            .respond_ok(
                "ip addr show warp0",
                "5: warp0: <POINTOPOINT,UP> mtu 1280 qdisc noqueue state UNKNOWN\n    inet 172.16.0.2/32 scope global warp0\n",
            )
            .await;
        runner
            .respond_ok("ip route show", "default dev warp0 scope link\n192.168.1.0/24 dev eth0 proto kernel scope link src 192.168.1.10\n")
            .await;

        let mut buf = Vec::new();
        InfoCommand::new(manager(runner, &resolv))
            .execute(&mut buf, &OutputFormat::new(Format::Json))
            .await
            .unwrap();

        let value: serde_json::Value = serde_json::from_str(&output(buf)).unwrap();
        assert_eq!(value["interface"]["ipv4"], "172.16.0.2");
        assert_eq!(value["routes"][0]["destination"], "default");
        assert_eq!(value["dns"]["nameservers"][0], "127.0.0.53");
        assert_eq!(value["dns"]["configured"][0], "1.1.1.1");
    }

    #[tokio::test]
    async fn info_fails_when_interface_missing() {
        let dir = tempfile::tempdir().unwrap();
        let runner = ScriptedRunner::new();
        runner
            .respond_failure("ip addr show warp0", 1, "Device \"warp0\" does not exist.")
            .await;

        let err = InfoCommand::new(manager(runner, &dir.path().join("resolv.conf")))
            .execute(&mut Vec::new(), &OutputFormat::default())
            .await
            .unwrap_err();
        assert!(matches!(err, CliError::Network(_)));
    }

    #[tokio::test]
    async fn firewall_inactive() {
        let runner = ScriptedRunner::new();
        runner.respond_failure("systemctl is-active iptables", 3, "").await;

        let mut buf = Vec::new();
        FirewallCommand::new(manager(runner, std::path::Path::new("/nonexistent")))
            .execute(&mut buf, &OutputFormat::default())
            .await
            .unwrap();
        assert_eq!(output(buf), "✓ iptables service is not active\n");
    }

    #[tokio::test]
    async fn firewall_blocking() {
        let runner = ScriptedRunner::new();
        runner.respond_ok("systemctl is-active iptables", "active\n").await;
        runner
            .respond_ok(
                "iptables -L INPUT -n",
                "Chain INPUT (policy ACCEPT)\ntarget     prot opt source     destination\nDROP       all  --  0.0.0.0/0  0.0.0.0/0\n",
            )
            .await;

        let err = FirewallCommand::new(manager(runner, std::path::Path::new("/nonexistent")))
            .execute(&mut Vec::new(), &OutputFormat::default())
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "network error: firewall may be blocking connections");
    }
}
