//! `darp connect` and `darp disconnect`.

use std::io::Write;
use std::time::Duration;

use darp_config::Config;
use darp_validation::{CommandRunner, SystemRunner};
use darp_wireguard::{TunnelManager, TunnelSettings, WarpProfile};
use tracing::info;

use crate::error::CliError;
use crate::output::{Message, OutputFormat};

/// Connect command executor.
pub struct ConnectCommand<R = SystemRunner> {
    config: Config,
    tunnel: TunnelManager<R>,
}

impl ConnectCommand<SystemRunner> {
    /// Create a connect command that runs `wg-quick` on the host.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured interface name is invalid.
    pub fn from_config(config: &Config) -> Result<Self, CliError> {
        Self::with_runner(config, SystemRunner)
    }
}

impl<R: CommandRunner> ConnectCommand<R> {
    /// Create a connect command with a custom command runner.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured interface name is invalid.
    pub fn with_runner(config: &Config, runner: R) -> Result<Self, CliError> {
        let tunnel = TunnelManager::with_runner(TunnelSettings::from_config(config), runner)?;
        Ok(Self {
            config: config.clone(),
            tunnel,
        })
    }

    /// Execute the connect command.
    ///
    /// The whole operation is bounded by `network.timeout`.
    ///
    /// # Errors
    ///
    /// Returns an error if the profile cannot be built, the tunnel cannot be
    /// brought up, or the deadline passes.
    pub async fn execute<W: Write>(&self, writer: &mut W, format: &OutputFormat) -> Result<(), CliError> {
        format.progress(writer, "🔗 Connecting to Cloudflare WARP...")?;

        let profile = WarpProfile::generate(&self.config)?;
        let deadline = Duration::from_secs(self.config.network.timeout);
        tokio::time::timeout(deadline, self.tunnel.connect(&profile))
            .await
            .map_err(|_| {
                CliError::Tunnel(format!(
                    "connecting timed out after {}s",
                    deadline.as_secs()
                ))
            })??;

        info!(interface = %self.tunnel.settings().interface, "connected");
        format.write(writer, &Message::success("Successfully connected to Cloudflare WARP"))
    }
}

/// Disconnect command executor.
pub struct DisconnectCommand<R = SystemRunner> {
    tunnel: TunnelManager<R>,
}

impl DisconnectCommand<SystemRunner> {
    /// Create a disconnect command that runs `wg-quick` on the host.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured interface name is invalid.
    pub fn from_config(config: &Config) -> Result<Self, CliError> {
        Self::with_runner(config, SystemRunner)
    }
}

impl<R: CommandRunner> DisconnectCommand<R> {
    /// Create a disconnect command with a custom command runner.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured interface name is invalid.
    pub fn with_runner(config: &Config, runner: R) -> Result<Self, CliError> {
        let tunnel = TunnelManager::with_runner(TunnelSettings::from_config(config), runner)?;
        Ok(Self { tunnel })
    }

    /// Execute the disconnect command.
    ///
    /// # Errors
    ///
    /// Returns an error if the interface state cannot be read.
    pub async fn execute<W: Write>(&self, writer: &mut W, format: &OutputFormat) -> Result<(), CliError> {
        format.progress(writer, "🔌 Disconnecting from Cloudflare WARP...")?;

        let message = if self.tunnel.disconnect().await? {
            Message::success("Successfully disconnected from Cloudflare WARP")
        } else {
            Message::info(format!(
                "Not connected ({} is down)",
                self.tunnel.settings().interface
            ))
        };
        format.write(writer, &message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::Format;
    use crate::commands::testing::{config, output};
    use darp_validation::{AllowedProgram, ScriptedRunner};

    #[tokio::test]
    async fn connect_writes_config_and_runs_wg_quick() {
        let dir = tempfile::tempdir().unwrap();
        let config = config(dir.path());
        let runner = ScriptedRunner::new();
        runner.respond_failure("ip link show warp0", 1, "").await;
        runner.respond_ok("wg-quick up warp0", "").await;

        let cmd = ConnectCommand::with_runner(&config, runner.clone()).unwrap();
        let mut buf = Vec::new();
        cmd.execute(&mut buf, &OutputFormat::default()).await.unwrap();

        let out = output(buf);
        assert!(out.contains("Connecting to Cloudflare WARP"));
        assert!(out.contains("✓ Successfully connected"));
        assert!(dir.path().join("wireguard/warp0.conf").exists());
        assert_eq!(runner.calls().await, vec!["ip link show warp0", "wg-quick up warp0"]);
    }

    #[tokio::test]
    async fn connect_json_has_no_progress_line() {
        let dir = tempfile::tempdir().unwrap();
        let runner = ScriptedRunner::new();
        runner.respond_failure("ip link show warp0", 1, "").await;
        runner.respond_ok("wg-quick up warp0", "").await;

        let cmd = ConnectCommand::with_runner(&config(dir.path()), runner).unwrap();
        let mut buf = Vec::new();
        cmd.execute(&mut buf, &OutputFormat::new(Format::Json)).await.unwrap();

        let value: serde_json::Value = serde_json::from_str(&output(buf)).unwrap();
        assert_eq!(value["success"], true);
    }

    #[tokio::test]
    async fn connect_without_wireguard_fails() {
        let dir = tempfile::tempdir().unwrap();
        let runner = ScriptedRunner::new();
        runner.set_missing(AllowedProgram::Wg).await;

        let cmd = ConnectCommand::with_runner(&config(dir.path()), runner).unwrap();
        let err = cmd.execute(&mut Vec::new(), &OutputFormat::default()).await.unwrap_err();
        assert!(matches!(err, CliError::Tunnel(ref msg) if msg.contains("wireguard-tools")));
    }

    #[tokio::test]
    async fn connect_rejects_bad_dns_entry() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = config(dir.path());
        config.network.dns = vec!["one.one.one.one".into()];

        let cmd = ConnectCommand::with_runner(&config, ScriptedRunner::new()).unwrap();
        let err = cmd.execute(&mut Vec::new(), &OutputFormat::default()).await.unwrap_err();
        assert!(matches!(err, CliError::Tunnel(_)));
    }

    #[test]
    fn invalid_interface_is_rejected_up_front() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = config(dir.path());
        config.network.interface = "a-name-that-is-far-too-long".into();
        assert!(DisconnectCommand::with_runner(&config, ScriptedRunner::new()).is_err());
    }

    #[tokio::test]
    async fn disconnect_when_down() {
        let dir = tempfile::tempdir().unwrap();
        let runner = ScriptedRunner::new();
        runner.respond_failure("ip link show warp0", 1, "").await;

        let cmd = DisconnectCommand::with_runner(&config(dir.path()), runner.clone()).unwrap();
        let mut buf = Vec::new();
        cmd.execute(&mut buf, &OutputFormat::default()).await.unwrap();

        assert!(output(buf).contains("Not connected (warp0 is down)"));
        assert_eq!(runner.calls().await, vec!["ip link show warp0"]);
    }

    #[tokio::test]
    async fn disconnect_when_up() {
        let dir = tempfile::tempdir().unwrap();
        let runner = ScriptedRunner::new();
        runner.respond_ok("ip link show warp0", "5: warp0: <POINTOPOINT,UP>").await;
        runner.respond_ok("wg-quick down warp0", "").await;

        let cmd = DisconnectCommand::with_runner(&config(dir.path()), runner).unwrap();
        let mut buf = Vec::new();
        cmd.execute(&mut buf, &OutputFormat::default()).await.unwrap();

        assert!(output(buf).contains("✓ Successfully disconnected"));
    }
}
