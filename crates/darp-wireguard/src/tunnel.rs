//! Tunnel lifecycle through `wg-quick`.
//!
//! [`TunnelManager`] writes `<config_dir>/<interface>.conf` and drives
//! `wg-quick up`/`down`. State is read back from the kernel through `ip link`
//! and `wg show`, so nothing is cached between invocations.

use std::io;
use std::path::{Path, PathBuf};

use darp_config::Config;
use darp_validation::{
    AllowedProgram, CommandRunner, SafeCommand, SystemRunner, running_as_root,
    sanitize_interface_name,
};
use serde::Serialize;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};

use crate::config::InterfaceConfig;
use crate::error::{Result, WireGuardError};
use crate::show::{WgShow, parse_wg_show};

/// Where the tunnel lives and how commands are run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TunnelSettings {
    /// Interface name, also the config file stem.
    pub interface: String,
    /// Directory `wg-quick` reads configs from.
    pub config_dir: PathBuf,
    /// Prefix privileged commands with `sudo`.
    pub use_sudo: bool,
}

impl TunnelSettings {
    /// Derives tunnel settings from DARP's config.
    ///
    /// `sudo` is skipped when the process already runs as root.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self {
            interface: config.network.interface.clone(),
            config_dir: config.wireguard.config_dir.clone(),
            use_sudo: config.wireguard.use_sudo && !running_as_root(),
        }
    }
}

/// Snapshot of the tunnel for `darp status`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TunnelStatus {
    /// Whether the interface exists.
    pub connected: bool,
    /// Interface name.
    pub interface: String,
    /// Local public key.
    pub public_key: Option<String>,
    /// UDP listen port.
    pub listening_port: Option<u16>,
    /// Endpoint of the first peer.
    pub endpoint: Option<String>,
    /// Age of the last handshake with the first peer.
    pub latest_handshake: Option<String>,
    /// Bytes received across all peers.
    pub rx_bytes: u64,
    /// Bytes sent across all peers.
    pub tx_bytes: u64,
}

impl TunnelStatus {
    /// Status of an interface that is down.
    #[must_use]
    pub fn disconnected(interface: impl Into<String>) -> Self {
        Self {
            interface: interface.into(),
            ..Self::default()
        }
    }

    /// Status built from `wg show` output.
    #[must_use]
    pub fn from_show(show: &WgShow) -> Self {
        let first = show.peers.first();
        Self {
            connected: true,
            interface: show.interface.clone(),
            public_key: show.public_key.map(|k| k.to_base64()),
            listening_port: show.listening_port,
            endpoint: first.and_then(|p| p.endpoint.as_ref().map(ToString::to_string)),
            latest_handshake: first.and_then(|p| p.latest_handshake.clone()),
            rx_bytes: show.peers.iter().map(|p| p.rx_bytes).sum(),
            tx_bytes: show.peers.iter().map(|p| p.tx_bytes).sum(),
        }
    }
}

/// Brings the WARP tunnel up and down.
#[derive(Debug, Clone)]
pub struct TunnelManager<R = SystemRunner> {
    settings: TunnelSettings,
    runner: R,
}

impl TunnelManager<SystemRunner> {
    /// Creates a manager that runs commands on the host.
    ///
    /// # Errors
    ///
    /// Returns an error if the interface name is not a valid Linux
    /// interface name.
    pub fn new(settings: TunnelSettings) -> Result<Self> {
        Self::with_runner(settings, SystemRunner)
    }
}

impl<R: CommandRunner> TunnelManager<R> {
    /// Creates a manager with a custom command runner.
    ///
    /// # Errors
    ///
    /// Returns an error if the interface name is not a valid Linux
    /// interface name.
    pub fn with_runner(settings: TunnelSettings, runner: R) -> Result<Self> {
        sanitize_interface_name(&settings.interface)
            .map_err(|e| WireGuardError::invalid_config(e.to_string()))?;
        Ok(Self { settings, runner })
    }

    /// The settings this manager was built with.
    #[must_use]
    pub fn settings(&self) -> &TunnelSettings {
        &self.settings
    }

    /// Path of the generated `wg-quick` config.
    #[must_use]
    pub fn config_path(&self) -> PathBuf {
        self.settings
            .config_dir
            .join(format!("{}.conf", self.settings.interface))
    }

    fn command(&self, program: AllowedProgram) -> SafeCommand {
        SafeCommand::new(program).with_sudo(self.settings.use_sudo)
    }

    /// Checks that `wg` and `wg-quick` are installed.
    ///
    /// # Errors
    ///
    /// Returns [`WireGuardError::NotInstalled`] naming the first missing tool.
    pub async fn check_installation(&self) -> Result<()> {
        for program in [AllowedProgram::Wg, AllowedProgram::WgQuick] {
            if !self.runner.is_installed(program).await {
                return Err(WireGuardError::NotInstalled(program.to_string()));
            }
        }
        Ok(())
    }

    /// Writes the config file readable only by its owner.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory or file cannot be written.
    pub async fn write_config(&self, config: &InterfaceConfig) -> Result<PathBuf> {
        use std::os::unix::fs::PermissionsExt;

        let path = self.config_path();
        let dir = &self.settings.config_dir;

        tokio::fs::DirBuilder::new()
            .recursive(true)
            .mode(0o755)
            .create(dir)
            .await?;

        let mut file = tokio::fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .mode(0o600)
            .open(&path)
            .await?;
        file.write_all(config.render().as_bytes()).await?;
        file.flush().await?;
        tokio::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o600)).await?;

        info!(path = %path.display(), "wrote WireGuard config");
        Ok(path)
    }

    /// Removes the config file. A missing file is not an error.
    ///
    /// # Errors
    ///
    /// Returns any other filesystem error.
    pub async fn remove_config(&self) -> Result<()> {
        remove_if_exists(&self.config_path()).await?;
        Ok(())
    }

    /// Whether the interface currently exists.
    ///
    /// # Errors
    ///
    /// Returns an error if `ip` cannot be run.
    pub async fn is_up(&self) -> Result<bool> {
        let output = self
            .runner
            .run(SafeCommand::new(AllowedProgram::Ip).args(["link", "show", self.settings.interface.as_str()]))
            .await?;
        Ok(output.success())
    }

    /// Writes `config` and brings the interface up.
    ///
    /// # Errors
    ///
    /// Returns an error if WireGuard is missing, the interface is already
    /// up, the config cannot be written, or `wg-quick up` fails.
    pub async fn connect(&self, config: &InterfaceConfig) -> Result<()> {
        let interface = &self.settings.interface;

        self.check_installation().await?;
        if self.is_up().await? {
            return Err(WireGuardError::AlreadyConnected(interface.clone()));
        }

        self.write_config(config).await?;

        let command = self.command(AllowedProgram::WgQuick).args(["up", interface.as_str()]);
        let description = command.description();
        self.runner.run(command).await?.check(&description)?;

        info!(interface = %interface, public_key = %config.public_key(), "tunnel up");
        Ok(())
    }

    /// Brings the interface down and removes its config.
    ///
    /// Returns `false` if the interface was not up. A failing
    /// `wg-quick down` is logged rather than returned so the config is
    /// still cleaned up.
    ///
    /// # Errors
    ///
    /// Returns an error if `ip` cannot be run.
    pub async fn disconnect(&self) -> Result<bool> {
        let interface = &self.settings.interface;

        if !self.is_up().await? {
            info!(interface = %interface, "not connected");
            return Ok(false);
        }

        let command = self.command(AllowedProgram::WgQuick).args(["down", interface.as_str()]);
        let description = command.description();
        match self.runner.run(command).await.and_then(|o| o.check(&description)) {
            Ok(_) => info!(interface = %interface, "tunnel down"),
            Err(e) => warn!(interface = %interface, error = %e, "wg-quick down failed"),
        }

        if let Err(e) = self.remove_config().await {
            warn!(path = %self.config_path().display(), error = %e, "failed to remove config");
        }
        Ok(true)
    }

    /// Reads the live interface state through `wg show`.
    ///
    /// # Errors
    ///
    /// Returns an error if `wg show` fails or prints something unparseable.
    pub async fn interface_info(&self) -> Result<WgShow> {
        let command = self
            .command(AllowedProgram::Wg)
            .args(["show", self.settings.interface.as_str()]);
        let description = command.description();
        let output = self.runner.run(command).await?.check(&description)?;
        parse_wg_show(&output.stdout_lossy())
    }

    /// Current tunnel status.
    ///
    /// # Errors
    ///
    /// Returns an error if the interface is up but cannot be inspected.
    pub async fn status(&self) -> Result<TunnelStatus> {
        if !self.is_up().await? {
            debug!(interface = %self.settings.interface, "interface down");
            return Ok(TunnelStatus::disconnected(&self.settings.interface));
        }
        Ok(TunnelStatus::from_show(&self.interface_info().await?))
    }
}

async fn remove_if_exists(path: &Path) -> io::Result<()> {
    match tokio::fs::remove_file(path).await {
        Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e),
        _ => Ok(()),
    }
}
