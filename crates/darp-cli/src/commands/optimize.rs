//! `darp optimize`: kernel network tuning.

use std::io::Write;

use darp_config::Config;
use darp_network::NetworkManager;
use darp_validation::{CommandRunner, SystemRunner};
use tracing::warn;

use crate::error::CliError;
use crate::output::{OptimizeReport, OutputFormat};

/// Optimize command executor.
pub struct OptimizeCommand<R = SystemRunner> {
    network: NetworkManager<R>,
}

impl OptimizeCommand<SystemRunner> {
    /// Create an optimize command that runs `sysctl` on the host.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self::new(NetworkManager::from_config(config))
    }
}

impl<R: CommandRunner> OptimizeCommand<R> {
    /// Create an optimize command over an existing network manager.
    #[must_use]
    pub fn new(network: NetworkManager<R>) -> Self {
        Self { network }
    }

    /// Execute the optimize command.
    ///
    /// Settings that fail are reported individually; the command itself
    /// only fails if output fails.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    pub async fn execute<W: Write>(&self, writer: &mut W, format: &OutputFormat) -> Result<(), CliError> {
        format.progress(writer, "⚡ Optimizing network settings...")?;
        let report = OptimizeReport {
            settings: self.network.optimize().await,
        };

        let failed = report.settings.iter().filter(|s| !s.applied).count();
        if failed > 0 {
            warn!(failed, "some kernel settings were not applied");
        }
        format.write(writer, &report)
    }
}
