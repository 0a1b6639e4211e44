//! `darp config` subcommands.

use std::io::Write;
use std::path::PathBuf;

use darp_config::Config;
use tracing::info;

use crate::cli::ConfigCommands;
use crate::error::CliError;
use crate::output::{ConfigEntry, Message, OutputFormat, write_json};

/// Config command executor.
pub struct ConfigCommand {
    config: Config,
    path: Option<PathBuf>,
}

impl ConfigCommand {
    /// Create a config command over loaded settings and the file they came from.
    #[must_use]
    pub fn new(config: Config, path: Option<PathBuf>) -> Self {
        Self { config, path }
    }

    /// Execute a config subcommand.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown, the value is invalid, or the
    /// file cannot be written.
    pub fn execute<W: Write>(
        &self,
        writer: &mut W,
        format: &OutputFormat,
        command: &ConfigCommands,
    ) -> Result<(), CliError> {
        match command {
            ConfigCommands::Show => write_json(writer, &self.config),
            ConfigCommands::Get { key } => {
                let entry = ConfigEntry {
                    key: key.clone(),
                    value: self.config.get(key)?,
                };
                format.write(writer, &entry)
            }
            ConfigCommands::Set { key, value } => self.set(writer, format, key, value),
            ConfigCommands::Path => {
                let path = self.require_path()?;
                format.write(writer, &Message::info(path.display().to_string()))
            }
        }
    }

    fn require_path(&self) -> Result<&PathBuf, CliError> {
        self.path.as_ref().ok_or_else(|| {
            CliError::Config("no configuration file path; pass --config".into())
        })
    }

    fn set<W: Write>(
        &self,
        writer: &mut W,
        format: &OutputFormat,
        key: &str,
        value: &str,
    ) -> Result<(), CliError> {
        let path = self.require_path()?;

        let mut updated = self.config.clone();
        updated.set(key, value)?;
        updated.validate()?;

        format.progress(writer, &format!("Setting {key} = {value}"))?;
        updated.save(path)?;
        info!(key, value, path = %path.display(), "configuration updated");

        format.write(writer, &Message::success("Configuration updated successfully"))
    }
}
