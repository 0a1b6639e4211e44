//! CLI error types.

use std::fmt;

use darp_config::ConfigError;
use darp_network::NetworkError;
use darp_wireguard::WireGuardError;

/// CLI-specific errors.
#[derive(Debug)]
pub enum CliError {
    /// Configuration could not be loaded, validated or saved.
    Config(String),
    /// Tunnel setup or teardown failed.
    Tunnel(String),
    /// A network diagnostic failed.
    Network(String),
    /// Command execution failed.
    Command(String),
    /// Output formatting error.
    Format(String),
    /// Invalid argument.
    InvalidArgument(String),
    /// IO error.
    Io(std::io::Error),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(msg) => write!(f, "configuration error: {msg}"),
            Self::Tunnel(msg) => write!(f, "tunnel error: {msg}"),
            Self::Network(msg) => write!(f, "network error: {msg}"),
            Self::Command(msg) => write!(f, "command error: {msg}"),
            Self::Format(msg) => write!(f, "format error: {msg}"),
            Self::InvalidArgument(msg) => write!(f, "invalid argument: {msg}"),
            Self::Io(e) => write!(f, "IO error: {e}"),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::UnknownKey(_) | ConfigError::InvalidValue { .. } => {
                Self::InvalidArgument(err.to_string())
            }
            other => Self::Config(other.to_string()),
        }
    }
}

impl From<WireGuardError> for CliError {
    fn from(err: WireGuardError) -> Self {
        Self::Tunnel(err.to_string())
    }
}

impl From<NetworkError> for CliError {
    fn from(err: NetworkError) -> Self {
        Self::Network(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_error_display_tunnel() {
        let err = CliError::from(WireGuardError::NotInstalled("wg".into()));
        assert_eq!(
            err.to_string(),
            "tunnel error: wg not found, install it with: sudo pacman -S wireguard-tools"
        );
    }

    #[test]
    fn unknown_config_key_is_invalid_argument() {
        let err = CliError::from(ConfigError::UnknownKey("network.nope".into()));
        assert!(matches!(err, CliError::InvalidArgument(_)));

        let err = CliError::from(ConfigError::invalid("MTU out of range"));
        assert!(matches!(err, CliError::Config(_)));
    }

    #[test]
    fn network_error_display() {
        let err = CliError::from(NetworkError::FirewallBlocking);
        assert_eq!(err.to_string(), "network error: firewall may be blocking connections");
    }

    #[test]
    fn cli_error_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let cli_err = CliError::from(io_err);
        assert!(matches!(cli_err, CliError::Io(_)));
    }
}
