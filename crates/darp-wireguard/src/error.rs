//! Error types for WireGuard operations.

use darp_validation::CommandError;
use thiserror::Error;

/// Package that provides `wg` and `wg-quick`.
pub const INSTALL_HINT: &str = "sudo pacman -S wireguard-tools";

/// Errors that can occur during WireGuard operations.
#[derive(Debug, Error)]
pub enum WireGuardError {
    /// Invalid key format.
    #[error("invalid key: {0}")]
    InvalidKey(String),

    /// Invalid base64 encoding.
    #[error("invalid base64 encoding: {0}")]
    InvalidBase64(String),

    /// Invalid key length.
    #[error("invalid key length: expected 32, got {0}")]
    InvalidKeyLength(usize),

    /// Invalid CIDR notation.
    #[error("invalid CIDR: {0}")]
    InvalidCidr(String),

    /// Invalid endpoint.
    #[error("invalid endpoint: {0}")]
    InvalidEndpoint(String),

    /// Invalid interface or peer configuration.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// A config file line could not be parsed.
    #[error("parse error at line {line}: {message}")]
    ParseError {
        /// 1-based line number, or 0 for whole-file problems.
        line: usize,
        /// What was wrong.
        message: String,
    },

    /// `wg` or `wg-quick` is missing.
    #[error("{0} not found, install it with: {INSTALL_HINT}")]
    NotInstalled(String),

    /// The tunnel interface already exists.
    #[error("interface {0} is already up")]
    AlreadyConnected(String),

    /// An external command failed.
    #[error(transparent)]
    Command(#[from] CommandError),

    /// Filesystem error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl WireGuardError {
    /// Create a parse error.
    #[must_use]
    pub fn parse(line: usize, message: impl Into<String>) -> Self {
        Self::ParseError {
            line,
            message: message.into(),
        }
    }

    /// Create an invalid configuration error.
    #[must_use]
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig(message.into())
    }

    /// Check if the error is a missing WireGuard installation.
    #[must_use]
    pub fn is_not_installed(&self) -> bool {
        matches!(self, Self::NotInstalled(_))
    }
}

impl From<base64::DecodeError> for WireGuardError {
    fn from(err: base64::DecodeError) -> Self {
        Self::InvalidBase64(err.to_string())
    }
}

/// Result type for WireGuard operations.
pub type Result<T> = std::result::Result<T, WireGuardError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_installed_display_has_hint() {
        let err = WireGuardError::NotInstalled("wg-quick".into());
        assert_eq!(
            err.to_string(),
            "wg-quick not found, install it with: sudo pacman -S wireguard-tools"
        );
        assert!(err.is_not_installed());
    }

    #[test]
    fn parse_error_display() {
        let err = WireGuardError::parse(3, "invalid MTU");
        assert_eq!(err.to_string(), "parse error at line 3: invalid MTU");
    }

    #[test]
    fn command_error_is_transparent() {
        let err = WireGuardError::from(CommandError::non_zero_exit("wg-quick up warp0", 1, "boom"));
        assert_eq!(err.to_string(), "command 'wg-quick up warp0' exited with code 1: boom");
    }
}
