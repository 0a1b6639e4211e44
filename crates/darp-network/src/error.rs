//! Error types for network diagnostics.

use std::time::Duration;

use darp_validation::CommandError;
use thiserror::Error;

/// Result type alias for network operations.
pub type Result<T> = std::result::Result<T, NetworkError>;

/// Errors that can occur while probing or tuning the network.
#[derive(Debug, Error)]
pub enum NetworkError {
    /// A hostname did not resolve.
    #[error("DNS resolution failed for {host}: {reason}")]
    DnsResolution {
        /// The name that was looked up.
        host: String,
        /// Why the lookup failed.
        reason: String,
    },

    /// A TCP connection could not be established.
    #[error("cannot connect to {target}: {reason}")]
    Connectivity {
        /// Address that was dialled.
        target: String,
        /// Why the connection failed.
        reason: String,
    },

    /// A probe did not finish in time.
    #[error("{target} timed out after {}s", timeout.as_secs())]
    Timeout {
        /// What was being probed.
        target: String,
        /// The limit that was hit.
        timeout: Duration,
    },

    /// The INPUT chain drops or rejects traffic.
    #[error("firewall may be blocking connections")]
    FirewallBlocking,

    /// An external command failed.
    #[error(transparent)]
    Command(#[from] CommandError),

    /// Filesystem error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl NetworkError {
    /// Create a DNS resolution error.
    #[must_use]
    pub fn dns(host: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::DnsResolution {
            host: host.into(),
            reason: reason.into(),
        }
    }

    /// Create a connectivity error.
    #[must_use]
    pub fn connectivity(target: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Connectivity {
            target: target.into(),
            reason: reason.into(),
        }
    }

    /// Create a timeout error.
    #[must_use]
    pub fn timeout(target: impl Into<String>, timeout: Duration) -> Self {
        Self::Timeout {
            target: target.into(),
            timeout,
        }
    }

    /// Check if the error came from a probe that ran out of time.
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_messages() {
        assert_eq!(
            NetworkError::dns("cloudflare.com", "no records").to_string(),
            "DNS resolution failed for cloudflare.com: no records"
        );
        assert_eq!(
            NetworkError::timeout("1.1.1.1:80", Duration::from_secs(5)).to_string(),
            "1.1.1.1:80 timed out after 5s"
        );
        assert!(NetworkError::timeout("x", Duration::from_secs(1)).is_timeout());
        assert!(!NetworkError::FirewallBlocking.is_timeout());
    }
}
