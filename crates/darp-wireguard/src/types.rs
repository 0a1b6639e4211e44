//! Address types used in WireGuard configuration.

use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;

use ipnet::IpNet;
use serde::{Deserialize, Serialize};

use darp_validation::{sanitize_hostname, validate_port};

use crate::error::{Result, WireGuardError};

/// An allowed IP address or network in CIDR notation.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AllowedIp {
    network: IpNet,
}

impl AllowedIp {
    /// Creates a new allowed IP from an `IpNet`.
    #[must_use]
    pub fn new(network: IpNet) -> Self {
        Self { network }
    }

    /// Returns the network.
    #[must_use]
    pub fn network(&self) -> &IpNet {
        &self.network
    }

    /// Creates an allowed IP from CIDR notation.
    ///
    /// A bare address is accepted as a host route (`/32` or `/128`).
    ///
    /// # Errors
    ///
    /// Returns an error if the CIDR notation is invalid.
    pub fn from_cidr(s: &str) -> Result<Self> {
        let s = s.trim();
        if let Ok(network) = s.parse::<IpNet>() {
            return Ok(Self { network });
        }
        s.parse::<IpAddr>()
            .map(|ip| Self {
                network: IpNet::from(ip),
            })
            .map_err(|_| WireGuardError::InvalidCidr(s.to_string()))
    }

    /// Returns the CIDR string representation.
    #[must_use]
    pub fn to_cidr(&self) -> String {
        self.network.to_string()
    }
}

impl FromStr for AllowedIp {
    type Err = WireGuardError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_cidr(s)
    }
}

impl fmt::Display for AllowedIp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.network)
    }
}

/// A WireGuard peer endpoint.
///
/// Unlike a `SocketAddr` the host may be a DNS name; `wg-quick` resolves it
/// when the interface comes up.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Endpoint {
    host: String,
    port: u16,
}

impl Endpoint {
    /// Creates an endpoint from a host and port.
    ///
    /// # Errors
    ///
    /// Returns an error if the host is neither an IP address nor a valid
    /// hostname, or the port is 0.
    pub fn new(host: &str, port: u16) -> Result<Self> {
        validate_port(port).map_err(|e| WireGuardError::InvalidEndpoint(e.to_string()))?;

        let host = if let Ok(ip) = host.parse::<IpAddr>() {
            ip.to_string()
        } else {
            sanitize_hostname(host)
                .map_err(|e| WireGuardError::InvalidEndpoint(e.to_string()))?
                .into_inner()
        };

        Ok(Self { host, port })
    }

    /// Creates an endpoint from a socket address.
    #[must_use]
    pub fn from_socket_addr(address: SocketAddr) -> Self {
        Self {
            host: address.ip().to_string(),
            port: address.port(),
        }
    }

    /// Returns the host (IP address or DNS name).
    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Returns the port.
    #[must_use]
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Returns the IP address if the host is a literal address.
    #[must_use]
    pub fn ip(&self) -> Option<IpAddr> {
        self.host.parse().ok()
    }
}

impl FromStr for Endpoint {
    type Err = WireGuardError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if let Ok(address) = s.parse::<SocketAddr>() {
            return Ok(Self::from_socket_addr(address));
        }

        let (host, port) = s
            .rsplit_once(':')
            .ok_or_else(|| WireGuardError::InvalidEndpoint(format!("{s}: expected host:port")))?;
        let port = port
            .parse::<u16>()
            .map_err(|_| WireGuardError::InvalidEndpoint(format!("{s}: invalid port")))?;

        Self::new(host, port)
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.host.contains(':') {
            write!(f, "[{}]:{}", self.host, self.port)
        } else {
            write!(f, "{}:{}", self.host, self.port)
        }
    }
}
