//! WireGuard configuration file generation and parsing.
//!
//! This module handles the INI-style format `wg-quick` reads from
//! `/etc/wireguard/<interface>.conf`.

use std::fmt::Write as FmtWrite;
use std::net::IpAddr;

use darp_validation::sanitize_hostname;

use crate::error::{Result, WireGuardError};
use crate::keys::{PresharedKey, PrivateKey, PublicKey};
use crate::types::{AllowedIp, Endpoint};

/// Configuration for a WireGuard interface.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InterfaceConfig {
    /// The interface's private key.
    pub private_key: PrivateKey,
    /// Optional listen port.
    pub listen_port: Option<u16>,
    /// IP addresses assigned to this interface.
    pub addresses: Vec<AllowedIp>,
    /// DNS servers `wg-quick` installs while the interface is up.
    pub dns: Vec<IpAddr>,
    /// DNS search domains, written after the servers on the `DNS` line.
    pub dns_search: Vec<String>,
    /// Optional MTU.
    pub mtu: Option<u16>,
    /// Configured peers.
    pub peers: Vec<PeerConfig>,
}

impl InterfaceConfig {
    /// Creates a new interface configuration with the given private key.
    #[must_use]
    pub fn new(private_key: PrivateKey) -> Self {
        Self {
            private_key,
            listen_port: None,
            addresses: Vec::new(),
            dns: Vec::new(),
            dns_search: Vec::new(),
            mtu: None,
            peers: Vec::new(),
        }
    }

    /// Sets the listen port.
    #[must_use]
    pub fn with_listen_port(mut self, port: u16) -> Self {
        self.listen_port = Some(port);
        self
    }

    /// Adds an address.
    #[must_use]
    pub fn with_address(mut self, address: AllowedIp) -> Self {
        self.addresses.push(address);
        self
    }

    /// Adds a DNS server.
    #[must_use]
    pub fn with_dns(mut self, dns: IpAddr) -> Self {
        self.dns.push(dns);
        self
    }

    /// Adds a DNS search domain.
    #[must_use]
    pub fn with_dns_search(mut self, domain: impl Into<String>) -> Self {
        self.dns_search.push(domain.into());
        self
    }

    /// Sets the MTU.
    #[must_use]
    pub fn with_mtu(mut self, mtu: u16) -> Self {
        self.mtu = Some(mtu);
        self
    }

    /// Adds a peer.
    #[must_use]
    pub fn with_peer(mut self, peer: PeerConfig) -> Self {
        self.peers.push(peer);
        self
    }

    /// The public key matching this interface's private key.
    #[must_use]
    pub fn public_key(&self) -> PublicKey {
        self.private_key.public_key()
    }

    /// Renders the configuration in `wg-quick` format.
    #[must_use]
    pub fn render(&self) -> String {
        render_wg_config(self)
    }
}

/// Configuration for a WireGuard peer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PeerConfig {
    /// The peer's public key.
    pub public_key: PublicKey,
    /// Optional preshared key.
    pub preshared_key: Option<PresharedKey>,
    /// Allowed IPs for this peer.
    pub allowed_ips: Vec<AllowedIp>,
    /// Optional endpoint.
    pub endpoint: Option<Endpoint>,
    /// Optional persistent keepalive interval.
    pub persistent_keepalive: Option<u16>,
}

impl PeerConfig {
    /// Creates a new peer config with the given public key.
    #[must_use]
    pub fn new(public_key: PublicKey) -> Self {
        Self {
            public_key,
            preshared_key: None,
            allowed_ips: Vec::new(),
            endpoint: None,
            persistent_keepalive: None,
        }
    }
}

/// Builder for creating `PeerConfig`.
#[derive(Default)]
pub struct PeerConfigBuilder {
    public_key: Option<PublicKey>,
    preshared_key: Option<PresharedKey>,
    allowed_ips: Vec<AllowedIp>,
    endpoint: Option<Endpoint>,
    persistent_keepalive: Option<u16>,
}

impl PeerConfigBuilder {
    /// Creates a new builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the public key.
    #[must_use]
    pub fn public_key(mut self, key: PublicKey) -> Self {
        self.public_key = Some(key);
        self
    }

    /// Sets the preshared key.
    #[must_use]
    pub fn preshared_key(mut self, key: PresharedKey) -> Self {
        self.preshared_key = Some(key);
        self
    }

    /// Adds an allowed IP from CIDR notation.
    pub fn allowed_ip(mut self, cidr: &str) -> Result<Self> {
        self.allowed_ips.push(AllowedIp::from_cidr(cidr)?);
        Ok(self)
    }

    /// Sets the endpoint from `host:port`.
    pub fn endpoint(mut self, endpoint: &str) -> Result<Self> {
        self.endpoint = Some(endpoint.parse()?);
        Ok(self)
    }

    /// Sets the persistent keepalive interval.
    #[must_use]
    pub fn persistent_keepalive(mut self, seconds: u16) -> Self {
        self.persistent_keepalive = Some(seconds);
        self
    }

    /// Builds the `PeerConfig`.
    pub fn build(self) -> Result<PeerConfig> {
        let public_key = self
            .public_key
            .ok_or_else(|| WireGuardError::invalid_config("public key is required"))?;

        Ok(PeerConfig {
            public_key,
            preshared_key: self.preshared_key,
            allowed_ips: self.allowed_ips,
            endpoint: self.endpoint,
            persistent_keepalive: self.persistent_keepalive,
        })
    }
}

fn join<T: ToString>(items: &[T]) -> String {
    items
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Renders an `InterfaceConfig` in `wg-quick` format.
#[must_use]
pub fn render_wg_config(config: &InterfaceConfig) -> String {
    let mut output = String::new();

    output.push_str("[Interface]\n");
    let _ = writeln!(output, "PrivateKey = {}", config.private_key.to_base64());

    if let Some(port) = config.listen_port {
        let _ = writeln!(output, "ListenPort = {port}");
    }

    if !config.addresses.is_empty() {
        let _ = writeln!(output, "Address = {}", join(&config.addresses));
    }

    let dns: Vec<String> = config
        .dns
        .iter()
        .map(ToString::to_string)
        .chain(config.dns_search.iter().cloned())
        .collect();
    if !dns.is_empty() {
        let _ = writeln!(output, "DNS = {}", dns.join(", "));
    }

    if let Some(mtu) = config.mtu {
        let _ = writeln!(output, "MTU = {mtu}");
    }

    for peer in &config.peers {
        output.push('\n');
        output.push_str("[Peer]\n");
        let _ = writeln!(output, "PublicKey = {}", peer.public_key.to_base64());

        if let Some(ref psk) = peer.preshared_key {
            let _ = writeln!(output, "PresharedKey = {}", psk.to_base64());
        }

        if !peer.allowed_ips.is_empty() {
            let _ = writeln!(output, "AllowedIPs = {}", join(&peer.allowed_ips));
        }

        if let Some(ref endpoint) = peer.endpoint {
            let _ = writeln!(output, "Endpoint = {endpoint}");
        }

        if let Some(keepalive) = peer.persistent_keepalive {
            let _ = writeln!(output, "PersistentKeepalive = {keepalive}");
        }
    }

    output
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    None,
    Interface,
    Peer,
}

/// Parses a `wg-quick` configuration file.
///
/// List keys may repeat or hold comma-separated values. Unknown keys are
/// ignored so files carrying `PostUp` and similar hooks still load.
pub fn parse_wg_config(config_str: &str) -> Result<InterfaceConfig> {
    let mut section = Section::None;
    let mut interface = ParsedInterface::default();
    let mut peers: Vec<PeerConfig> = Vec::new();
    let mut current_peer: Option<(ParsedPeer, usize)> = None;

    for (index, line) in config_str.lines().enumerate() {
        let line_number = index + 1;
        let line = line.trim();

        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if let Some(name) = line.strip_prefix('[').and_then(|l| l.strip_suffix(']')) {
            if let Some((peer, start)) = current_peer.take() {
                peers.push(peer.build(start)?);
            }

            section = match name.trim() {
                "Interface" => Section::Interface,
                "Peer" => {
                    current_peer = Some((ParsedPeer::default(), line_number));
                    Section::Peer
                }
                other => {
                    return Err(WireGuardError::parse(
                        line_number,
                        format!("unknown section: {other}"),
                    ));
                }
            };
            continue;
        }

        let Some((key, value)) = line.split_once('=') else {
            return Err(WireGuardError::parse(
                line_number,
                format!("invalid line format: {line}"),
            ));
        };

        let key = key.trim();
        let value = value.trim();

        match section {
            Section::None => {
                return Err(WireGuardError::parse(
                    line_number,
                    "key-value pair outside of section",
                ));
            }
            Section::Interface => interface.parse_key(key, value, line_number)?,
            Section::Peer => {
                if let Some((ref mut peer, _)) = current_peer {
                    peer.parse_key(key, value, line_number)?;
                }
            }
        }
    }

    if let Some((peer, start)) = current_peer {
        peers.push(peer.build(start)?);
    }

    interface.build(peers)
}

fn split_list(value: &str) -> impl Iterator<Item = &str> {
    value.split(',').map(str::trim).filter(|s| !s.is_empty())
}

fn parse_value<T: std::str::FromStr>(value: &str, line: usize, key: &str) -> Result<T> {
    value
        .parse()
        .map_err(|_| WireGuardError::parse(line, format!("invalid {key}: {value}")))
}

#[derive(Default)]
struct ParsedInterface {
    private_key: Option<PrivateKey>,
    listen_port: Option<u16>,
    addresses: Vec<AllowedIp>,
    dns: Vec<IpAddr>,
    dns_search: Vec<String>,
    mtu: Option<u16>,
}

impl ParsedInterface {
    fn parse_key(&mut self, key: &str, value: &str, line: usize) -> Result<()> {
        match key {
            "PrivateKey" => {
                self.private_key = Some(
                    PrivateKey::from_base64(value)
                        .map_err(|_| WireGuardError::parse(line, "invalid PrivateKey"))?,
                );
            }
            "ListenPort" => self.listen_port = Some(parse_value(value, line, key)?),
            "Address" => {
                for addr in split_list(value) {
                    self.addresses.push(parse_value(addr, line, key)?);
                }
            }
            "DNS" => {
                // wg-quick treats entries that are not addresses as search domains.
                for entry in split_list(value) {
                    if let Ok(ip) = entry.parse::<IpAddr>() {
                        self.dns.push(ip);
                    } else {
                        let domain = sanitize_hostname(entry).map_err(|_| {
                            WireGuardError::parse(line, format!("invalid DNS: {entry}"))
                        })?;
                        self.dns_search.push(domain.into_inner());
                    }
                }
            }
            "MTU" => self.mtu = Some(parse_value(value, line, key)?),
            _ => {}
        }
        Ok(())
    }

    fn build(self, peers: Vec<PeerConfig>) -> Result<InterfaceConfig> {
        let private_key = self
            .private_key
            .ok_or_else(|| WireGuardError::parse(0, "missing PrivateKey in [Interface] section"))?;

        Ok(InterfaceConfig {
            private_key,
            listen_port: self.listen_port,
            addresses: self.addresses,
            dns: self.dns,
            dns_search: self.dns_search,
            mtu: self.mtu,
            peers,
        })
    }
}

#[derive(Default)]
struct ParsedPeer {
    public_key: Option<PublicKey>,
    preshared_key: Option<PresharedKey>,
    allowed_ips: Vec<AllowedIp>,
    endpoint: Option<Endpoint>,
    persistent_keepalive: Option<u16>,
}

impl ParsedPeer {
    fn parse_key(&mut self, key: &str, value: &str, line: usize) -> Result<()> {
        match key {
            "PublicKey" => {
                self.public_key = Some(
                    PublicKey::from_base64(value)
                        .map_err(|_| WireGuardError::parse(line, "invalid PublicKey"))?,
                );
            }
            "PresharedKey" => {
                self.preshared_key = Some(
                    PresharedKey::from_base64(value)
                        .map_err(|_| WireGuardError::parse(line, "invalid PresharedKey"))?,
                );
            }
            "AllowedIPs" => {
                for ip in split_list(value) {
                    self.allowed_ips.push(parse_value(ip, line, key)?);
                }
            }
            "Endpoint" => self.endpoint = Some(parse_value(value, line, key)?),
            "PersistentKeepalive" => {
                self.persistent_keepalive = if value == "off" {
                    None
                } else {
                    Some(parse_value(value, line, key)?)
                };
            }
            _ => {}
        }
        Ok(())
    }

    fn build(self, section_line: usize) -> Result<PeerConfig> {
        let public_key = self.public_key.ok_or_else(|| {
            WireGuardError::parse(section_line, "missing PublicKey in [Peer] section")
        })?;

        Ok(PeerConfig {
            public_key,
            preshared_key: self.preshared_key,
            allowed_ips: self.allowed_ips,
            endpoint: self.endpoint,
            persistent_keepalive: self.persistent_keepalive,
        })
    }
}
