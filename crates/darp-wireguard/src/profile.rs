//! The Cloudflare WARP tunnel profile.

use std::net::IpAddr;

use darp_config::Config;
use tracing::debug;

use crate::config::{InterfaceConfig, PeerConfig};
use crate::error::{Result, WireGuardError};
use crate::keys::{PrivateKey, PublicKey};
use crate::types::{AllowedIp, Endpoint};

/// Cloudflare's WARP peer public key.
pub const WARP_PEER_PUBLIC_KEY: &str = "bmXOC+F1FxEMF9dyiK2H5/1SUtzH0JuVo51h2wPfgyo=";

/// Tunnel address assigned to the client.
pub const WARP_CLIENT_ADDRESS: &str = "172.16.0.2/32";

/// Networks routed through the tunnel.
pub const WARP_ALLOWED_IPS: [&str; 2] = ["0.0.0.0/0", "::/0"];

/// Builds `wg-quick` profiles for WARP from DARP settings.
pub struct WarpProfile;

impl WarpProfile {
    /// Builds a profile with a freshly generated private key.
    pub fn generate(config: &Config) -> Result<InterfaceConfig> {
        Self::with_key(config, PrivateKey::generate())
    }

    /// Builds a profile around an existing private key.
    pub fn with_key(config: &Config, private_key: PrivateKey) -> Result<InterfaceConfig> {
        let mut peer = PeerConfig::new(PublicKey::from_base64(WARP_PEER_PUBLIC_KEY)?);
        peer.endpoint = Some(config.cloudflare.warp_endpoint.parse::<Endpoint>()?);
        for cidr in WARP_ALLOWED_IPS {
            peer.allowed_ips.push(AllowedIp::from_cidr(cidr)?);
        }

        let mtu = u16::try_from(config.network.mtu).map_err(|_| {
            WireGuardError::invalid_config(format!("MTU {} out of range", config.network.mtu))
        })?;

        let mut interface = InterfaceConfig::new(private_key)
            .with_address(AllowedIp::from_cidr(WARP_CLIENT_ADDRESS)?)
            .with_mtu(mtu)
            .with_peer(peer);

        for server in &config.network.dns {
            let ip = server.parse::<IpAddr>().map_err(|_| {
                WireGuardError::invalid_config(format!("DNS server {server} is not an IP address"))
            })?;
            interface = interface.with_dns(ip);
        }

        debug!(
            public_key = %interface.public_key(),
            endpoint = %config.cloudflare.warp_endpoint,
            "built WARP profile"
        );
        Ok(interface)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::parse_wg_config;

    #[test]
    fn default_profile() {
        let profile = WarpProfile::generate(&Config::default()).unwrap();

        assert_eq!(profile.addresses[0].to_cidr(), "172.16.0.2/32");
        assert_eq!(profile.dns, vec![
            "1.1.1.1".parse::<IpAddr>().unwrap(),
            "1.0.0.1".parse::<IpAddr>().unwrap()
        ]);
        assert_eq!(profile.mtu, Some(1280));
        assert_eq!(profile.listen_port, None);

        let peer = &profile.peers[0];
        assert_eq!(peer.public_key.to_base64(), WARP_PEER_PUBLIC_KEY);
        assert_eq!(
            peer.endpoint.as_ref().unwrap().to_string(),
            "engage.cloudflareclient.com:2408"
        );
        let allowed: Vec<String> = peer.allowed_ips.iter().map(AllowedIp::to_cidr).collect();
        assert_eq!(allowed, ["0.0.0.0/0", "::/0"]);
    }

    #[test]
    fn keys_differ_between_profiles() {
        let config = Config::default();
        let a = WarpProfile::generate(&config).unwrap();
        let b = WarpProfile::generate(&config).unwrap();
        assert_ne!(a.private_key, b.private_key);
    }

    #[test]
    fn settings_flow_into_profile() {
        let mut config = Config::default();
        config.network.dns = vec!["9.9.9.9".into()];
        config.network.mtu = 1420;
        config.cloudflare.warp_endpoint = "162.159.192.1:2408".into();

        let key = PrivateKey::generate();
        let profile = WarpProfile::with_key(&config, key.clone()).unwrap();
        assert_eq!(profile.private_key, key);
        assert_eq!(profile.mtu, Some(1420));
        assert_eq!(profile.dns.len(), 1);

        let rendered = profile.render();
        assert!(rendered.contains("Endpoint = 162.159.192.1:2408\n"));
        assert!(rendered.contains("DNS = 9.9.9.9\n"));
        assert_eq!(parse_wg_config(&rendered).unwrap(), profile);
    }

    #[test]
    fn bad_settings_rejected() {
        let mut config = Config::default();
        config.network.dns = vec!["one.one.one.one".into()];
        assert!(matches!(
            WarpProfile::generate(&config),
            Err(WireGuardError::InvalidConfig(_))
        ));

        let mut config = Config::default();
        config.network.mtu = 70_000;
        assert!(WarpProfile::generate(&config).is_err());

        let mut config = Config::default();
        config.cloudflare.warp_endpoint = "no-port".into();
        assert!(matches!(
            WarpProfile::generate(&config),
            Err(WireGuardError::InvalidEndpoint(_))
        ));
    }
}
