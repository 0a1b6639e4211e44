//! Parsing of `wg show <interface>` output.

use serde::Serialize;

use crate::error::{Result, WireGuardError};
use crate::keys::PublicKey;
use crate::types::{AllowedIp, Endpoint};

/// Interface state as reported by `wg show`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct WgShow {
    /// Interface name.
    pub interface: String,
    /// The interface's public key.
    pub public_key: Option<PublicKey>,
    /// UDP listen port.
    pub listening_port: Option<u16>,
    /// Firewall mark, as printed (`0xca6c`).
    pub fwmark: Option<String>,
    /// Peers in the order `wg` printed them.
    pub peers: Vec<WgShowPeer>,
}

/// One peer block from `wg show`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WgShowPeer {
    /// Peer public key.
    pub public_key: PublicKey,
    /// Current endpoint.
    pub endpoint: Option<Endpoint>,
    /// Routed networks.
    pub allowed_ips: Vec<AllowedIp>,
    /// Human-readable age of the last handshake, e.g. `1 minute, 3 seconds ago`.
    pub latest_handshake: Option<String>,
    /// Bytes received.
    pub rx_bytes: u64,
    /// Bytes sent.
    pub tx_bytes: u64,
    /// Keepalive interval in seconds.
    pub persistent_keepalive: Option<u16>,
}

impl WgShowPeer {
    fn new(public_key: PublicKey) -> Self {
        Self {
            public_key,
            endpoint: None,
            allowed_ips: Vec::new(),
            latest_handshake: None,
            rx_bytes: 0,
            tx_bytes: 0,
            persistent_keepalive: None,
        }
    }
}

/// Parses the text printed by `wg show <interface>`.
///
/// Unknown fields are skipped. Fields before the first `interface:` line
/// are an error.
pub fn parse_wg_show(output: &str) -> Result<WgShow> {
    let mut show: Option<WgShow> = None;

    for (index, raw) in output.lines().enumerate() {
        let line_number = index + 1;
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }

        // Values such as endpoints contain ':' themselves.
        let Some((key, value)) = line.split_once(':') else {
            return Err(WireGuardError::parse(
                line_number,
                format!("expected 'key: value', got: {line}"),
            ));
        };
        let key = key.trim();
        let value = value.trim();

        if key == "interface" {
            show = Some(WgShow {
                interface: value.to_string(),
                ..WgShow::default()
            });
            continue;
        }

        let Some(show) = show.as_mut() else {
            return Err(WireGuardError::parse(
                line_number,
                "field before interface line",
            ));
        };

        if key == "peer" {
            let key = PublicKey::from_base64(value)
                .map_err(|_| WireGuardError::parse(line_number, "invalid peer key"))?;
            show.peers.push(WgShowPeer::new(key));
            continue;
        }

        if let Some(peer) = show.peers.last_mut() {
            parse_peer_field(peer, key, value, line_number)?;
        } else {
            parse_interface_field(show, key, value, line_number)?;
        }
    }

    show.ok_or_else(|| WireGuardError::parse(0, "no interface in wg output"))
}

fn parse_interface_field(show: &mut WgShow, key: &str, value: &str, line: usize) -> Result<()> {
    match key {
        "public key" => {
            show.public_key = Some(
                PublicKey::from_base64(value)
                    .map_err(|_| WireGuardError::parse(line, "invalid public key"))?,
            );
        }
        "listening port" => {
            show.listening_port = Some(
                value
                    .parse()
                    .map_err(|_| WireGuardError::parse(line, "invalid listening port"))?,
            );
        }
        "fwmark" => show.fwmark = Some(value.to_string()),
        _ => {}
    }
    Ok(())
}

fn parse_peer_field(peer: &mut WgShowPeer, key: &str, value: &str, line: usize) -> Result<()> {
    match key {
        "endpoint" => {
            peer.endpoint = Some(
                value
                    .parse()
                    .map_err(|_| WireGuardError::parse(line, "invalid endpoint"))?,
            );
        }
        "allowed ips" => {
            if value != "(none)" {
                peer.allowed_ips = value
                    .split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(AllowedIp::from_cidr)
                    .collect::<Result<_>>()
                    .map_err(|_| WireGuardError::parse(line, "invalid allowed ips"))?;
            }
        }
        "latest handshake" => peer.latest_handshake = Some(value.to_string()),
        "transfer" => {
            let (rx, tx) = parse_transfer(value)
                .ok_or_else(|| WireGuardError::parse(line, format!("invalid transfer: {value}")))?;
            peer.rx_bytes = rx;
            peer.tx_bytes = tx;
        }
        "persistent keepalive" => {
            peer.persistent_keepalive = value
                .strip_prefix("every ")
                .and_then(|rest| rest.strip_suffix(" seconds"))
                .and_then(|secs| secs.parse().ok());
        }
        _ => {}
    }
    Ok(())
}

/// Parses `1.23 MiB received, 456 B sent`.
fn parse_transfer(value: &str) -> Option<(u64, u64)> {
    let (received, sent) = value.split_once(',')?;
    let rx = parse_quantity(received.trim().strip_suffix("received")?)?;
    let tx = parse_quantity(sent.trim().strip_suffix("sent")?)?;
    Some((rx, tx))
}

fn parse_quantity(value: &str) -> Option<u64> {
    let (number, unit) = value.trim().split_once(' ')?;
    let number: f64 = number.parse().ok()?;
    let multiplier: f64 = match unit {
        "B" => 1.0,
        "KiB" => 1024.0,
        "MiB" => 1024.0 * 1024.0,
        "GiB" => 1024.0 * 1024.0 * 1024.0,
        "TiB" => 1024.0 * 1024.0 * 1024.0 * 1024.0,
        _ => return None,
    };
    Some((number * multiplier).round() as u64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    const PEER_KEY: &str = "bmXOC+F1FxEMF9dyiK2H5/1SUtzH0JuVo51h2wPfgyo=";

    fn sample() -> String {
        format!(
            "interface: warp0\n\
             \x20 public key: {PEER_KEY}\n\
             \x20 private key: (hidden)\n\
             \x20 listening port: 51820\n\
             \x20 fwmark: 0xca6c\n\
             \n\
             peer: {PEER_KEY}\n\
             \x20 endpoint: 162.159.192.1:2408\n\
             \x20 allowed ips: 0.0.0.0/0, ::/0\n\
             \x20 latest handshake: 1 minute, 3 seconds ago\n\
             \x20 transfer: 1.50 KiB received, 92 B sent\n\
             \x20 persistent keepalive: every 25 seconds\n"
        )
    }

    #[test]
    fn parses_interface_and_peer() {
        let show = parse_wg_show(&sample()).unwrap();
        assert_eq!(show.interface, "warp0");
        assert_eq!(show.listening_port, Some(51820));
        assert_eq!(show.fwmark.as_deref(), Some("0xca6c"));
        assert_eq!(show.public_key.unwrap().to_base64(), PEER_KEY);

        let peer = &show.peers[0];
        assert_eq!(peer.endpoint.as_ref().unwrap().to_string(), "162.159.192.1:2408");
        assert_eq!(peer.allowed_ips.len(), 2);
        assert_eq!(peer.latest_handshake.as_deref(), Some("1 minute, 3 seconds ago"));
        assert_eq!(peer.rx_bytes, 1536);
        assert_eq!(peer.tx_bytes, 92);
        assert_eq!(peer.persistent_keepalive, Some(25));
    }

    #[test]
    fn ipv6_endpoint_keeps_colons() {
        let text = format!(
            "interface: warp0\npeer: {PEER_KEY}\n  endpoint: [2606:4700:d0::a29f:c001]:2408\n"
        );
        let show = parse_wg_show(&text).unwrap();
        assert_eq!(
            show.peers[0].endpoint.as_ref().unwrap().host(),
            "2606:4700:d0::a29f:c001"
        );
    }

    #[test]
    fn interface_without_peers() {
        let show = parse_wg_show("interface: warp0\n  listening port: 40000\n").unwrap();
        assert!(show.peers.is_empty());
        assert_eq!(show.listening_port, Some(40000));
    }

    #[test]
    fn allowed_ips_none() {
        let text = format!("interface: warp0\npeer: {PEER_KEY}\n  allowed ips: (none)\n");
        assert!(parse_wg_show(&text).unwrap().peers[0].allowed_ips.is_empty());
    }

    #[test_case("" ; "empty")]
    #[test_case("  public key: abc\n" ; "field before interface")]
    #[test_case("interface: warp0\nnot a field\n" ; "missing colon")]
    #[test_case("interface: warp0\npeer: nope\n" ; "bad peer key")]
    fn rejects_malformed(input: &str) {
        assert!(matches!(
            parse_wg_show(input),
            Err(WireGuardError::ParseError { .. })
        ));
    }

    #[test_case("12 B", 12)]
    #[test_case("1.00 KiB", 1024)]
    #[test_case("2.50 MiB", 2_621_440)]
    #[test_case("1.00 GiB", 1_073_741_824)]
    #[test_case("1.00 TiB", 1_099_511_627_776)]
    fn quantities(input: &str, expected: u64) {
        assert_eq!(parse_quantity(input), Some(expected));
    }

    #[test]
    fn unknown_unit_rejected() {
        assert_eq!(parse_quantity("3 PiB"), None);
        assert_eq!(parse_transfer("3 B received"), None);
    }
}
