//! Parsers for `ip addr`, `ip route` and `resolv.conf`.
//!
//! These only look at text so they can be tested without running commands.

use std::net::IpAddr;

use serde::Serialize;

/// Addresses and link state of one interface.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct InterfaceAddress {
    /// Interface name.
    pub name: String,
    /// Operational state, e.g. `UP` or `UNKNOWN`.
    pub state: Option<String>,
    /// Link MTU.
    pub mtu: Option<u32>,
    /// First IPv4 address.
    pub ipv4: Option<IpAddr>,
    /// All IPv6 addresses.
    pub ipv6: Vec<IpAddr>,
}

/// One line of the routing table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Route {
    /// Destination network or `default`.
    pub destination: String,
    /// Next hop.
    pub gateway: Option<String>,
    /// Outgoing device.
    pub interface: Option<String>,
}

fn address_without_prefix(token: &str) -> Option<IpAddr> {
    token.split('/').next()?.parse().ok()
}

fn value_after<'a>(fields: &[&'a str], keyword: &str) -> Option<&'a str> {
    fields
        .iter()
        .position(|f| *f == keyword)
        .and_then(|i| fields.get(i + 1))
        .copied()
}

/// Parses `ip addr show <interface>`.
///
/// Only the first interface block is read.
#[must_use]
pub fn parse_ip_addr(output: &str) -> InterfaceAddress {
    let mut info = InterfaceAddress::default();
    let mut seen_header = false;

    for line in output.lines() {
        let fields: Vec<&str> = line.split_whitespace().collect();
        let Some(first) = fields.first() else {
            continue;
        };

        // Header lines start at column 0: "3: warp0: <POINTOPOINT,UP> mtu 1280 ..."
        if !line.starts_with(char::is_whitespace) && first.ends_with(':') {
            if seen_header {
                break;
            }
            seen_header = true;
            if let Some(name) = fields.get(1) {
                let name = name.trim_end_matches(':');
                info.name = name.split('@').next().unwrap_or(name).to_string();
            }
            info.mtu = value_after(&fields, "mtu").and_then(|v| v.parse().ok());
            info.state = value_after(&fields, "state").map(str::to_string);
            continue;
        }

        match *first {
            "inet" if info.ipv4.is_none() => {
                info.ipv4 = fields.get(1).and_then(|a| address_without_prefix(a));
            }
            "inet6" => {
                if let Some(addr) = fields.get(1).and_then(|a| address_without_prefix(a)) {
                    info.ipv6.push(addr);
                }
            }
            _ => {}
        }
    }

    info
}

/// Parses `ip route show`.
///
/// `via` and `dev` keywords name the gateway and device. Lines without
/// either fall back to position: the third field is the gateway and the
/// fourth the device.
#[must_use]
pub fn parse_ip_route(output: &str) -> Vec<Route> {
    output
        .lines()
        .filter_map(|line| {
            let fields: Vec<&str> = line.split_whitespace().collect();
            let destination = (*fields.first()?).to_string();

            let has_keywords = fields.contains(&"via") || fields.contains(&"dev");
            let (gateway, interface) = if has_keywords {
                (value_after(&fields, "via"), value_after(&fields, "dev"))
            } else {
                (fields.get(2).copied(), fields.get(3).copied())
            };

            Some(Route {
                destination,
                gateway: gateway.map(str::to_string),
                interface: interface.map(str::to_string),
            })
        })
        .collect()
}

/// Collects `nameserver` entries from `resolv.conf`.
#[must_use]
pub fn parse_resolv_conf(contents: &str) -> Vec<String> {
    contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.starts_with('#') && !line.starts_with(';'))
        .filter_map(|line| {
            let mut fields = line.split_whitespace();
            match (fields.next(), fields.next()) {
                (Some("nameserver"), Some(server)) => Some(server.to_string()),
                _ => None,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    const IP_ADDR: &str = "\
3: warp0: <POINTOPOINT,NOARP,UP,LOWER_UP> mtu 1280 qdisc noqueue state UNKNOWN group default qlen 1000
    link/none
    inet 172.16.0.2/32 scope global warp0
       valid_lft forever preferred_lft forever
    inet6 2606:4700:110:8a36::2/128 scope global
       valid_lft forever preferred_lft forever
    inet6 fe80::1/64 scope link
4: eth0: <BROADCAST,MULTICAST,UP,LOWER_UP> mtu 1500 state UP
    inet 192.168.1.10/24 brd 192.168.1.255 scope global eth0
";

    #[test]
    fn ip_addr_reads_first_block() {
        let info = parse_ip_addr(IP_ADDR);
        assert_eq!(info.name, "warp0");
        assert_eq!(info.state.as_deref(), Some("UNKNOWN"));
        assert_eq!(info.mtu, Some(1280));
        assert_eq!(info.ipv4, Some("172.16.0.2".parse().unwrap()));
        assert_eq!(info.ipv6.len(), 2);
    }

    #[test]
    fn ip_addr_veth_name() {
        let info = parse_ip_addr("7: veth0@if6: <UP> mtu 1500 state UP\n");
        assert_eq!(info.name, "veth0");
    }

    #[test]
    fn ip_addr_empty() {
        assert_eq!(parse_ip_addr(""), InterfaceAddress::default());
    }

    #[test_case(
        "default via 192.168.1.1 dev eth0 proto dhcp metric 100",
        "default", Some("192.168.1.1"), Some("eth0") ; "default route"
    )]
    #[test_case(
        "192.168.1.0/24 dev eth0 proto kernel scope link src 192.168.1.10",
        "192.168.1.0/24", None, Some("eth0") ; "link route"
    )]
    #[test_case("unreachable 10.0.0.0/8", "unreachable", None, None ; "short line")]
    #[test_case("10.0.0.0/8 x 10.0.0.1 tun0", "10.0.0.0/8", Some("10.0.0.1"), Some("tun0") ; "positional")]
    fn ip_route(line: &str, destination: &str, gateway: Option<&str>, interface: Option<&str>) {
        let routes = parse_ip_route(line);
        assert_eq!(routes.len(), 1);
        assert_eq!(routes[0].destination, destination);
        assert_eq!(routes[0].gateway.as_deref(), gateway);
        assert_eq!(routes[0].interface.as_deref(), interface);
    }

    #[test]
    fn ip_route_skips_blank_lines() {
        let routes = parse_ip_route("default via 10.0.0.1 dev eth0\n\n10.0.0.0/24 dev eth0\n");
        assert_eq!(routes.len(), 2);
    }

    #[test]
    fn resolv_conf() {
        let contents = "# generated\nsearch lan\nnameserver 1.1.1.1\n; old\n  nameserver 1.0.0.1  \nnameserver\n";
        assert_eq!(parse_resolv_conf(contents), vec!["1.1.1.1", "1.0.0.1"]);
    }
}
