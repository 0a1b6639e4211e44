//! Timed DNS and TCP probes.

use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use tokio::net::{TcpStream, lookup_host};
use tokio::time::{Instant, timeout};
use tracing::debug;

use crate::error::{NetworkError, Result};

fn lookup_query(host: &str) -> String {
    if host.parse::<SocketAddr>().is_ok() {
        return host.to_string();
    }
    if let Ok(ip) = host.parse::<IpAddr>() {
        return SocketAddr::new(ip, 0).to_string();
    }
    match host.rsplit_once(':') {
        Some((name, port)) if !name.contains(':') && port.parse::<u16>().is_ok() => {
            host.to_string()
        }
        _ => format!("{host}:0"),
    }
}

/// Resolves `host` (a name, optionally with `:port`) within `limit`.
///
/// Returns the distinct addresses in resolver order.
pub async fn resolve(host: &str, limit: Duration) -> Result<Vec<IpAddr>> {
    let query = lookup_query(host);

    let addrs = timeout(limit, lookup_host(query.as_str()))
        .await
        .map_err(|_| NetworkError::timeout(host, limit))?
        .map_err(|e| NetworkError::dns(host, e.to_string()))?;

    let mut ips: Vec<IpAddr> = Vec::new();
    for addr in addrs {
        if !ips.contains(&addr.ip()) {
            ips.push(addr.ip());
        }
    }

    if ips.is_empty() {
        return Err(NetworkError::dns(host, "no addresses returned"));
    }
    debug!(host, count = ips.len(), "resolved");
    Ok(ips)
}

/// Opens and drops a TCP connection to `target`, returning how long the
/// handshake took.
pub async fn tcp_probe(target: SocketAddr, limit: Duration) -> Result<Duration> {
    let started = Instant::now();
    let stream = timeout(limit, TcpStream::connect(target))
        .await
        .map_err(|_| NetworkError::timeout(target.to_string(), limit))?
        .map_err(|e| NetworkError::connectivity(target.to_string(), e.to_string()))?;
    let elapsed = started.elapsed();
    drop(stream);

    debug!(%target, elapsed_ms = elapsed.as_millis(), "tcp probe");
    Ok(elapsed)
}
