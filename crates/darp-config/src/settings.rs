//! Settings schema and defaults.
//!
//! Every section carries `#[serde(default)]`, so a settings file that only
//! names the fields a user changed still loads.

use std::fmt;
use std::net::IpAddr;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use darp_validation::{sanitize_hostname, sanitize_interface_name, validate_mtu, validate_port, validate_timeout};

use crate::error::{ConfigError, Result};

/// Cloudflare WARP endpoint used when none is configured.
pub const DEFAULT_WARP_ENDPOINT: &str = "engage.cloudflareclient.com:2408";

/// Tunnel interface name used when none is configured.
pub const DEFAULT_INTERFACE: &str = "warp0";

/// Resolvers pushed into the tunnel when none are configured.
pub const DEFAULT_DNS: [&str; 2] = ["1.1.1.1", "1.0.0.1"];

/// Tunnel MTU used when none is configured.
pub const DEFAULT_MTU: u32 = 1280;

/// Network timeout in seconds used when none is configured.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Directory `wg-quick` reads interface configs from.
pub const DEFAULT_WIREGUARD_DIR: &str = "/etc/wireguard";

/// Cloudflare service settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct CloudflareSettings {
    /// WARP endpoint as `host:port`.
    pub warp_endpoint: String,
}

impl Default for CloudflareSettings {
    fn default() -> Self {
        Self {
            warp_endpoint: DEFAULT_WARP_ENDPOINT.to_string(),
        }
    }
}

/// Tunnel interface settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct NetworkSettings {
    /// Name of the WireGuard interface.
    pub interface: String,
    /// DNS servers configured on the tunnel.
    pub dns: Vec<String>,
    /// Interface MTU.
    pub mtu: u32,
    /// Network operation timeout in seconds.
    pub timeout: u64,
}

impl Default for NetworkSettings {
    fn default() -> Self {
        Self {
            interface: DEFAULT_INTERFACE.to_string(),
            dns: DEFAULT_DNS.iter().map(ToString::to_string).collect(),
            mtu: DEFAULT_MTU,
            timeout: DEFAULT_TIMEOUT_SECS,
        }
    }
}

/// Log verbosity.
///
/// Read case-insensitively, so `WARN` and `warning` load as [`LogLevel::Warn`].
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum LogLevel {
    /// Everything.
    Trace,
    /// Diagnostic detail.
    Debug,
    /// Normal operation.
    #[default]
    Info,
    /// Recoverable problems.
    Warn,
    /// Failures only.
    Error,
}

impl LogLevel {
    /// The level as a tracing filter directive.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "trace" => Ok(Self::Trace),
            "debug" => Ok(Self::Debug),
            "info" => Ok(Self::Info),
            "warn" | "warning" => Ok(Self::Warn),
            "error" => Ok(Self::Error),
            other => Err(format!(
                "unknown log level '{other}' (expected trace, debug, info, warn or error)"
            )),
        }
    }
}

impl TryFrom<String> for LogLevel {
    type Error = String;

    fn try_from(value: String) -> std::result::Result<Self, <Self as TryFrom<String>>::Error> {
        value.parse()
    }
}

/// Log line encoding.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum LogFormat {
    /// One JSON object per line.
    #[default]
    Json,
    /// Human-readable text.
    Text,
}

impl LogFormat {
    /// The format name as written in the settings file.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Text => "text",
        }
    }
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "text" => Ok(Self::Text),
            other => Err(format!("unknown log format '{other}' (expected json or text)")),
        }
    }
}

impl TryFrom<String> for LogFormat {
    type Error = String;

    fn try_from(value: String) -> std::result::Result<Self, Self::Error> {
        value.parse()
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LoggingSettings {
    /// Default verbosity; `RUST_LOG` overrides it.
    pub level: LogLevel,
    /// Line encoding.
    pub format: LogFormat,
    /// `stdout`, `stderr`, or a file path to append to.
    pub output: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            format: LogFormat::Json,
            output: "stderr".to_string(),
        }
    }
}

/// How the tunnel is handed to `wg-quick`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct WireGuardSettings {
    /// Directory the interface config is written to.
    pub config_dir: PathBuf,
    /// Run `wg`/`wg-quick` through `sudo` when not already root.
    pub use_sudo: bool,
}

impl Default for WireGuardSettings {
    fn default() -> Self {
        Self {
            config_dir: PathBuf::from(DEFAULT_WIREGUARD_DIR),
            use_sudo: true,
        }
    }
}

/// Complete DARP settings, as stored in `config.json`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Config {
    /// Cloudflare service settings.
    #[serde(default)]
    pub cloudflare: CloudflareSettings,
    /// Tunnel interface settings.
    #[serde(default)]
    pub network: NetworkSettings,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingSettings,
    /// `wg-quick` integration settings.
    #[serde(default)]
    pub wireguard: WireGuardSettings,
}

impl Config {
    /// Validate the settings.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] describing the first problem found.
    pub fn validate(&self) -> Result<()> {
        if self.network.dns.is_empty() {
            return Err(ConfigError::invalid(
                "at least one DNS server must be configured",
            ));
        }

        for server in &self.network.dns {
            if server.parse::<IpAddr>().is_err() {
                return Err(ConfigError::invalid(format!(
                    "DNS server '{server}' is not an IP address"
                )));
            }
        }

        if self.cloudflare.warp_endpoint.trim().is_empty() {
            return Err(ConfigError::invalid("WARP endpoint must be configured"));
        }
        validate_endpoint(&self.cloudflare.warp_endpoint)?;

        sanitize_interface_name(&self.network.interface)
            .map_err(|e| ConfigError::invalid(e.to_string()))?;
        validate_mtu(self.network.mtu).map_err(|e| ConfigError::invalid(e.to_string()))?;
        validate_timeout(self.network.timeout)
            .map_err(|e| ConfigError::invalid(e.to_string()))?;

        if self.logging.output.trim().is_empty() {
            return Err(ConfigError::invalid("logging output must be configured"));
        }

        if self.wireguard.config_dir.as_os_str().is_empty() {
            return Err(ConfigError::invalid(
                "wireguard config directory must be configured",
            ));
        }

        Ok(())
    }
}

/// Check that an endpoint is `host:port` or `[v6]:port`.
fn validate_endpoint(endpoint: &str) -> Result<()> {
    let bad = |reason: &str| {
        ConfigError::invalid(format!("WARP endpoint '{endpoint}' {reason}"))
    };

    let (host, port) = endpoint
        .rsplit_once(':')
        .ok_or_else(|| bad("must be in host:port form"))?;

    let port: u16 = port.parse().map_err(|_| bad("has an invalid port"))?;
    validate_port(port).map_err(|_| bad("has an invalid port"))?;

    if let Some(v6) = host.strip_prefix('[').and_then(|h| h.strip_suffix(']')) {
        v6.parse::<std::net::Ipv6Addr>()
            .map_err(|_| bad("has an invalid IPv6 address"))?;
        return Ok(());
    }

    if host.parse::<std::net::Ipv4Addr>().is_ok() {
        return Ok(());
    }

    sanitize_hostname(host).map_err(|_| bad("has an invalid host"))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.cloudflare.warp_endpoint, "engage.cloudflareclient.com:2408");
        assert_eq!(config.network.interface, "warp0");
        assert_eq!(config.network.dns, vec!["1.1.1.1", "1.0.0.1"]);
        assert_eq!(config.network.mtu, 1280);
        assert_eq!(config.network.timeout, 30);
        assert_eq!(config.logging.level, LogLevel::Info);
        assert_eq!(config.logging.format, LogFormat::Json);
        assert_eq!(config.wireguard.config_dir, PathBuf::from("/etc/wireguard"));
        assert!(config.wireguard.use_sudo);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_dns_rejected() {
        let mut config = Config::default();
        config.network.dns.clear();
        let err = config.validate().unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid configuration: at least one DNS server must be configured"
        );
    }

    #[test]
    fn test_empty_endpoint_rejected() {
        let mut config = Config::default();
        config.cloudflare.warp_endpoint = String::new();
        let err = config.validate().unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid configuration: WARP endpoint must be configured"
        );
    }

    #[test_case("engage.cloudflareclient.com:2408", true ; "hostname")]
    #[test_case("162.159.192.1:2408", true ; "ipv4")]
    #[test_case("[2606:4700:d0::a29f:c001]:2408", true ; "ipv6")]
    #[test_case("engage.cloudflareclient.com", false ; "missing port")]
    #[test_case("engage.cloudflareclient.com:0", false ; "zero port")]
    #[test_case("engage.cloudflareclient.com:99999", false ; "port overflow")]
    #[test_case("bad host:2408", false ; "space in host")]
    #[test_case("[not-v6]:2408", false ; "bad ipv6")]
    fn test_endpoint_validation(endpoint: &str, ok: bool) {
        let mut config = Config::default();
        config.cloudflare.warp_endpoint = endpoint.to_string();
        assert_eq!(config.validate().is_ok(), ok);
    }

    #[test]
    fn test_bad_dns_rejected() {
        let mut config = Config::default();
        config.network.dns = vec!["one.one.one.one".into()];
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_bad_interface_rejected() {
        let mut config = Config::default();
        config.network.interface = "warp0;reboot".into();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_mtu_and_timeout_ranges() {
        let mut config = Config::default();
        config.network.mtu = 100;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.network.timeout = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let config: Config =
            serde_json::from_str(r#"{"network": {"interface": "wg9"}}"#).unwrap();
        assert_eq!(config.network.interface, "wg9");
        assert_eq!(config.network.mtu, 1280);
        assert_eq!(config.cloudflare, CloudflareSettings::default());
        assert_eq!(config.wireguard, WireGuardSettings::default());
    }

    #[test]
    fn test_json_field_names() {
        let json = serde_json::to_value(Config::default()).unwrap();
        assert_eq!(json["cloudflare"]["warp_endpoint"], "engage.cloudflareclient.com:2408");
        assert_eq!(json["network"]["dns"][1], "1.0.0.1");
        assert_eq!(json["logging"]["level"], "info");
        assert_eq!(json["logging"]["format"], "json");
        assert_eq!(json["wireguard"]["use_sudo"], true);
    }

    #[test_case("WARN", LogLevel::Warn ; "upper case")]
    #[test_case("warning", LogLevel::Warn ; "alias")]
    #[test_case("Debug", LogLevel::Debug ; "mixed case")]
    fn test_log_level_loads_case_insensitively(level: &str, expected: LogLevel) {
        let json = format!(r#"{{"logging": {{"level": "{level}", "format": "TEXT"}}}}"#);
        let config: Config = serde_json::from_str(&json).unwrap();
        assert_eq!(config.logging.level, expected);
        assert_eq!(config.logging.format, LogFormat::Text);
    }

    #[test]
    fn test_unknown_log_level_fails_to_load() {
        let err = serde_json::from_str::<Config>(r#"{"logging": {"level": "loud"}}"#).unwrap_err();
        assert!(err.to_string().contains("unknown log level 'loud'"));
    }

    #[test]
    fn test_log_level_parse() {
        assert_eq!("WARNING".parse::<LogLevel>(), Ok(LogLevel::Warn));
        assert_eq!("debug".parse::<LogLevel>(), Ok(LogLevel::Debug));
        assert!("loud".parse::<LogLevel>().is_err());
        assert_eq!("text".parse::<LogFormat>(), Ok(LogFormat::Text));
        assert!("xml".parse::<LogFormat>().is_err());
    }
}
