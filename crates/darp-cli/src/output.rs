//! Output formatting for CLI commands.
//!
//! Supports table (human-readable) and JSON output formats.

use std::io::Write;

use darp_network::{
    CheckResult, DnsResult, InterfaceAddress, LatencyResult, NetworkInfo, SysctlOutcome,
};
use serde::Serialize;

use crate::cli::Format;
use crate::error::CliError;

/// Inner width of the boxed layouts.
const BOX_WIDTH: usize = 41;

/// Output formatter that handles both table and JSON output.
#[derive(Debug, Clone)]
pub struct OutputFormat {
    format: Format,
}

impl OutputFormat {
    /// Create a new output formatter.
    #[must_use]
    pub const fn new(format: Format) -> Self {
        Self { format }
    }

    /// Get the current format.
    #[must_use]
    pub const fn format(&self) -> Format {
        self.format
    }

    /// Check if JSON format is selected.
    #[must_use]
    pub const fn is_json(&self) -> bool {
        matches!(self.format, Format::Json)
    }

    /// Write a serializable value to the output.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or writing fails.
    pub fn write<W, T>(&self, writer: &mut W, value: &T) -> Result<(), CliError>
    where
        W: Write,
        T: Serialize + TableDisplay,
    {
        match self.format {
            Format::Json => write_json(writer, value)?,
            Format::Table => value.write_table(writer)?,
        }
        Ok(())
    }

    /// Write a progress line, shown only in table format.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    pub fn progress<W: Write>(&self, writer: &mut W, line: &str) -> Result<(), CliError> {
        if !self.is_json() {
            writeln!(writer, "{line}")?;
        }
        Ok(())
    }

    /// Write a serializable value to a string.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_string<T>(&self, value: &T) -> Result<String, CliError>
    where
        T: Serialize + TableDisplay,
    {
        let mut buf = Vec::new();
        self.write(&mut buf, value)?;
        String::from_utf8(buf).map_err(|e| CliError::Format(format!("UTF-8 error: {e}")))
    }
}

impl Default for OutputFormat {
    fn default() -> Self {
        Self::new(Format::Table)
    }
}

/// Write any value as pretty JSON followed by a newline.
///
/// # Errors
///
/// Returns an error if serialization or writing fails.
pub fn write_json<W: Write, T: Serialize + ?Sized>(writer: &mut W, value: &T) -> Result<(), CliError> {
    serde_json::to_writer_pretty(&mut *writer, value)
        .map_err(|e| CliError::Format(format!("JSON serialization failed: {e}")))?;
    writeln!(writer)?;
    Ok(())
}

/// Trait for types that can be displayed as a table.
pub trait TableDisplay {
    /// Write the value as a human-readable table.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    fn write_table<W: Write>(&self, writer: &mut W) -> Result<(), CliError>;
}

fn box_top<W: Write>(writer: &mut W) -> std::io::Result<()> {
    writeln!(writer, "┌{}┐", "─".repeat(BOX_WIDTH))
}

fn box_rule<W: Write>(writer: &mut W) -> std::io::Result<()> {
    writeln!(writer, "├{}┤", "─".repeat(BOX_WIDTH))
}

fn box_bottom<W: Write>(writer: &mut W) -> std::io::Result<()> {
    writeln!(writer, "└{}┘", "─".repeat(BOX_WIDTH))
}

fn box_line<W: Write>(writer: &mut W, text: &str) -> std::io::Result<()> {
    let text = truncate(text, BOX_WIDTH - 2);
    writeln!(writer, "│ {text:<width$} │", width = BOX_WIDTH - 2)
}

fn box_centered<W: Write>(writer: &mut W, text: &str) -> std::io::Result<()> {
    writeln!(writer, "│{text:^BOX_WIDTH$}│")
}

/// Truncate a string to `max_len` characters, marking the cut with `...`.
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{kept}...")
    }
}

/// Human-readable byte count using binary units.
#[must_use]
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["B", "KiB", "MiB", "GiB", "TiB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{bytes} B")
    } else {
        format!("{value:.1} {}", UNITS[unit])
    }
}

/// The welcome banner shown when no subcommand is given.
#[derive(Debug, Clone, Serialize)]
pub struct Welcome {
    /// Program version.
    pub version: String,
    /// Name of the user being greeted.
    pub username: String,
}

impl TableDisplay for Welcome {
    fn write_table<W: Write>(&self, writer: &mut W) -> Result<(), CliError> {
        box_top(writer)?;
        box_centered(writer, &format!("DARP v{}", self.version))?;
        box_centered(writer, "Cloudflare WARP Client")?;
        box_rule(writer)?;
        box_line(writer, &format!("Hello {}!", self.username))?;
        box_rule(writer)?;
        box_line(writer, "A modular Cloudflare WARP client")?;
        box_line(writer, "built on WireGuard. No API key needed!")?;
        box_rule(writer)?;
        box_line(writer, "Available commands:")?;
        for (command, summary) in [
            ("connect", "Connect to WARP"),
            ("status", "Show status"),
            ("test", "Network tests"),
            ("optimize", "Tune the network"),
            ("config", "Manage settings"),
            ("--help", "Show help"),
        ] {
            box_line(writer, &format!("  darp {command:<10} - {summary}"))?;
        }
        box_bottom(writer)?;
        writeln!(writer)?;
        Ok(())
    }
}

/// Status information for `darp status`.
#[derive(Debug, Clone, Serialize)]
pub struct StatusReport {
    /// Whether the tunnel interface is up.
    pub connected: bool,
    /// Tunnel interface name.
    pub interface: String,
    /// IPv4 address on the interface.
    pub ip_address: Option<String>,
    /// DNS servers pushed into the tunnel.
    pub dns_servers: Vec<String>,
    /// Local public key.
    pub public_key: Option<String>,
    /// WARP endpoint in use.
    pub endpoint: Option<String>,
    /// Age of the last handshake.
    pub latest_handshake: Option<String>,
    /// Bytes sent through the tunnel.
    pub bytes_sent: u64,
    /// Bytes received through the tunnel.
    pub bytes_received: u64,
}

impl TableDisplay for StatusReport {
    fn write_table<W: Write>(&self, writer: &mut W) -> Result<(), CliError> {
        box_top(writer)?;
        box_centered(writer, "DARP Status")?;
        box_rule(writer)?;

        let state = if self.connected { "✅ Connected" } else { "❌ Disconnected" };
        box_line(writer, &format!("Status: {state}"))?;
        box_line(writer, &format!("Interface: {}", self.interface))?;

        if self.connected {
            if let Some(ref ip) = self.ip_address {
                box_line(writer, &format!("IP Address: {ip}"))?;
            }
            if let Some(ref endpoint) = self.endpoint {
                box_line(writer, &format!("Endpoint: {endpoint}"))?;
            }
            if let Some(ref handshake) = self.latest_handshake {
                box_line(writer, &format!("Handshake: {handshake}"))?;
            }
            box_line(writer, &format!("Data Sent: {}", format_bytes(self.bytes_sent)))?;
            box_line(
                writer,
                &format!("Data Received: {}", format_bytes(self.bytes_received)),
            )?;
        }

        box_line(writer, &format!("DNS Servers: {}", self.dns_servers.join(", ")))?;
        box_bottom(writer)?;
        Ok(())
    }
}

/// Results of `darp test connectivity`.
#[derive(Debug, Clone, Serialize)]
pub struct ConnectivityReport {
    /// Each check in the order it ran.
    pub checks: Vec<CheckResult>,
}

impl ConnectivityReport {
    /// Number of checks that failed.
    #[must_use]
    pub fn failures(&self) -> usize {
        self.checks.iter().filter(|c| !c.passed).count()
    }
}

impl TableDisplay for ConnectivityReport {
    fn write_table<W: Write>(&self, writer: &mut W) -> Result<(), CliError> {
        for check in &self.checks {
            let mark = if check.passed { "✅ PASS" } else { "❌ FAIL" };
            writeln!(writer, "  {mark} {} ({})", check.name, check.detail)?;
        }
        writeln!(writer)?;
        match self.failures() {
            0 => writeln!(writer, "🎉 All connectivity tests passed!")?,
            n => writeln!(writer, "⚠️  {n} of {} connectivity tests failed", self.checks.len())?,
        }
        Ok(())
    }
}

/// Results of `darp test latency`.
#[derive(Debug, Clone, Serialize)]
pub struct LatencyReport {
    /// One entry per target, in probe order.
    pub results: Vec<LatencyResult>,
}

impl TableDisplay for LatencyReport {
    fn write_table<W: Write>(&self, writer: &mut W) -> Result<(), CliError> {
        for result in &self.results {
            match (result.latency_ms, &result.error) {
                (Some(ms), _) => writeln!(writer, "  {}: {ms:.1}ms", result.label)?,
                (None, Some(error)) => {
                    writeln!(writer, "  {}: unreachable ({error})", result.label)?;
                }
                (None, None) => writeln!(writer, "  {}: unreachable", result.label)?,
            }
        }
        Ok(())
    }
}

/// Results of `darp test dns`.
#[derive(Debug, Clone, Serialize)]
pub struct DnsReport {
    /// One entry per domain.
    pub results: Vec<DnsResult>,
}

impl TableDisplay for DnsReport {
    fn write_table<W: Write>(&self, writer: &mut W) -> Result<(), CliError> {
        for result in &self.results {
            write!(writer, "  Resolving {}... ", result.domain)?;
            match result.error {
                None => {
                    let first = result
                        .addresses
                        .first()
                        .map(ToString::to_string)
                        .unwrap_or_default();
                    writeln!(writer, "✅ OK ({first}, {:.1}ms)", result.elapsed_ms)?;
                }
                Some(ref error) => writeln!(writer, "❌ FAIL ({error})")?,
            }
        }
        Ok(())
    }
}

/// Results of `darp optimize`.
#[derive(Debug, Clone, Serialize)]
pub struct OptimizeReport {
    /// One entry per kernel parameter.
    pub settings: Vec<SysctlOutcome>,
}

impl TableDisplay for OptimizeReport {
    fn write_table<W: Write>(&self, writer: &mut W) -> Result<(), CliError> {
        for setting in &self.settings {
            write!(writer, "  Setting {} = {}... ", setting.key, setting.value)?;
            match setting.error {
                None => writeln!(writer, "✅ Done")?,
                Some(ref error) => writeln!(writer, "❌ Failed ({error})")?,
            }
        }
        writeln!(writer)?;

        let failed = self.settings.iter().filter(|s| !s.applied).count();
        if failed == 0 {
            writeln!(writer, "🎯 Network optimization completed!")?;
        } else {
            writeln!(
                writer,
                "⚠️  {failed} of {} settings could not be applied",
                self.settings.len()
            )?;
        }
        Ok(())
    }
}

/// A freshly generated key pair.
#[derive(Debug, Clone, Serialize)]
pub struct KeygenReport {
    /// Base64 private key.
    pub private_key: String,
    /// Base64 public key.
    pub public_key: String,
}

impl TableDisplay for KeygenReport {
    fn write_table<W: Write>(&self, writer: &mut W) -> Result<(), CliError> {
        writeln!(writer, "Private Key:  {}", self.private_key)?;
        writeln!(writer, "Public Key:   {}", self.public_key)?;
        Ok(())
    }
}

/// One configuration value.
#[derive(Debug, Clone, Serialize)]
pub struct ConfigEntry {
    /// Dotted key.
    pub key: String,
    /// Current value.
    pub value: String,
}

impl TableDisplay for ConfigEntry {
    fn write_table<W: Write>(&self, writer: &mut W) -> Result<(), CliError> {
        writeln!(writer, "{}", self.value)?;
        Ok(())
    }
}

fn write_interface<W: Write>(writer: &mut W, interface: &InterfaceAddress) -> std::io::Result<()> {
    writeln!(writer, "Interface")?;
    writeln!(writer, "  Name:           {}", interface.name)?;
    if let Some(ref state) = interface.state {
        writeln!(writer, "  State:          {state}")?;
    }
    if let Some(mtu) = interface.mtu {
        writeln!(writer, "  MTU:            {mtu}")?;
    }
    if let Some(ipv4) = interface.ipv4 {
        writeln!(writer, "  IPv4:           {ipv4}")?;
    }
    for ipv6 in &interface.ipv6 {
        writeln!(writer, "  IPv6:           {ipv6}")?;
    }
    Ok(())
}

impl TableDisplay for NetworkInfo {
    fn write_table<W: Write>(&self, writer: &mut W) -> Result<(), CliError> {
        writeln!(writer, "Network Information")?;
        writeln!(writer, "══════════════════════════════════════════════════")?;
        write_interface(writer, &self.interface)?;
        writeln!(writer)?;

        writeln!(writer, "{:<20}  {:<16}  {:<10}", "DESTINATION", "GATEWAY", "DEVICE")?;
        writeln!(writer, "{}", "─".repeat(50))?;
        for route in &self.routes {
            writeln!(
                writer,
                "{:<20}  {:<16}  {:<10}",
                truncate(&route.destination, 20),
                route.gateway.as_deref().unwrap_or("-"),
                route.interface.as_deref().unwrap_or("-")
            )?;
        }
        writeln!(writer)?;

        writeln!(writer, "DNS")?;
        writeln!(writer, "  System:         {}", self.dns.nameservers.join(", "))?;
        writeln!(writer, "  Configured:     {}", self.dns.configured.join(", "))?;
        Ok(())
    }
}

/// Simple message output.
#[derive(Debug, Clone, Serialize)]
pub struct Message {
    /// Message text.
    pub message: String,
    /// Whether this is a success message.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub success: bool,
}

impl Message {
    /// Create a success message.
    #[must_use]
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            success: true,
        }
    }

    /// Create an informational message.
    #[must_use]
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            success: false,
        }
    }
}

impl TableDisplay for Message {
    fn write_table<W: Write>(&self, writer: &mut W) -> Result<(), CliError> {
        if self.success {
            writeln!(writer, "✓ {}", self.message)?;
        } else {
            writeln!(writer, "{}", self.message)?;
        }
        Ok(())
    }
}
