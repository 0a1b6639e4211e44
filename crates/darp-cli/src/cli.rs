//! Command-line argument parsing with clap.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// DARP - Cloudflare WARP client over WireGuard.
#[derive(Parser, Debug, Clone)]
#[command(name = "darp")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to the configuration file.
    #[arg(short, long, env = "DARP_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Enable debug logging.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format.
    #[arg(short, long, value_enum, default_value_t = Format::Table, global = true)]
    pub format: Format,

    /// Subcommand to execute. Without one, a welcome banner is shown.
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default)]
pub enum Format {
    /// Human-readable table format.
    #[default]
    Table,
    /// JSON output for scripting.
    Json,
}

/// Top-level subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Connect to Cloudflare WARP.
    ///
    /// Generates a fresh WireGuard key, writes the interface config and
    /// brings it up with wg-quick.
    Connect,

    /// Disconnect from Cloudflare WARP.
    Disconnect,

    /// Show connection status.
    Status,

    /// View and modify DARP configuration.
    Config {
        /// Config subcommand to execute.
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Run network tests.
    Test {
        /// Test subcommand to execute.
        #[command(subcommand)]
        command: TestCommands,
    },

    /// Apply kernel network tuning for better WARP performance.
    Optimize,

    /// Generate a WireGuard key pair.
    Keygen,

    /// Show interface, routing and DNS information.
    Info,

    /// Check whether the iptables firewall blocks incoming traffic.
    Firewall,
}

/// Config subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum ConfigCommands {
    /// Show the current configuration as JSON.
    Show,

    /// Set a configuration value and save it.
    Set {
        /// Dotted key, e.g. `network.mtu`.
        key: String,
        /// New value. Lists are comma-separated.
        value: String,
    },

    /// Print a single configuration value.
    Get {
        /// Dotted key, e.g. `network.dns`.
        key: String,
    },

    /// Print the configuration file path.
    Path,
}

/// Test subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum TestCommands {
    /// Test basic connectivity.
    Connectivity,

    /// Test latency to public DNS resolvers.
    Latency,

    /// Test DNS resolution.
    Dns {
        /// Domains to resolve instead of the defaults.
        domains: Vec<String>,
    },
}
