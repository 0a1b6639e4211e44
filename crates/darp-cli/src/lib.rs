//! # darp-cli
//!
//! DARP command-line interface.
//!
//! Provides commands for:
//! - Connecting to and disconnecting from Cloudflare WARP
//! - Tunnel status
//! - Connectivity, latency and DNS tests
//! - Kernel network tuning and firewall checks
//! - Settings management and key generation
//!
//! # Architecture
//!
//! The CLI drives two managers, both of which shell out through
//! [`darp_validation::SafeCommand`]:
//!
//! ```text
//! ┌───────────┐              ┌────────────────┐     wg, wg-quick
//! │  darp-cli │─────────────►│ TunnelManager  │────────────────────►
//! │           │              └────────────────┘
//! │           │              ┌────────────────┐     ip, sysctl,
//! │           │─────────────►│ NetworkManager │────────────────────►
//! └───────────┘              └────────────────┘     systemctl, iptables
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod cli;
pub mod commands;
pub mod error;
pub mod logging;
pub mod output;
pub mod startup;

pub use cli::{Cli, Commands, ConfigCommands, Format, TestCommands};
pub use error::CliError;
pub use output::OutputFormat;
